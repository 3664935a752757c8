//! # Utility Functions
//!
//! Host-environment helpers: external tool dependency checks and worker pool
//! sizing.
//!
//! ## Example
//!
//! ```rust
//! use surfacescan::utils::{check_binary_in_path, default_workers};
//!
//! println!("nmap installed: {}", check_binary_in_path("nmap"));
//! assert!(default_workers() >= 1);
//! ```

use crate::constants;
use crate::error::{Result, SurfaceScanError};
use std::process::Command;

/// Check if required external tools are available
///
/// Verifies that nmap is installed and available in the system PATH, unless
/// an explicit `nmap_path` is configured.
pub fn check_dependencies(nmap_path: Option<&str>) -> Result<()> {
    if nmap_path.is_some() {
        return Ok(());
    }

    let required_tools = [(constants::NMAP_BINARY, "Network scanning and service detection")];

    let missing: Vec<String> = required_tools
        .iter()
        .filter(|(tool, _)| !check_binary_in_path(tool))
        .map(|(tool, description)| format!("{} ({})", tool, description))
        .collect();

    if !missing.is_empty() {
        return Err(SurfaceScanError::external_tool(
            "dependency_check",
            format!(
                "Missing required tools:\n  {}\n\nInstall with:\n  sudo apt install nmap  # Debian/Ubuntu\n  sudo pacman -S nmap  # Arch\n  brew install nmap  # macOS",
                missing.join("\n  ")
            ),
        ));
    }

    Ok(())
}

/// Check if a binary exists in the system PATH
pub fn check_binary_in_path(bin: &str) -> bool {
    match Command::new("which").arg(bin).output() {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}

/// Default worker pool size: [`constants::WORKERS_PER_CORE`] per logical core
pub fn default_workers() -> usize {
    (num_cpus::get() * constants::WORKERS_PER_CORE).clamp(1, constants::validation::MAX_WORKERS)
}
