//! # External Tool Integration
//!
//! Abstractions for executing external security tools. The probing engine
//! (nmap) is the only tool surfacescan drives; it is located once in `PATH`
//! (or at a configured location) and then invoked synchronously from
//! worker threads.
//!
//! Calls are blocking and carry no timeout: a scan waits for every probe it
//! started.

pub mod nmap;

use crate::error::{Result, SurfaceScanError};
use crate::logging;
use std::path::Path;
use std::process::{Command, Output};
use std::time::Instant;

/// Trait for blocking external tool execution
pub trait ExternalTool {
    /// Execute the tool with given arguments and wait for it to exit
    fn execute(&self, args: &[String]) -> Result<Output>;
}

/// Base implementation for external tool execution
#[derive(Debug, Clone)]
pub struct BaseTool {
    pub name: &'static str,
    pub binary_path: String,
}

impl BaseTool {
    /// Locate `name` in `PATH`
    pub fn new(name: &'static str) -> Result<Self> {
        let binary_path = Self::find_binary(name)?;
        Ok(Self { name, binary_path })
    }

    /// Use an explicit binary location
    pub fn with_path(name: &'static str, path: &str) -> Result<Self> {
        if !Path::new(path).is_file() {
            return Err(SurfaceScanError::external_tool(
                name,
                format!("binary not found at {}", path),
            ));
        }
        Ok(Self {
            name,
            binary_path: path.to_string(),
        })
    }

    fn find_binary(name: &str) -> Result<String> {
        let output = Command::new("which")
            .arg(name)
            .output()
            .map_err(|e| SurfaceScanError::external_tool("which", e.to_string()))?;

        if !output.status.success() {
            return Err(SurfaceScanError::external_tool(
                name,
                "Tool not found in PATH",
            ));
        }

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            return Err(SurfaceScanError::external_tool(name, "Tool path is empty"));
        }

        Ok(path)
    }

    pub fn execute_command(&self, args: &[String]) -> Result<Output> {
        let started = Instant::now();
        let result = Command::new(&self.binary_path).args(args).output();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let output =
            result.map_err(|e| SurfaceScanError::external_tool(self.name, e.to_string()))?;

        logging::log_external_tool(
            self.name,
            &args.join(" "),
            elapsed_ms,
            output.status.success(),
        );

        Ok(output)
    }
}

impl ExternalTool for BaseTool {
    fn execute(&self, args: &[String]) -> Result<Output> {
        self.execute_command(args)
    }
}
