//! # Input Validation Module
//!
//! Validation for every value that reaches the probing engine or the
//! scheduler. All checks run before any scan work is scheduled.
//!
//! ## Validation Functions
//!
//! - **Target Validation**: IPv4 literals and hostnames, with injection checks
//! - **Port Validation**: port bounds, ranges and nmap port expressions
//! - **Scheduling Validation**: chunk sizes and worker counts
//!
//! ## Example
//!
//! ```rust
//! use surfacescan::validation::*;
//!
//! assert!(validate_target("scanme.nmap.org").is_ok());
//! assert!(validate_port_range(1, 1024).is_ok());
//! assert!(validate_chunk_size(0).is_err());
//! ```

use crate::constants;
use crate::error::{Result, SurfaceScanError};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Validates the syntax of a target (IPv4 literal or hostname)
///
/// This does not perform name resolution; see [`crate::target`].
pub fn validate_target(target: &str) -> Result<String> {
    if target.is_empty() {
        return Err(SurfaceScanError::validation("Target cannot be empty"));
    }

    if target.len() > constants::validation::MAX_TARGET_LENGTH {
        return Err(SurfaceScanError::validation("Target too long"));
    }

    if target.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SurfaceScanError::validation(
            "Target contains invalid characters",
        ));
    }

    // nmap would read a leading dash as an option
    if target.starts_with('-') {
        return Err(SurfaceScanError::validation(
            "Target cannot start with '-'",
        ));
    }

    if contains_command_injection_patterns(target) {
        return Err(SurfaceScanError::validation(
            "Target contains potential command injection patterns",
        ));
    }

    if target.parse::<Ipv4Addr>().is_ok() {
        return Ok(target.to_string());
    }

    if target.contains(':') {
        return Err(SurfaceScanError::validation(
            "Only IPv4 literals and hostnames are supported",
        ));
    }

    validate_hostname(target)
}

/// Validates hostname format (RFC 1123 labels)
pub fn validate_hostname(hostname: &str) -> Result<String> {
    if hostname.is_empty() {
        return Err(SurfaceScanError::validation("Hostname cannot be empty"));
    }

    if hostname.len() > constants::validation::MAX_TARGET_LENGTH {
        return Err(SurfaceScanError::validation(
            "Hostname too long (max 253 characters)",
        ));
    }

    for label in hostname.split('.') {
        if label.is_empty() {
            return Err(SurfaceScanError::validation(
                "Hostname contains an empty label",
            ));
        }
        if label.len() > constants::validation::MAX_LABEL_LENGTH {
            return Err(SurfaceScanError::validation("Hostname label too long"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(SurfaceScanError::validation(
                "Hostname labels cannot start or end with '-'",
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SurfaceScanError::validation("Invalid hostname format"));
        }
    }

    Ok(hostname.to_string())
}

/// Validates a single port number
pub fn validate_port(port: u16) -> Result<u16> {
    if port < constants::ports::MIN {
        return Err(SurfaceScanError::validation("Port cannot be 0"));
    }
    Ok(port)
}

/// Validates an inclusive port range
pub fn validate_port_range(start: u16, end: u16) -> Result<(u16, u16)> {
    validate_port(start)?;
    validate_port(end)?;

    if start > end {
        return Err(SurfaceScanError::validation(
            "Start port cannot be greater than end port",
        ));
    }

    Ok((start, end))
}

/// Validates a port expression handed to nmap (`80`, `1-1000`, `22,80,443`)
pub fn validate_port_list(port_list: &str) -> Result<String> {
    if port_list.is_empty() {
        return Err(SurfaceScanError::validation("Port list cannot be empty"));
    }

    for part in port_list.split(',') {
        let part = part.trim();

        if part.is_empty() {
            return Err(SurfaceScanError::validation("Invalid port format"));
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_port(start, "Invalid start port")?;
            let end = parse_port(end, "Invalid end port")?;
            validate_port_range(start, end)?;
        } else {
            validate_port(parse_port(part, "Invalid port number")?)?;
        }
    }

    Ok(port_list.to_string())
}

fn parse_port(raw: &str, message: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| SurfaceScanError::validation(format!("{}: {}", message, raw)))
}

/// Validates the number of ports per chunk
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize> {
    if chunk_size == 0 {
        return Err(SurfaceScanError::validation(
            "Chunk size must be greater than 0",
        ));
    }
    Ok(chunk_size)
}

/// Validates the worker pool size
pub fn validate_workers(workers: usize) -> Result<usize> {
    if workers == 0 {
        return Err(SurfaceScanError::validation(
            "Worker count must be greater than 0",
        ));
    }
    if workers > constants::validation::MAX_WORKERS {
        return Err(SurfaceScanError::validation(format!(
            "Worker count cannot exceed {}",
            constants::validation::MAX_WORKERS
        )));
    }
    Ok(workers)
}

/// Validates a path the JSON report will be written to
pub fn validate_output_file_path(path_str: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(SurfaceScanError::validation("Output path cannot be empty"));
    }

    let path = Path::new(path_str);
    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(SurfaceScanError::validation(
            "Output path cannot contain '..'",
        ));
    }

    if path.is_dir() {
        return Err(SurfaceScanError::validation(
            "Output path points to a directory",
        ));
    }

    Ok(path.to_path_buf())
}

/// Checks for shell metacharacters
pub fn contains_command_injection_patterns(s: &str) -> bool {
    const PATTERNS: &[char] = &[';', '|', '&', '$', '`', '>', '<', '(', ')', '{', '}', '\\', '\'', '"'];
    s.chars().any(|c| PATTERNS.contains(&c))
}
