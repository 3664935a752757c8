//! # Error Handling
//!
//! This module provides the error type shared by every surfacescan component.
//! It uses the `thiserror` crate for clean error definitions and readable
//! messages, and follows the scan's error taxonomy:
//!
//! - **Validation** errors are raised synchronously before any probe runs
//! - **Probe** and **ExternalTool** errors come out of the probing engine
//! - **Scan** errors carry the single aggregated failure of a chunked scan
//!
//! ## Example
//!
//! ```rust
//! use surfacescan::error::{SurfaceScanError, Result};
//!
//! fn validate_chunk_size(size: usize) -> Result<usize> {
//!     if size == 0 {
//!         return Err(SurfaceScanError::validation("Chunk size must be greater than 0"));
//!     }
//!     Ok(size)
//! }
//!
//! assert!(validate_chunk_size(0).is_err());
//! ```

use std::io;

/// Custom error types for surfacescan operations
#[derive(Debug, thiserror::Error)]
pub enum SurfaceScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool error: {tool} failed with {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Target resolution failed: {0}")]
    TargetResolution(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    /// Aggregated failure of a chunked port scan. The message is the error
    /// marker left by the failing worker.
    #[error("{0}")]
    Scan(String),
}

impl SurfaceScanError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new external tool error
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new parsing error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new target resolution error
    pub fn target_resolution(msg: impl Into<String>) -> Self {
        Self::TargetResolution(msg.into())
    }

    /// Create a new probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a new aggregated scan error
    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan(msg.into())
    }

    /// Whether the error was caused by caller input rather than by the scan
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::TargetResolution(_) | Self::Config(_)
        )
    }
}

/// Result type alias for surfacescan operations
pub type Result<T> = std::result::Result<T, SurfaceScanError>;
