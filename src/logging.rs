//! # Structured Logging Module
//!
//! Structured logging for surfacescan built on the `tracing` ecosystem, with
//! configurable log levels, console/JSON output and optional rolling files.
//!
//! Console output goes to stderr so that JSON reports on stdout stay clean.
//!
//! ## Example
//!
//! ```rust,no_run
//! use surfacescan::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env()?;
//! let _guards = init_logging(&config)?;
//!
//! tracing::info!("surfacescan started");
//! # Ok::<(), surfacescan::error::SurfaceScanError>(())
//! ```

use crate::error::{Result, SurfaceScanError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for structured logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output to the console (stderr)
    pub console: bool,
    /// Whether to output in JSON format
    pub json: bool,
    /// Log file path (optional)
    pub file_path: Option<PathBuf>,
    /// Number of rotated log files to keep
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            console: true,
            json: false,
            file_path: None,
            max_files: 5,
        }
    }
}

impl LogConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Override fields from `SURFACESCAN_LOG_*` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("SURFACESCAN_LOG_LEVEL") {
            self.level = level;
        }

        if let Ok(console) = std::env::var("SURFACESCAN_LOG_CONSOLE") {
            self.console = console
                .parse::<bool>()
                .map_err(|_| SurfaceScanError::config("Invalid SURFACESCAN_LOG_CONSOLE value"))?;
        }

        if let Ok(json) = std::env::var("SURFACESCAN_LOG_JSON") {
            self.json = json
                .parse::<bool>()
                .map_err(|_| SurfaceScanError::config("Invalid SURFACESCAN_LOG_JSON value"))?;
        }

        if let Ok(file_path) = std::env::var("SURFACESCAN_LOG_FILE") {
            self.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(max_files) = std::env::var("SURFACESCAN_LOG_MAX_FILES") {
            self.max_files = max_files
                .parse::<usize>()
                .map_err(|_| SurfaceScanError::config("Invalid SURFACESCAN_LOG_MAX_FILES value"))?;
        }

        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(SurfaceScanError::config(format!(
                "Invalid log level '{}'. Valid levels: {}",
                self.level,
                valid_levels.join(", ")
            )));
        }

        if self.max_files == 0 {
            return Err(SurfaceScanError::config("Max files must be greater than 0"));
        }

        Ok(())
    }
}

/// Initialize structured logging with the given configuration
///
/// Sets up the tracing subscriber with an environment filter (`RUST_LOG`
/// wins over the configured level), an optional console layer and an
/// optional rolling file layer. The returned guards must be kept alive for
/// the file writer to flush.
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>> {
    config.validate()?;

    let mut guards = Vec::new();
    let mut layers = Vec::new();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.console {
        let console_layer = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(true)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        };

        layers.push(console_layer.with_filter(env_filter.clone()));
    }

    if let Some(file_path) = &config.file_path {
        let prefix = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("surfacescan")
            .to_string();

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(
                file_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| std::path::Path::new(".")),
            )
            .map_err(|e| SurfaceScanError::config(format!("Failed to create log appender: {}", e)))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        let file_layer = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_names(true)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed()
        };

        layers.push(file_layer.with_filter(env_filter));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| SurfaceScanError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        level = %config.level,
        console = config.console,
        json = config.json,
        file_path = ?config.file_path,
        "Logging initialized"
    );

    Ok(guards)
}

/// Span covering one chunked port scan
pub fn scan_span(target: &str, port_count: usize, chunk_count: usize) -> tracing::Span {
    tracing::info_span!(
        "scan",
        target = %target,
        port_count = port_count,
        chunk_count = chunk_count,
        start_time = %chrono::Utc::now().to_rfc3339()
    )
}

/// Span covering one audit stage
pub fn audit_span(stage: &str, port_count: usize) -> tracing::Span {
    tracing::info_span!(
        "audit",
        stage = %stage,
        port_count = port_count,
        start_time = %chrono::Utc::now().to_rfc3339()
    )
}

/// Log the outcome of one chunk
pub fn log_chunk_result(chunk: &str, reported: usize, error: Option<&str>) {
    match error {
        None => tracing::debug!(chunk = %chunk, reported_ports = reported, "Chunk merged"),
        Some(error) => tracing::warn!(chunk = %chunk, error = %error, "Chunk probe failed"),
    }
}

/// Log external tool execution
pub fn log_external_tool(tool: &str, command: &str, duration_ms: u64, success: bool) {
    if success {
        tracing::debug!(
            tool = %tool,
            command = %command,
            duration_ms = duration_ms,
            "External tool executed successfully"
        );
    } else {
        tracing::warn!(
            tool = %tool,
            command = %command,
            duration_ms = duration_ms,
            "External tool execution failed"
        );
    }
}

/// Log scan completion
pub fn log_scan_completion(target: &str, duration_ms: u64, open_ports: usize, findings: usize) {
    tracing::info!(
        target = %target,
        duration_ms = duration_ms,
        open_ports = open_ports,
        findings = findings,
        "Scan completed"
    );
}
