//! # Configuration Management
//!
//! Command-line parsing and layered configuration for surfacescan. Values are
//! resolved in this order, later layers winning:
//!
//! 1. built-in defaults
//! 2. TOML file given with `--config`
//! 3. `SURFACESCAN_*` environment variables
//! 4. command-line flags
//!
//! ## Example
//!
//! ```rust
//! use surfacescan::config::Config;
//!
//! let config = Config::from_args(&[
//!     "surfacescan".to_string(),
//!     "example.com".to_string(),
//!     "--ports".to_string(),
//!     "1-1024".to_string(),
//!     "--json".to_string(),
//! ])?;
//!
//! assert_eq!(config.target, "example.com");
//! assert_eq!(config.ports.to_string(), "1-1024");
//! assert!(config.json_mode);
//! # Ok::<(), surfacescan::error::SurfaceScanError>(())
//! ```

use crate::config_file::ConfigFile;
use crate::constants;
use crate::error::{Result, SurfaceScanError};
use crate::logging::LogConfig;
use crate::ports::PortRange;
use crate::utils;
use crate::validation;
use serde::Serialize;
use std::path::PathBuf;

/// Flags that take a value
const VALUE_FLAGS: &[&str] = &[
    "--ports",
    "--chunk-size",
    "--workers",
    "--output",
    "--config",
    "--nmap-path",
];

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Target hostname or IPv4 address
    pub target: String,
    pub ports: PortRange,
    /// Ports per worker task
    pub chunk_size: usize,
    /// Worker threads for chunk probes
    pub workers: usize,
    /// Pass `-O` to the port scan
    pub os_detection: bool,
    /// Explicit nmap location; looked up in `PATH` when unset
    pub nmap_path: Option<String>,
    /// Output in JSON format
    pub json_mode: bool,
    /// Save the JSON report to this file
    pub output_file: Option<PathBuf>,
    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: String::new(),
            ports: PortRange::full(),
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
            workers: utils::default_workers(),
            os_detection: true,
            nmap_path: None,
            json_mode: false,
            output_file: None,
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::flag_value(args, "--config")? {
            config.apply_file(ConfigFile::load_from_file(path)?)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(args)?;
        config.validate()
    }

    /// Overlay values present in a config file
    pub fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(target) = file.target {
            self.target = target;
        }
        if let Some(ports) = file.ports {
            self.ports = ports.parse()?;
        }
        if let Some(chunk_size) = file.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(workers) = file.workers {
            self.workers = workers;
        }
        if let Some(os_detection) = file.os_detection {
            self.os_detection = os_detection;
        }
        if file.nmap_path.is_some() {
            self.nmap_path = file.nmap_path;
        }
        if let Some(json_mode) = file.json_mode {
            self.json_mode = json_mode;
        }
        if let Some(output_file) = file.output_file {
            self.output_file = Some(PathBuf::from(output_file));
        }
        if let Some(logging) = file.logging {
            self.logging = logging;
        }
        Ok(())
    }

    /// Overlay `SURFACESCAN_*` variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup("SURFACESCAN_WORKERS") {
            self.workers = workers
                .parse::<usize>()
                .map_err(|_| SurfaceScanError::config("Invalid SURFACESCAN_WORKERS value"))?;
        }

        if let Some(chunk_size) = lookup("SURFACESCAN_CHUNK_SIZE") {
            self.chunk_size = chunk_size
                .parse::<usize>()
                .map_err(|_| SurfaceScanError::config("Invalid SURFACESCAN_CHUNK_SIZE value"))?;
        }

        if let Some(nmap_path) = lookup("SURFACESCAN_NMAP_PATH") {
            self.nmap_path = Some(nmap_path);
        }

        self.logging = self.logging.clone().with_env()?;
        Ok(())
    }

    /// Overlay command-line flags. The first bare argument is the target.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(target) = Self::positional(args) {
            self.target = target.to_string();
        }

        if args.iter().any(|a| a == "--json") {
            self.json_mode = true;
        }
        if args.iter().any(|a| a == "--no-os-detection") {
            self.os_detection = false;
        }

        if let Some(ports) = Self::flag_value(args, "--ports")? {
            self.ports = ports.parse()?;
        }
        if let Some(chunk_size) = Self::flag_value(args, "--chunk-size")? {
            self.chunk_size = Self::parse_count("--chunk-size", chunk_size)?;
        }
        if let Some(workers) = Self::flag_value(args, "--workers")? {
            self.workers = Self::parse_count("--workers", workers)?;
        }
        if let Some(path) = Self::flag_value(args, "--output")? {
            self.output_file = Some(PathBuf::from(path));
        }
        if let Some(path) = Self::flag_value(args, "--nmap-path")? {
            self.nmap_path = Some(path.to_string());
        }

        Ok(())
    }

    fn validate(mut self) -> Result<Self> {
        if self.target.is_empty() {
            return Err(SurfaceScanError::config("Target argument required"));
        }

        self.target = validation::validate_target(&self.target)?;
        self.chunk_size = validation::validate_chunk_size(self.chunk_size)?;
        self.workers = validation::validate_workers(self.workers)?;
        if let Some(path) = &self.output_file {
            let validated = validation::validate_output_file_path(&path.to_string_lossy())?;
            self.output_file = Some(validated);
        }
        self.logging.validate()?;

        Ok(self)
    }

    /// Value following `flag`, if the flag is present
    fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
        match args.iter().position(|a| a == flag) {
            None => Ok(None),
            Some(i) => args
                .get(i + 1)
                .map(|v| Some(v.as_str()))
                .ok_or_else(|| SurfaceScanError::config(format!("Missing value for {}", flag))),
        }
    }

    fn positional(args: &[String]) -> Option<&str> {
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg.as_str()) {
                iter.next();
            } else if !arg.starts_with('-') {
                return Some(arg);
            }
        }
        None
    }

    fn parse_count(flag: &str, value: &str) -> Result<usize> {
        value.parse::<usize>().map_err(|_| {
            SurfaceScanError::config(format!("Invalid value for {}: {}", flag, value))
        })
    }
}
