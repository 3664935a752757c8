use crate::error::{Result, SurfaceScanError};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration structure for serialization/deserialization in config files
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    // Basic settings
    pub target: Option<String>,
    pub json_mode: Option<bool>,
    pub ports: Option<String>,

    // Scheduling
    pub chunk_size: Option<usize>,
    pub workers: Option<usize>,

    // Probing engine
    pub os_detection: Option<bool>,
    pub nmap_path: Option<String>,

    // Output settings
    pub output_file: Option<String>,

    pub logging: Option<LogConfig>,
}

impl ConfigFile {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SurfaceScanError::parse(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SurfaceScanError::parse(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;

        Ok(())
    }
}
