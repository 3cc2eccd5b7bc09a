//! Global configuration.
//!
//! Loaded from ~/.config/spoolr/spoolr.yml or .spoolr.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use spoolr::id::DEFAULT_TIMESTAMP_FORMAT;

/// Global configuration for Spoolr.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Workbook location and backups.
    pub storage: StorageConfig,

    /// Print-log settings.
    pub usage: UsageConfig,
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .spoolr.yml in current directory
    /// 3. ~/.config/spoolr/spoolr.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".spoolr.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .spoolr.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .spoolr.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("spoolr").join("spoolr.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_file.as_os_str().is_empty() {
            eyre::bail!("storage.data-file must not be empty");
        }
        if self.usage.timestamp_format.trim().is_empty() {
            eyre::bail!("usage.timestamp-format must not be empty");
        }
        Ok(())
    }

    /// Directory for automatic pre-restore copies.
    pub fn backup_dir(&self) -> PathBuf {
        match &self.storage.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .storage
                .data_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Workbook file path.
    #[serde(rename = "data-file")]
    pub data_file: PathBuf,

    /// Where pre-restore copies go; defaults to the data file's directory.
    #[serde(rename = "backup-dir")]
    pub backup_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: super::default_data_dir().join(super::DEFAULT_DATA_FILE),
            backup_dir: None,
        }
    }
}

/// Print-log settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsageConfig {
    /// chrono format for new usage-entry timestamps.
    #[serde(rename = "timestamp-format")]
    pub timestamp_format: String,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}
