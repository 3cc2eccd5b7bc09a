//! Configuration for Spoolr.
//!
//! Loaded from, in order of precedence:
//! 1. An explicit `--config` path
//! 2. .spoolr.yml in the current directory
//! 3. ~/.config/spoolr/spoolr.yml
//! 4. Built-in defaults

use std::path::PathBuf;

pub use self::global::Config;

mod global;

/// Default file name of the workbook.
pub const DEFAULT_DATA_FILE: &str = "filament_data.json";

/// Directory holding Spoolr's data and logs by default.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spoolr")
}
