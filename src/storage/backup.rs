//! Backup and restore of the workbook file.
//!
//! Both operate on whole-file copies of the same path the store uses.
//! Restore validates the candidate file and keeps a safety copy of the
//! current data before overwriting it.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use sha2::{Digest, Sha256};

use super::workbook::Workbook;
use crate::error::{Result, SpoolrError};
use crate::id::backup_stamp;

/// Outcome of a backup copy.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupReport {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex SHA-256 of the copied file
    pub sha256: String,
}

/// Outcome of a restore.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    /// Safety copy of the data that was replaced, if there was any
    pub safety_copy: Option<PathBuf>,
    pub restored_from: PathBuf,
}

/// Suggested file name for a manual backup.
pub fn default_backup_name() -> String {
    format!("filament_manager_backup_{}.json", backup_stamp())
}

/// Copy the workbook at `data_file` to `dest`.
pub fn create_backup(data_file: &Path, dest: &Path) -> Result<BackupReport> {
    if !data_file.exists() {
        return Err(SpoolrError::Storage(format!(
            "data file not found: {}",
            data_file.display()
        )));
    }
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = fs::copy(data_file, dest)?;
    let sha256 = file_digest(dest)?;
    info!("Backup of {} written to {} ({} bytes)", data_file.display(), dest.display(), bytes);

    Ok(BackupReport {
        path: dest.to_path_buf(),
        bytes,
        sha256,
    })
}

/// Replace the workbook at `data_file` with the one at `source`.
///
/// The current file, if present, is first copied into `safety_dir` as
/// `filament_data_auto_backup_<stamp>.json`.
pub fn restore_backup(data_file: &Path, source: &Path, safety_dir: &Path) -> Result<RestoreReport> {
    if !source.exists() {
        return Err(SpoolrError::Storage(format!(
            "backup file not found: {}",
            source.display()
        )));
    }
    Workbook::load(source)
        .and_then(|wb| wb.validate())
        .map_err(|e| SpoolrError::Storage(format!("{} is not a valid backup: {}", source.display(), e)))?;

    let safety_copy = if data_file.exists() {
        fs::create_dir_all(safety_dir)?;
        let path = safety_dir.join(format!("filament_data_auto_backup_{}.json", backup_stamp()));
        fs::copy(data_file, &path)?;
        info!("Saved pre-restore copy to {}", path.display());
        Some(path)
    } else {
        None
    };

    if let Some(parent) = data_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(source, data_file)?;
    info!("Restored {} from {}", data_file.display(), source.display());

    Ok(RestoreReport {
        safety_copy,
        restored_from: source.to_path_buf(),
    })
}

/// Hex SHA-256 of a file's contents.
pub fn file_digest(path: &Path) -> Result<String> {
    let contents = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&contents)))
}
