//! Workbook-file storage implementation.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::traits::Storage;
use super::workbook::{FIRST_DATA_ROW, SPOOL_HEADERS, SPOOL_SHEET, Sheet, USAGE_HEADERS, USAGE_SHEET, Workbook};
use crate::domain::{Cell, Row, Spool, UsageEntry, UsageKey};
use crate::error::Result;

/// Storage backed by a single workbook file.
///
/// Holds no cache: every call loads the whole file and every write saves the
/// whole file back.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
}

impl WorkbookStore {
    /// Create a store bound to `path`. Nothing is touched on disk until
    /// [`Storage::ensure_initialized`] or the first read/write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Workbook> {
        debug!("Loading workbook {}", self.path.display());
        Workbook::load(&self.path)
    }

    /// Load, apply `f`, save.
    fn modify(&self, f: impl FnOnce(&mut Workbook) -> Result<()>) -> Result<()> {
        let mut workbook = self.load()?;
        f(&mut workbook)?;
        workbook.save(&self.path)?;
        debug!("Saved workbook {}", self.path.display());
        Ok(())
    }
}

/// Parse every data row of a sheet, skipping blank-key rows silently and
/// unparseable rows with a warning.
fn parse_rows<T>(
    workbook: &Workbook,
    sheet: &str,
    parse: impl Fn(&[Cell]) -> Result<T>,
) -> Result<Vec<T>> {
    let sheet = workbook.sheet(sheet)?;
    let mut records = Vec::new();
    for (row_number, row) in sheet.data_rows() {
        if row.first().is_none_or(|cell| cell.is_blank()) {
            continue;
        }
        match parse(row.as_slice()) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {} row {}: {}", sheet.name, row_number, e),
        }
    }
    Ok(records)
}

impl Storage for WorkbookStore {
    fn ensure_initialized(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Workbook::with_headers().save(&self.path)?;
        info!("Created workbook {}", self.path.display());
        Ok(())
    }

    fn read_spools(&self) -> Result<Vec<Spool>> {
        let workbook = self.load()?;
        parse_rows(&workbook, SPOOL_SHEET, Spool::from_row)
    }

    fn write_spools(&self, spools: &[Spool]) -> Result<()> {
        self.modify(|workbook| {
            let sheet = workbook.sheet_mut(SPOOL_SHEET)?;
            let rows: Vec<Row> = spools.iter().map(Spool::to_row).collect();
            sheet.replace_data_rows(&SPOOL_HEADERS, rows);
            for (idx, spool) in spools.iter().enumerate() {
                sheet.set_fill(FIRST_DATA_ROW + idx, &spool.hex_color);
            }
            Ok(())
        })?;
        debug!("Wrote {} spools", spools.len());
        Ok(())
    }

    fn append_usage_entry(&self, entry: &UsageEntry) -> Result<()> {
        self.modify(|workbook| {
            workbook
                .sheet_mut(USAGE_SHEET)?
                .append_row(&USAGE_HEADERS, entry.to_row());
            Ok(())
        })?;
        debug!("Appended usage entry {}", entry.key());
        Ok(())
    }

    fn read_usage_entries(&self) -> Result<Vec<UsageEntry>> {
        let workbook = self.load()?;
        parse_rows(&workbook, USAGE_SHEET, UsageEntry::from_row)
    }

    fn remove_usage_entry(&self, key: &UsageKey) -> Result<()> {
        self.modify(|workbook| {
            let sheet = workbook.sheet_mut(USAGE_SHEET)?;
            let row_number = find_usage_row(sheet, key).ok_or_else(|| key.not_found())?;
            sheet.remove_row(row_number);
            Ok(())
        })?;
        debug!("Removed usage entry {}", key);
        Ok(())
    }

    fn replace_usage_entry(&self, key: &UsageKey, entry: &UsageEntry) -> Result<()> {
        self.modify(|workbook| {
            let sheet = workbook.sheet_mut(USAGE_SHEET)?;
            let row_number = find_usage_row(sheet, key).ok_or_else(|| key.not_found())?;
            sheet.replace_row(row_number, entry.to_row());
            Ok(())
        })?;
        debug!("Replaced usage entry {}", key);
        Ok(())
    }
}

/// Row number of the first parseable print-log row matching `key`.
fn find_usage_row(sheet: &Sheet, key: &UsageKey) -> Option<usize> {
    sheet
        .data_rows()
        .find(|(_, row)| UsageEntry::from_row(row).is_ok_and(|entry| entry.matches(key)))
        .map(|(row_number, _)| row_number)
}
