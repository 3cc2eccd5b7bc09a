//! On-disk workbook format.
//!
//! The backing file is a JSON document holding named sheets. Each sheet is a
//! list of positional rows; row 1 is the header and data starts at row 2.
//! Sheets may carry display-only fill colors keyed by row number.
//!
//! ```json
//! {"sheets": [
//!   {"name": "Filament_Data",
//!    "rows": [["id", "color", ...], ["F001", "PLA", ...]],
//!    "fills": {"2": "FF0000"}},
//!   {"name": "Print_Log", "rows": [["timestamp", ...]]}
//! ]}
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Cell, Row};
use crate::error::{Result, SpoolrError};

/// Sheet holding spools
pub const SPOOL_SHEET: &str = "Filament_Data";

/// Sheet holding the print log
pub const USAGE_SHEET: &str = "Print_Log";

pub const SPOOL_HEADERS: [&str; 9] = [
    "id",
    "color",
    "variant",
    "supplier",
    "date_opened",
    "weight_g",
    "hex_color",
    "empty_spool_weight",
    "description",
];

pub const USAGE_HEADERS: [&str; 7] = [
    "timestamp",
    "print_name",
    "filament_code",
    "material",
    "variant",
    "used_weight",
    "remaining_weight",
];

/// Row number (1-based, header included) of the first data row.
pub const FIRST_DATA_ROW: usize = 2;

/// A whole workbook, loaded into memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// One named table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,

    #[serde(default)]
    pub rows: Vec<Row>,

    /// Row number -> `RRGGBB` background, display only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fills: BTreeMap<usize, String>,
}

impl Workbook {
    /// A fresh workbook with both sheets holding only their header rows.
    pub fn with_headers() -> Self {
        Self {
            sheets: vec![
                Sheet::new(SPOOL_SHEET, &SPOOL_HEADERS),
                Sheet::new(USAGE_SHEET, &USAGE_HEADERS),
            ],
        }
    }

    /// Read and parse a workbook file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let workbook = serde_json::from_reader(BufReader::new(file))?;
        Ok(workbook)
    }

    /// Write the whole workbook.
    ///
    /// Goes through a sibling temp file and a rename so a failed write leaves
    /// the previous contents in place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| missing_sheet(name))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| missing_sheet(name))
    }

    /// Both expected sheets are present.
    pub fn validate(&self) -> Result<()> {
        self.sheet(SPOOL_SHEET)?;
        self.sheet(USAGE_SHEET)?;
        Ok(())
    }
}

impl Sheet {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            rows: vec![header_row(headers)],
            fills: BTreeMap::new(),
        }
    }

    /// Data rows paired with their 1-based row numbers.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx + 1, row))
    }

    /// Drop every data row and fill, then write `rows` after the header.
    ///
    /// A missing header row is restored from `headers`.
    pub fn replace_data_rows(&mut self, headers: &[&str], rows: Vec<Row>) {
        if self.rows.is_empty() {
            self.rows.push(header_row(headers));
        }
        self.rows.truncate(1);
        self.rows.extend(rows);
        self.fills.clear();
    }

    /// Append one row after the last existing row, returning its row number.
    pub fn append_row(&mut self, headers: &[&str], row: Row) -> usize {
        if self.rows.is_empty() {
            self.rows.push(header_row(headers));
        }
        self.rows.push(row);
        self.rows.len()
    }

    /// Remove the data row at `row_number`. Rows and fills below it move up
    /// by one. Returns None for the header or an out-of-range number.
    pub fn remove_row(&mut self, row_number: usize) -> Option<Row> {
        if row_number < FIRST_DATA_ROW || row_number > self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(row_number - 1);
        self.fills = std::mem::take(&mut self.fills)
            .into_iter()
            .filter_map(|(n, color)| match n.cmp(&row_number) {
                Ordering::Less => Some((n, color)),
                Ordering::Equal => None,
                Ordering::Greater => Some((n - 1, color)),
            })
            .collect();
        Some(removed)
    }

    /// Overwrite the data row at `row_number`, returning the old row.
    pub fn replace_row(&mut self, row_number: usize, row: Row) -> Option<Row> {
        if row_number < FIRST_DATA_ROW || row_number > self.rows.len() {
            return None;
        }
        Some(std::mem::replace(&mut self.rows[row_number - 1], row))
    }

    /// Record a background color for a row. `color` may carry a leading `#`.
    pub fn set_fill(&mut self, row_number: usize, color: &str) {
        self.fills
            .insert(row_number, color.trim_start_matches('#').to_uppercase());
    }
}

fn header_row(headers: &[&str]) -> Row {
    headers.iter().map(|h| Cell::text(*h)).collect()
}

fn missing_sheet(name: &str) -> SpoolrError {
    SpoolrError::Storage(format!("workbook has no sheet named {}", name))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_headers() {
        let wb = Workbook::with_headers();
        let spools = wb.sheet(SPOOL_SHEET).unwrap();
        assert_eq!(spools.rows.len(), 1);
        assert_eq!(spools.rows[0].len(), 9);
        assert_eq!(spools.rows[0][5], Cell::text("weight_g"));
        let usage = wb.sheet(USAGE_SHEET).unwrap();
        assert_eq!(usage.rows[0].len(), 7);
        assert_eq!(usage.data_rows().count(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("book.json");

        let mut wb = Workbook::with_headers();
        let sheet = wb.sheet_mut(SPOOL_SHEET).unwrap();
        let row_number = sheet.append_row(&SPOOL_HEADERS, vec![Cell::text("F001"), Cell::Number(1.5)]);
        sheet.set_fill(row_number, "#ff8800");
        wb.save(&path).unwrap();

        let loaded = Workbook::load(&path).unwrap();
        assert_eq!(loaded, wb);
        assert_eq!(loaded.sheet(SPOOL_SHEET).unwrap().fills.get(&2), Some(&"FF8800".to_string()));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_missing_sheet() {
        let wb = Workbook { sheets: vec![] };
        let err = wb.sheet(USAGE_SHEET).unwrap_err();
        assert!(err.to_string().contains("Print_Log"));
        assert!(wb.validate().is_err());
    }

    #[test]
    fn test_data_rows_numbering() {
        let mut sheet = Sheet::new(USAGE_SHEET, &USAGE_HEADERS);
        sheet.append_row(&USAGE_HEADERS, vec![Cell::text("a")]);
        sheet.append_row(&USAGE_HEADERS, vec![Cell::text("b")]);
        let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn test_replace_keeps_header_and_clears_fills() {
        let mut sheet = Sheet::new(SPOOL_SHEET, &SPOOL_HEADERS);
        sheet.append_row(&SPOOL_HEADERS, vec![Cell::text("old")]);
        sheet.set_fill(2, "000000");

        sheet.replace_data_rows(&SPOOL_HEADERS, vec![vec![Cell::text("new")]]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0], Cell::text("id"));
        assert_eq!(sheet.rows[1][0], Cell::text("new"));
        assert!(sheet.fills.is_empty());
    }

    #[test]
    fn test_remove_row_shifts_fills() {
        let mut sheet = Sheet::new(SPOOL_SHEET, &SPOOL_HEADERS);
        for (code, color) in [("F001", "111111"), ("F002", "222222"), ("F003", "333333")] {
            let n = sheet.append_row(&SPOOL_HEADERS, vec![Cell::text(code)]);
            sheet.set_fill(n, color);
        }

        let removed = sheet.remove_row(3).unwrap();

        assert_eq!(removed[0], Cell::text("F002"));
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2][0], Cell::text("F003"));
        assert_eq!(sheet.fills.get(&2).map(String::as_str), Some("111111"));
        assert_eq!(sheet.fills.get(&3).map(String::as_str), Some("333333"));
        assert_eq!(sheet.fills.len(), 2);
    }

    #[test]
    fn test_remove_and_replace_reject_header_and_out_of_range() {
        let mut sheet = Sheet::new(USAGE_SHEET, &USAGE_HEADERS);
        sheet.append_row(&USAGE_HEADERS, vec![Cell::text("a")]);
        assert!(sheet.remove_row(1).is_none());
        assert!(sheet.remove_row(3).is_none());
        assert!(sheet.replace_row(1, vec![]).is_none());
        assert!(sheet.replace_row(5, vec![]).is_none());
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_replace_row_in_place() {
        let mut sheet = Sheet::new(USAGE_SHEET, &USAGE_HEADERS);
        sheet.append_row(&USAGE_HEADERS, vec![Cell::text("a")]);
        sheet.append_row(&USAGE_HEADERS, vec![Cell::text("b")]);

        let old = sheet.replace_row(2, vec![Cell::text("c")]).unwrap();

        assert_eq!(old, vec![Cell::text("a")]);
        assert_eq!(sheet.rows[1], vec![Cell::text("c")]);
        assert_eq!(sheet.rows[2], vec![Cell::text("b")]);
    }

    #[test]
    fn test_replace_restores_missing_header() {
        let mut sheet = Sheet {
            name: SPOOL_SHEET.to_string(),
            rows: vec![],
            fills: BTreeMap::new(),
        };
        sheet.replace_data_rows(&SPOOL_HEADERS, vec![]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].len(), SPOOL_HEADERS.len());
    }

    #[test]
    fn test_load_tolerates_missing_rows_field() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("book.json");
        fs::write(&path, r#"{"sheets":[{"name":"Filament_Data"},{"name":"Print_Log","rows":[]}]}"#).unwrap();
        let wb = Workbook::load(&path).unwrap();
        assert!(wb.validate().is_ok());
        assert!(wb.sheet(SPOOL_SHEET).unwrap().rows.is_empty());
    }
}
