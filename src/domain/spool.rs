//! Spool record
//!
//! A Spool is one physical roll of filament. Its `code` is allocated once by
//! [`crate::id::allocate_next_code`] and never changes; `weight` tracks the
//! grams still on the roll and is kept in step with the print log by
//! [`crate::inventory::Inventory`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::row::{Cell, Row, optional_number, required_number, required_text};
use crate::error::{Result, SpoolrError};

/// Color used when a stored color is missing or malformed.
pub const DEFAULT_HEX_COLOR: &str = "#000000";

/// Number of columns in a spool row.
pub const SPOOL_COLUMNS: usize = 9;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One physical filament roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spool {
    /// Unique code ("F007")
    pub code: String,

    pub material: String,
    pub variant: String,
    pub supplier: String,

    pub date_opened: NaiveDate,

    /// Remaining filament in grams, never negative
    pub weight: f64,

    /// `#RRGGBB`
    pub hex_color: String,

    /// Tare mass of the empty spool in grams (informational only)
    pub empty_spool_weight: f64,

    pub description: String,
}

impl Spool {
    /// Parse a positional row:
    /// `[code, material, variant, supplier, date_opened, weight, hex_color, empty_spool_weight, description]`
    pub fn from_row(row: &[Cell]) -> Result<Self> {
        let code = required_text(row, 0, "code")?;
        if code.trim().is_empty() {
            return Err(SpoolrError::Parse("empty spool code".to_string()));
        }

        Ok(Self {
            code,
            material: required_text(row, 1, "material")?,
            variant: required_text(row, 2, "variant")?,
            supplier: required_text(row, 3, "supplier")?,
            date_opened: parse_date(row.get(4))?,
            weight: required_number(row, 5, "weight")?,
            hex_color: normalize_hex_color(row.get(6)),
            empty_spool_weight: optional_number(row, 7)?,
            description: row.get(8).map(Cell::to_text).unwrap_or_default(),
        })
    }

    /// Serialize in the fixed column order read by [`Spool::from_row`].
    pub fn to_row(&self) -> Row {
        vec![
            Cell::text(&self.code),
            Cell::text(&self.material),
            Cell::text(&self.variant),
            Cell::text(&self.supplier),
            Cell::Text(self.date_opened.format(DATE_FORMAT).to_string()),
            Cell::Number(self.weight),
            Cell::text(&self.hex_color),
            Cell::Number(self.empty_spool_weight),
            Cell::text(&self.description),
        ]
    }

    /// Display label, e.g. "PLA Silk".
    pub fn label(&self) -> String {
        format!("{} {}", self.material, self.variant)
    }
}

fn parse_date(cell: Option<&Cell>) -> Result<NaiveDate> {
    let raw = match cell {
        Some(Cell::Text(s)) if !s.trim().is_empty() => s.trim(),
        Some(other) => {
            return Err(SpoolrError::Parse(format!("invalid date_opened: {:?}", other)));
        }
        None => return Err(SpoolrError::Parse("missing column 5 (date_opened)".to_string())),
    };

    // Spreadsheet tools often store dates as full datetimes; keep the date part.
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| SpoolrError::Parse(format!("invalid date_opened: {:?}", raw)))
}

/// True for `#` followed by exactly six hex digits.
pub fn is_valid_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|digits| digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

fn normalize_hex_color(cell: Option<&Cell>) -> String {
    match cell {
        Some(Cell::Text(s)) if is_valid_hex_color(s) => s.clone(),
        _ => DEFAULT_HEX_COLOR.to_string(),
    }
}

/// Accept a user-supplied color, falling back to black when malformed.
pub fn color_or_default(value: Option<&str>) -> String {
    match value {
        Some(s) if is_valid_hex_color(s) => s.to_string(),
        _ => DEFAULT_HEX_COLOR.to_string(),
    }
}
