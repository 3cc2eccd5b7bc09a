//! Usage entries: the print log.
//!
//! Each entry snapshots the spool's material and variant at the time of the
//! print. Entries carry no surrogate id; they are addressed by
//! [`UsageKey`], the pair of timestamp and filament code.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::row::{Cell, Row, required_number, required_text};
use crate::error::{Result, SpoolrError};

/// Number of columns in a usage row.
pub const USAGE_COLUMNS: usize = 7;

/// One historical print job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    /// Human-readable date-time, e.g. "2024-03-14 18:05"
    pub timestamp: String,
    pub print_name: String,
    /// Spool code; the spool may since have been deleted
    pub filament_code: String,
    pub material: String,
    pub variant: String,
    pub used_weight: f64,
    /// Spool weight right after this print
    pub remaining_weight: f64,
}

/// Composite natural key of a usage entry.
///
/// Not unique: two prints logged in the same minute on the same spool share a key.
/// Lookups, deletes and edits by key act on the first matching entry in file
/// order only; later duplicates are left as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageKey {
    pub timestamp: String,
    pub filament_code: String,
}

impl UsageKey {
    pub fn new(timestamp: impl Into<String>, filament_code: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            filament_code: filament_code.into(),
        }
    }

    /// Error for a key that matches no entry.
    pub fn not_found(&self) -> SpoolrError {
        SpoolrError::UsageEntryNotFound {
            timestamp: self.timestamp.clone(),
            filament_code: self.filament_code.clone(),
        }
    }
}

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.timestamp, self.filament_code)
    }
}

impl UsageEntry {
    /// Parse a positional row:
    /// `[timestamp, print_name, filament_code, material, variant, used_weight, remaining_weight]`
    pub fn from_row(row: &[Cell]) -> Result<Self> {
        let timestamp = required_text(row, 0, "timestamp")?;
        if timestamp.trim().is_empty() {
            return Err(SpoolrError::Parse("empty usage timestamp".to_string()));
        }

        Ok(Self {
            timestamp,
            print_name: required_text(row, 1, "print_name")?,
            filament_code: required_text(row, 2, "filament_code")?,
            material: required_text(row, 3, "material")?,
            variant: required_text(row, 4, "variant")?,
            used_weight: required_number(row, 5, "used_weight")?,
            remaining_weight: required_number(row, 6, "remaining_weight")?,
        })
    }

    pub fn to_row(&self) -> Row {
        vec![
            Cell::text(&self.timestamp),
            Cell::text(&self.print_name),
            Cell::text(&self.filament_code),
            Cell::text(&self.material),
            Cell::text(&self.variant),
            Cell::Number(self.used_weight),
            Cell::Number(self.remaining_weight),
        ]
    }

    pub fn key(&self) -> UsageKey {
        UsageKey::new(&self.timestamp, &self.filament_code)
    }

    pub fn matches(&self, key: &UsageKey) -> bool {
        self.timestamp == key.timestamp && self.filament_code == key.filament_code
    }
}
