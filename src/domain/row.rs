//! Positional row representation shared by both sheets.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolrError};

/// A single workbook cell.
///
/// Serialized untagged, so a row reads as a plain JSON array:
/// `["F001", "PLA", 1000.0, null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Empty,
}

/// One row of cells, in column order.
pub type Row = Vec<Cell>;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// True for cells a spreadsheet would show as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as a string. Empty cells render as "".
    pub fn to_text(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Coerce to a number. Blank cells become `None`; numeric text is parsed.
    pub fn to_number(&self) -> Result<Option<f64>> {
        match self {
            Cell::Number(n) => Ok(Some(*n)),
            Cell::Text(s) if s.trim().is_empty() => Ok(None),
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| SpoolrError::Parse(format!("not a number: {:?}", s))),
            Cell::Bool(b) => Err(SpoolrError::Parse(format!("not a number: {}", b))),
            Cell::Empty => Ok(None),
        }
    }
}

/// Required text field at `index`.
pub(crate) fn required_text(row: &[Cell], index: usize, field: &str) -> Result<String> {
    row.get(index)
        .map(Cell::to_text)
        .ok_or_else(|| SpoolrError::Parse(format!("missing column {} ({})", index + 1, field)))
}

/// Numeric field at `index` that must be present as a column; blank means 0.
pub(crate) fn required_number(row: &[Cell], index: usize, field: &str) -> Result<f64> {
    let cell = row
        .get(index)
        .ok_or_else(|| SpoolrError::Parse(format!("missing column {} ({})", index + 1, field)))?;
    Ok(cell.to_number()?.unwrap_or(0.0))
}

/// Trailing numeric field that may be absent entirely; absent or blank means 0.
pub(crate) fn optional_number(row: &[Cell], index: usize) -> Result<f64> {
    match row.get(index) {
        Some(cell) => Ok(cell.to_number()?.unwrap_or(0.0)),
        None => Ok(0.0),
    }
}
