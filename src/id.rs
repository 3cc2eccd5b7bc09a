//! ID generation utilities for Spoolr
//!
//! Provides spool code allocation and the timestamps used as usage-entry keys
//! and backup file names.

use chrono::Local;

use crate::domain::Spool;

/// Default format for usage-entry timestamps (minute precision)
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prefix shared by every allocated spool code
pub const CODE_PREFIX: char = 'F';

/// Numeric part of a code shaped `F<digits>`, or None for any other code.
pub fn code_sequence(code: &str) -> Option<u64> {
    let digits = code.strip_prefix(CODE_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Allocate the next spool code
///
/// Format: `F{seq:03}` where `seq` is one past the highest existing sequence.
/// Codes not shaped `F<digits>` are ignored. The padding widens past 999:
/// `F999` is followed by `F1000`.
pub fn allocate_next_code(spools: &[Spool]) -> String {
    let next = spools
        .iter()
        .filter_map(|s| code_sequence(&s.code))
        .max()
        .map_or(1, |highest| highest + 1);
    format!("{}{:03}", CODE_PREFIX, next)
}

/// Current local time rendered with `format`
pub fn now_timestamp(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// Stamp used in backup file names, e.g. `20240314_180512`
pub fn backup_stamp() -> String {
    now_timestamp("%Y%m%d_%H%M%S")
}
