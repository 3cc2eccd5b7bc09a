//! Domain types for Spoolr
//!
//! This module contains the record model:
//! - Cell/Row: the flat, positional form records take in the workbook
//! - Spool: one physical filament roll
//! - UsageEntry: one historical print job that consumed filament

pub mod row;
pub mod spool;
pub mod usage;

pub use row::{Cell, Row};
pub use spool::{DEFAULT_HEX_COLOR, Spool};
pub use usage::{UsageEntry, UsageKey};
