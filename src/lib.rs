//! Spoolr - filament spool inventory and print log
//!
//! Spoolr keeps a table of filament spools and a log of the prints that used
//! them in a single workbook file, and keeps each spool's remaining weight in
//! step with its print history.

pub mod domain;
pub mod error;
pub mod id;
pub mod inventory;
pub mod storage;

pub use error::{Result, SpoolrError};
