//! Storage layer for Spoolr - one workbook file holding the spool table and
//! the print log.
//!
//! `Storage` is the contract; `WorkbookStore` is the file-backed
//! implementation; `backup` copies the same file in and out.

pub mod backup;
mod store;
mod traits;
pub mod workbook;

pub use backup::{BackupReport, RestoreReport, create_backup, default_backup_name, restore_backup};
pub use store::WorkbookStore;
pub use traits::Storage;
pub use workbook::{SPOOL_HEADERS, SPOOL_SHEET, USAGE_HEADERS, USAGE_SHEET, Workbook};
