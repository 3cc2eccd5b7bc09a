//! Storage trait definition.

use crate::domain::{Spool, UsageEntry, UsageKey};
use crate::error::Result;

/// Persistence contract for the two tables.
///
/// Reads return whole tables. The spool table is written whole; the print
/// log is only ever changed one row at a time, so rows that fail to parse
/// are never lost by an unrelated change.
pub trait Storage {
    /// Create the backing file with header rows if it does not exist yet.
    fn ensure_initialized(&self) -> Result<()>;

    /// Read every parseable spool, in file order.
    fn read_spools(&self) -> Result<Vec<Spool>>;

    /// Replace the whole spool table with `spools`, in the given order.
    fn write_spools(&self, spools: &[Spool]) -> Result<()>;

    /// Add one row to the print log.
    fn append_usage_entry(&self, entry: &UsageEntry) -> Result<()>;

    /// Read every parseable usage entry, in file order.
    fn read_usage_entries(&self) -> Result<Vec<UsageEntry>>;

    /// Remove the first print-log row matching `key`, leaving all other rows
    /// in place. Fails with `UsageEntryNotFound` if nothing matches.
    fn remove_usage_entry(&self, key: &UsageKey) -> Result<()>;

    /// Overwrite the first print-log row matching `key` with `entry`.
    /// Fails with `UsageEntryNotFound` if nothing matches.
    fn replace_usage_entry(&self, key: &UsageKey, entry: &UsageEntry) -> Result<()>;
}
