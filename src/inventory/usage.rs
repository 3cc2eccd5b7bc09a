//! Print-log reconciliation: registering, correcting and removing usage.

use log::{info, warn};

use super::Inventory;
use crate::domain::{UsageEntry, UsageKey};
use crate::error::{Result, SpoolrError};
use crate::id::now_timestamp;
use crate::storage::Storage;

/// Correction applied to an existing usage entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEdit {
    pub used_weight: f64,
    pub print_name: Option<String>,
}

impl UsageEdit {
    pub fn used_weight(used_weight: f64) -> Self {
        Self {
            used_weight,
            print_name: None,
        }
    }
}

fn require_positive(used_weight: f64) -> Result<()> {
    if !used_weight.is_finite() || used_weight <= 0.0 {
        return Err(SpoolrError::InvalidAmount(format!(
            "used weight must be greater than 0, got {}",
            used_weight
        )));
    }
    Ok(())
}

impl<S: Storage> Inventory<'_, S> {
    /// Print-log entries, oldest first, optionally for one spool only.
    pub fn list_usage(&self, code: Option<&str>) -> Result<Vec<UsageEntry>> {
        let entries = self.storage.read_usage_entries()?;
        Ok(match code {
            Some(code) => entries.into_iter().filter(|e| e.filament_code == code).collect(),
            None => entries,
        })
    }

    /// Record a print that consumed `used_weight` grams from spool `code`,
    /// stamped with the current local time.
    pub fn register_usage(&self, code: &str, print_name: &str, used_weight: f64) -> Result<UsageEntry> {
        let timestamp = now_timestamp(&self.timestamp_format);
        self.register_usage_at(code, print_name, used_weight, &timestamp)
    }

    /// Record a print with an explicit timestamp.
    ///
    /// The spool table is written first; the print-log row is appended after.
    pub fn register_usage_at(
        &self,
        code: &str,
        print_name: &str,
        used_weight: f64,
        timestamp: &str,
    ) -> Result<UsageEntry> {
        require_positive(used_weight)?;
        if print_name.trim().is_empty() {
            return Err(SpoolrError::InvalidInput("print name is required".to_string()));
        }

        let mut spools = self.storage.read_spools()?;
        let spool = spools
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| SpoolrError::SpoolNotFound(code.to_string()))?;

        if used_weight > spool.weight {
            return Err(SpoolrError::InsufficientStock {
                code: code.to_string(),
                available: spool.weight,
                requested: used_weight,
            });
        }

        spool.weight -= used_weight;
        let entry = UsageEntry {
            timestamp: timestamp.to_string(),
            print_name: print_name.to_string(),
            filament_code: code.to_string(),
            material: spool.material.clone(),
            variant: spool.variant.clone(),
            used_weight,
            remaining_weight: spool.weight,
        };

        self.storage.write_spools(&spools)?;
        self.storage.append_usage_entry(&entry)?;

        info!(
            "Registered {}g on {} for '{}', {}g left",
            used_weight, code, print_name, entry.remaining_weight
        );
        Ok(entry)
    }

    /// Remove a usage entry, returning its grams to the spool if the spool
    /// still exists. Acts on the first entry matching `key`; every other
    /// print-log row stays untouched.
    pub fn delete_usage(&self, key: &UsageKey) -> Result<UsageEntry> {
        let removed = self.find_usage(key)?;

        let mut spools = self.storage.read_spools()?;
        match spools.iter_mut().find(|s| s.code == key.filament_code) {
            Some(spool) => {
                spool.weight += removed.used_weight;
                self.storage.write_spools(&spools)?;
            }
            None => warn!(
                "Spool {} no longer exists, removing usage entry without restoring stock",
                key.filament_code
            ),
        }

        self.storage.remove_usage_entry(key)?;

        info!("Removed usage entry {} ({}g)", key, removed.used_weight);
        Ok(removed)
    }

    /// Correct the grams (and optionally the name) of a usage entry.
    ///
    /// The difference between the old and new amount is applied to the spool;
    /// the entry's remaining weight becomes the spool's weight afterwards.
    /// The spool must still exist.
    pub fn edit_usage(&self, key: &UsageKey, edit: UsageEdit) -> Result<UsageEntry> {
        require_positive(edit.used_weight)?;
        if let Some(name) = &edit.print_name {
            if name.trim().is_empty() {
                return Err(SpoolrError::InvalidInput("print name is required".to_string()));
            }
        }

        let mut updated = self.find_usage(key)?;

        let mut spools = self.storage.read_spools()?;
        let spool = spools
            .iter_mut()
            .find(|s| s.code == key.filament_code)
            .ok_or_else(|| SpoolrError::SpoolNotFound(key.filament_code.clone()))?;

        let delta = updated.used_weight - edit.used_weight;
        let new_weight = spool.weight + delta;
        if new_weight < 0.0 {
            return Err(SpoolrError::InsufficientStock {
                code: spool.code.clone(),
                available: spool.weight,
                requested: -delta,
            });
        }
        spool.weight = new_weight;
        self.storage.write_spools(&spools)?;

        updated.used_weight = edit.used_weight;
        updated.remaining_weight = new_weight;
        if let Some(name) = edit.print_name {
            updated.print_name = name;
        }
        self.storage.replace_usage_entry(key, &updated)?;

        info!("Updated usage entry {} to {}g", key, updated.used_weight);
        Ok(updated)
    }

    fn find_usage(&self, key: &UsageKey) -> Result<UsageEntry> {
        self.storage
            .read_usage_entries()?
            .into_iter()
            .find(|e| e.matches(key))
            .ok_or_else(|| key.not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::testing::{MemoryStorage, entry, spool};

    const TS: &str = "2024-02-11 09:00";

    #[test]
    fn test_register_usage_subtracts_and_logs() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::new(&storage);

        let logged = inventory.register_usage_at("F001", "Benchy", 30.0, TS).unwrap();

        assert_eq!(storage.spools.borrow()[0].weight, 70.0);
        assert_eq!(logged.used_weight, 30.0);
        assert_eq!(logged.remaining_weight, 70.0);
        assert_eq!(logged.material, "PLA");
        assert_eq!(logged.variant, "Matte");
        assert_eq!(*storage.entries.borrow(), vec![logged]);
    }

    #[test]
    fn test_register_usage_can_empty_spool() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::new(&storage);
        let logged = inventory.register_usage_at("F001", "Big print", 100.0, TS).unwrap();
        assert_eq!(logged.remaining_weight, 0.0);
    }

    #[test]
    fn test_register_usage_insufficient_stock() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::new(&storage);

        let err = inventory.register_usage_at("F001", "Helmet", 150.0, TS).unwrap_err();

        assert!(matches!(err, SpoolrError::InsufficientStock { .. }));
        assert_eq!(storage.spools.borrow()[0].weight, 100.0);
        assert_eq!(storage.spool_writes.get(), 0);
        assert!(storage.entries.borrow().is_empty());
    }

    #[test]
    fn test_register_usage_rejects_non_positive() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::new(&storage);
        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                inventory.register_usage_at("F001", "x", amount, TS),
                Err(SpoolrError::InvalidAmount(_))
            ));
        }
        assert_eq!(storage.spool_writes.get(), 0);
    }

    #[test]
    fn test_register_usage_requires_name() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::new(&storage);
        assert!(matches!(
            inventory.register_usage_at("F001", "  ", 1.0, TS),
            Err(SpoolrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_register_usage_unknown_spool() {
        let storage = MemoryStorage::default();
        let inventory = Inventory::new(&storage);
        assert!(matches!(
            inventory.register_usage_at("F404", "x", 1.0, TS),
            Err(SpoolrError::SpoolNotFound(_))
        ));
    }

    #[test]
    fn test_register_usage_spool_write_failure_leaves_log_untouched() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        storage.fail_spool_writes.set(true);
        let inventory = Inventory::new(&storage);

        let err = inventory.register_usage_at("F001", "x", 10.0, TS).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(storage.spools.borrow()[0].weight, 100.0);
        assert!(storage.entries.borrow().is_empty());
    }

    #[test]
    fn test_register_usage_log_failure_after_stock_update() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        storage.fail_usage_writes.set(true);
        let inventory = Inventory::new(&storage);

        assert!(inventory.register_usage_at("F001", "x", 10.0, TS).is_err());

        // Stock was persisted first; history lags.
        assert_eq!(storage.spools.borrow()[0].weight, 90.0);
        assert!(storage.entries.borrow().is_empty());
    }

    #[test]
    fn test_register_usage_uses_timestamp_format() {
        let storage = MemoryStorage::with(vec![spool("F001", 100.0)], vec![]);
        let inventory = Inventory::with_timestamp_format(&storage, "%Y");
        let logged = inventory.register_usage("F001", "x", 1.0).unwrap();
        assert_eq!(logged.timestamp.len(), 4);
    }

    #[test]
    fn test_delete_usage_restores_stock() {
        let storage = MemoryStorage::with(
            vec![spool("F001", 70.0)],
            vec![entry(TS, "F001", 30.0, 70.0)],
        );
        let inventory = Inventory::new(&storage);

        let removed = inventory.delete_usage(&UsageKey::new(TS, "F001")).unwrap();

        assert_eq!(removed.used_weight, 30.0);
        assert_eq!(storage.spools.borrow()[0].weight, 100.0);
        assert!(storage.entries.borrow().is_empty());
    }

    #[test]
    fn test_delete_usage_orphaned_entry() {
        let storage = MemoryStorage::with(vec![spool("F002", 5.0)], vec![entry(TS, "F001", 30.0, 70.0)]);
        let inventory = Inventory::new(&storage);

        inventory.delete_usage(&UsageKey::new(TS, "F001")).unwrap();

        assert!(storage.entries.borrow().is_empty());
        assert_eq!(storage.spools.borrow()[0].weight, 5.0);
        assert_eq!(storage.spool_writes.get(), 0);
    }

    #[test]
    fn test_delete_usage_missing_entry() {
        let storage = MemoryStorage::with(vec![spool("F001", 70.0)], vec![entry(TS, "F001", 30.0, 70.0)]);
        let inventory = Inventory::new(&storage);

        let err = inventory
            .delete_usage(&UsageKey::new("2030-01-01 00:00", "F001"))
            .unwrap_err();

        assert!(matches!(err, SpoolrError::UsageEntryNotFound { .. }));
        assert_eq!(storage.spools.borrow()[0].weight, 70.0);
        assert_eq!(storage.entries.borrow().len(), 1);
    }

    #[test]
    fn test_delete_usage_removes_only_first_duplicate() {
        let storage = MemoryStorage::with(
            vec![spool("F001", 50.0)],
            vec![entry(TS, "F001", 30.0, 70.0), entry(TS, "F001", 20.0, 50.0)],
        );
        let inventory = Inventory::new(&storage);

        let removed = inventory.delete_usage(&UsageKey::new(TS, "F001")).unwrap();

        assert_eq!(removed.used_weight, 30.0);
        assert_eq!(storage.spools.borrow()[0].weight, 80.0);
        assert_eq!(storage.entries.borrow().len(), 1);
        assert_eq!(storage.entries.borrow()[0].used_weight, 20.0);
    }

    #[test]
    fn test_edit_usage_reduces_consumption() {
        let storage = MemoryStorage::with(
            vec![spool("F001", 70.0)],
            vec![entry(TS, "F001", 30.0, 70.0)],
        );
        let inventory = Inventory::new(&storage);

        let updated = inventory
            .edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(20.0))
            .unwrap();

        assert_eq!(storage.spools.borrow()[0].weight, 80.0);
        assert_eq!(updated.used_weight, 20.0);
        assert_eq!(updated.remaining_weight, 80.0);
        assert_eq!(storage.entries.borrow()[0], updated);
    }

    #[test]
    fn test_edit_usage_increases_consumption() {
        let storage = MemoryStorage::with(
            vec![spool("F001", 70.0)],
            vec![entry(TS, "F001", 30.0, 70.0)],
        );
        let inventory = Inventory::new(&storage);

        let updated = inventory
            .edit_usage(
                &UsageKey::new(TS, "F001"),
                UsageEdit {
                    used_weight: 50.0,
                    print_name: Some("Bracket v2".to_string()),
                },
            )
            .unwrap();

        assert_eq!(storage.spools.borrow()[0].weight, 50.0);
        assert_eq!(updated.remaining_weight, 50.0);
        assert_eq!(updated.print_name, "Bracket v2");
    }

    #[test]
    fn test_edit_usage_cannot_overdraw() {
        let storage = MemoryStorage::with(
            vec![spool("F001", 10.0)],
            vec![entry(TS, "F001", 30.0, 10.0)],
        );
        let inventory = Inventory::new(&storage);

        let err = inventory
            .edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(50.0))
            .unwrap_err();

        assert!(matches!(err, SpoolrError::InsufficientStock { .. }));
        assert_eq!(storage.spools.borrow()[0].weight, 10.0);
        assert_eq!(storage.entries.borrow()[0].used_weight, 30.0);
    }

    #[test]
    fn test_edit_usage_validates_before_lookup() {
        let storage = MemoryStorage::default();
        let inventory = Inventory::new(&storage);
        assert!(matches!(
            inventory.edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(0.0)),
            Err(SpoolrError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_edit_usage_missing_entry() {
        let storage = MemoryStorage::with(vec![spool("F001", 10.0)], vec![]);
        let inventory = Inventory::new(&storage);
        assert!(matches!(
            inventory.edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(5.0)),
            Err(SpoolrError::UsageEntryNotFound { .. })
        ));
    }

    #[test]
    fn test_edit_usage_requires_existing_spool() {
        let original = entry(TS, "F009", 30.0, 70.0);
        let storage = MemoryStorage::with(vec![spool("F001", 500.0)], vec![original.clone()]);
        let inventory = Inventory::new(&storage);

        let err = inventory
            .edit_usage(&UsageKey::new(TS, "F009"), UsageEdit::used_weight(20.0))
            .unwrap_err();

        assert!(matches!(err, SpoolrError::SpoolNotFound(ref code) if code == "F009"));
        assert_eq!(*storage.entries.borrow(), vec![original]);
        assert_eq!(storage.spools.borrow()[0].weight, 500.0);
        assert_eq!(storage.spool_writes.get(), 0);
    }

    #[test]
    fn test_edit_usage_log_failure_after_stock_update() {
        let storage = MemoryStorage::with(vec![spool("F001", 70.0)], vec![entry(TS, "F001", 30.0, 70.0)]);
        storage.fail_usage_writes.set(true);
        let inventory = Inventory::new(&storage);

        assert!(inventory
            .edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(20.0))
            .is_err());

        assert_eq!(storage.spools.borrow()[0].weight, 80.0);
        assert_eq!(storage.entries.borrow()[0].used_weight, 30.0);
    }

    #[test]
    fn test_edit_keeps_material_snapshot() {
        let mut renamed = spool("F001", 70.0);
        renamed.material = "ABS".to_string();
        let storage = MemoryStorage::with(vec![renamed], vec![entry(TS, "F001", 30.0, 70.0)]);
        let inventory = Inventory::new(&storage);

        let updated = inventory
            .edit_usage(&UsageKey::new(TS, "F001"), UsageEdit::used_weight(25.0))
            .unwrap();

        assert_eq!(updated.material, "PLA");
    }

    #[test]
    fn test_list_usage_by_code() {
        let storage = MemoryStorage::with(
            vec![],
            vec![entry(TS, "F001", 1.0, 1.0), entry(TS, "F002", 2.0, 2.0)],
        );
        let inventory = Inventory::new(&storage);
        assert_eq!(inventory.list_usage(None).unwrap().len(), 2);
        let only = inventory.list_usage(Some("F002")).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].filament_code, "F002");
    }
}
