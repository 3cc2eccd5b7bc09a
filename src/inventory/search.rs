//! Spool lookup by material, supplier and remaining weight.

use super::Inventory;
use crate::domain::Spool;
use crate::error::{Result, SpoolrError};
use crate::storage::Storage;

/// Criteria for [`Inventory::find_spools`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpoolFilter {
    /// Case-insensitive exact material match
    pub material: Option<String>,
    /// Case-insensitive exact supplier match
    pub supplier: Option<String>,
    /// Minimum grams left on the spool
    pub min_weight: Option<f64>,
}

impl SpoolFilter {
    pub fn matches(&self, spool: &Spool) -> bool {
        let material_ok = self
            .material
            .as_deref()
            .is_none_or(|m| spool.material.eq_ignore_ascii_case(m));
        let supplier_ok = self
            .supplier
            .as_deref()
            .is_none_or(|s| spool.supplier.eq_ignore_ascii_case(s));
        let weight_ok = self.min_weight.is_none_or(|w| spool.weight >= w);
        material_ok && supplier_ok && weight_ok
    }
}

impl<S: Storage> Inventory<'_, S> {
    /// Spools matching `filter`, heaviest first.
    pub fn find_spools(&self, filter: &SpoolFilter) -> Result<Vec<Spool>> {
        if let Some(min) = filter.min_weight {
            if !min.is_finite() || min < 0.0 {
                return Err(SpoolrError::InvalidAmount(format!(
                    "minimum weight must be a number >= 0, got {}",
                    min
                )));
            }
        }

        let mut found: Vec<Spool> = self
            .storage
            .read_spools()?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        found.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Ok(found)
    }
}
