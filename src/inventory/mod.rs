//! Inventory operations over a [`Storage`].
//!
//! `Inventory` is what a front end calls. It owns the rules that keep spool
//! weights consistent with the print log: amounts are validated and the spool
//! table is persisted before the print log is touched, so a failure halfway
//! leaves stock figures correct even if history lags behind.

mod search;
mod usage;

use chrono::NaiveDate;
use log::info;

use crate::domain::Spool;
use crate::domain::spool::{color_or_default, is_valid_hex_color};
use crate::error::{Result, SpoolrError};
use crate::id::{DEFAULT_TIMESTAMP_FORMAT, allocate_next_code};
use crate::storage::Storage;

pub use search::SpoolFilter;
pub use usage::UsageEdit;

/// Fields for a spool that does not have a code yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpool {
    pub material: String,
    pub variant: String,
    pub supplier: String,
    pub date_opened: NaiveDate,
    pub weight: f64,
    pub empty_spool_weight: f64,
    /// `#RRGGBB`; None means black
    pub hex_color: Option<String>,
    pub description: String,
}

/// Field-wise changes to an existing spool. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpoolUpdate {
    pub material: Option<String>,
    pub variant: Option<String>,
    pub supplier: Option<String>,
    pub date_opened: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub empty_spool_weight: Option<f64>,
    pub hex_color: Option<String>,
    pub description: Option<String>,
}

/// Spool and print-log operations over a borrowed store.
pub struct Inventory<'a, S: Storage> {
    storage: &'a S,
    timestamp_format: String,
}

impl<'a, S: Storage> Inventory<'a, S> {
    /// Create an Inventory using the default timestamp format.
    pub fn new(storage: &'a S) -> Self {
        Self::with_timestamp_format(storage, DEFAULT_TIMESTAMP_FORMAT)
    }

    pub fn with_timestamp_format(storage: &'a S, format: impl Into<String>) -> Self {
        Self {
            storage,
            timestamp_format: format.into(),
        }
    }

    /// All spools, in file order.
    pub fn list_spools(&self) -> Result<Vec<Spool>> {
        self.storage.read_spools()
    }

    /// Get a spool by code.
    pub fn get_spool(&self, code: &str) -> Result<Spool> {
        self.storage
            .read_spools()?
            .into_iter()
            .find(|s| s.code == code)
            .ok_or_else(|| SpoolrError::SpoolNotFound(code.to_string()))
    }

    /// Code the next added spool will receive.
    pub fn next_code(&self) -> Result<String> {
        Ok(allocate_next_code(&self.storage.read_spools()?))
    }

    /// Add a spool under a freshly allocated code.
    pub fn add_spool(&self, new: NewSpool) -> Result<Spool> {
        require_text("material", &new.material)?;
        require_text("variant", &new.variant)?;
        require_text("supplier", &new.supplier)?;
        require_weight("weight", new.weight)?;
        require_weight("empty spool weight", new.empty_spool_weight)?;
        if let Some(color) = &new.hex_color {
            require_color(color)?;
        }

        let mut spools = self.storage.read_spools()?;
        let spool = Spool {
            code: allocate_next_code(&spools),
            material: new.material,
            variant: new.variant,
            supplier: new.supplier,
            date_opened: new.date_opened,
            weight: new.weight,
            hex_color: color_or_default(new.hex_color.as_deref()),
            empty_spool_weight: new.empty_spool_weight,
            description: new.description,
        };
        spools.push(spool.clone());
        self.storage.write_spools(&spools)?;

        info!("Added spool {} ({}, {}g)", spool.code, spool.label(), spool.weight);
        Ok(spool)
    }

    /// Apply `update` to the spool with `code`. The code itself never changes.
    pub fn update_spool(&self, code: &str, update: SpoolUpdate) -> Result<Spool> {
        if let Some(material) = &update.material {
            require_text("material", material)?;
        }
        if let Some(variant) = &update.variant {
            require_text("variant", variant)?;
        }
        if let Some(supplier) = &update.supplier {
            require_text("supplier", supplier)?;
        }
        if let Some(weight) = update.weight {
            require_weight("weight", weight)?;
        }
        if let Some(weight) = update.empty_spool_weight {
            require_weight("empty spool weight", weight)?;
        }
        if let Some(color) = &update.hex_color {
            require_color(color)?;
        }

        let mut spools = self.storage.read_spools()?;
        let spool = spools
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| SpoolrError::SpoolNotFound(code.to_string()))?;

        if let Some(material) = update.material {
            spool.material = material;
        }
        if let Some(variant) = update.variant {
            spool.variant = variant;
        }
        if let Some(supplier) = update.supplier {
            spool.supplier = supplier;
        }
        if let Some(date) = update.date_opened {
            spool.date_opened = date;
        }
        if let Some(weight) = update.weight {
            spool.weight = weight;
        }
        if let Some(weight) = update.empty_spool_weight {
            spool.empty_spool_weight = weight;
        }
        if let Some(color) = update.hex_color {
            spool.hex_color = color;
        }
        if let Some(description) = update.description {
            spool.description = description;
        }

        let updated = spool.clone();
        self.storage.write_spools(&spools)?;
        info!("Updated spool {}", code);
        Ok(updated)
    }

    /// Remove a spool. Its print-log entries stay behind as orphans.
    pub fn delete_spool(&self, code: &str) -> Result<Spool> {
        let mut spools = self.storage.read_spools()?;
        let idx = spools
            .iter()
            .position(|s| s.code == code)
            .ok_or_else(|| SpoolrError::SpoolNotFound(code.to_string()))?;
        let removed = spools.remove(idx);
        self.storage.write_spools(&spools)?;
        info!("Deleted spool {}", code);
        Ok(removed)
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SpoolrError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_weight(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SpoolrError::InvalidAmount(format!(
            "{} must be a number >= 0, got {}",
            field, value
        )));
    }
    Ok(())
}

fn require_color(value: &str) -> Result<()> {
    if !is_valid_hex_color(value) {
        return Err(SpoolrError::InvalidInput(format!(
            "color must look like #RRGGBB, got {:?}",
            value
        )));
    }
    Ok(())
}
