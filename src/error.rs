//! Error types for Spoolr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Spoolr
#[derive(Debug, Error)]
pub enum SpoolrError {
    /// A stored row could not be converted into a record
    #[error("Parse error: {0}")]
    Parse(String),

    /// Non-positive, negative or non-numeric weight input
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Required text input was blank
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested usage exceeds the spool's remaining weight
    #[error("Insufficient stock on {code}: {available}g available, {requested}g requested")]
    InsufficientStock {
        code: String,
        available: f64,
        requested: f64,
    },

    /// Spool code not present in the inventory
    #[error("Spool not found: {0}")]
    SpoolNotFound(String),

    /// No usage entry matches the composite key
    #[error("Usage entry not found: {timestamp} / {filament_code}")]
    UsageEntryNotFound {
        timestamp: String,
        filament_code: String,
    },

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpoolrError {
    /// Returns true for failures of the backing file rather than of the request
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            SpoolrError::Storage(_) | SpoolrError::Io(_) | SpoolrError::Json(_)
        )
    }
}

/// Result type alias for Spoolr operations
pub type Result<T> = std::result::Result<T, SpoolrError>;
