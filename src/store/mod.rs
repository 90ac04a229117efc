//! Metadata store: one JSON blob per `(entity_id, record_type)`.
//!
//! Callers branch on [`StoreError::NotFound`] to tell a first run apart from a
//! broken database, so lookups never fold absence into a generic error.

pub mod repo;

pub use repo::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metadata not found for {entity_id}/{record_type}")]
    NotFound {
        entity_id: String,
        record_type: &'static str,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("metadata codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
