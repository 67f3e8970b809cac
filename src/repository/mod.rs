//! Persistence for analyzed letters.
//!
//! The pipeline performs exactly one insert per successful analysis and
//! never reads rows back, so a store only has to implement [`RecordStore::insert`].

mod memory;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::AnalysisRecord;

pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Errors from record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store task failed: {0}")]
    Task(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One analyzed letter, as written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalyzedLetter {
    pub business_id: Option<String>,
    pub user_id: Option<String>,
    pub file_name: String,
    pub file_type: String,
    /// Hex SHA-256 of the uploaded bytes.
    pub content_sha256: String,
    pub record: AnalysisRecord,
    pub created_at: DateTime<Utc>,
}

impl NewAnalyzedLetter {
    pub fn new(
        record: AnalysisRecord,
        file_bytes: &[u8],
        file_name: &str,
        business_id: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            business_id,
            user_id,
            file_name: file_name.to_string(),
            file_type: record.diagnostics.file_type.clone(),
            content_sha256: content_hash(file_bytes),
            created_at: record.diagnostics.timestamp,
            record,
        }
    }
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Destination for finished analyses.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Insert one letter and return its new id.
    async fn insert(&self, letter: &NewAnalyzedLetter) -> Result<String, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
