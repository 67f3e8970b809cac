//! In-memory record store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{NewAnalyzedLetter, RecordStore, StoreError};

/// Keeps inserted letters in memory; nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    letters: Arc<Mutex<Vec<(String, NewAnalyzedLetter)>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything inserted so far, oldest first.
    pub async fn letters(&self) -> Vec<(String, NewAnalyzedLetter)> {
        self.letters.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, letter: &NewAnalyzedLetter) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.letters.lock().await.push((id.clone(), letter.clone()));
        Ok(id)
    }
}
