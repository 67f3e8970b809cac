//! SQLite record store.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::{NewAnalyzedLetter, RecordStore, StoreError};

/// SQLite-backed store for analyzed letters.
///
/// rusqlite is synchronous, so every statement runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("SQLite journal mode: {}", mode);
        conn.busy_timeout(Duration::from_secs(5))?;
        info!("Opened letter database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS analyzed_letters (
                id TEXT PRIMARY KEY,
                business_id TEXT,
                user_id TEXT,
                file_name TEXT NOT NULL,
                file_type TEXT NOT NULL,
                content_sha256 TEXT NOT NULL,
                document_type TEXT NOT NULL,
                urgency_level TEXT NOT NULL,
                analysis_method TEXT NOT NULL,
                record TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyzed_letters_business
                ON analyzed_letters(business_id, created_at);
            "#,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored letters.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, StoreError> {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM analyzed_letters", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, letter: &NewAnalyzedLetter) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let record_json = serde_json::to_string(&letter.record)?;
        let letter = letter.clone();
        let conn = self.conn.clone();
        let row_id = id.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            conn.execute(
                r#"INSERT INTO analyzed_letters
                   (id, business_id, user_id, file_name, file_type, content_sha256,
                    document_type, urgency_level, analysis_method, record, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
                params![
                    row_id,
                    letter.business_id,
                    letter.user_id,
                    letter.file_name,
                    letter.file_type,
                    letter.content_sha256,
                    letter.record.analysis.document_type,
                    letter.record.analysis.urgency_level.as_str(),
                    letter.record.diagnostics.analysis_method.as_str(),
                    record_json,
                    letter.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;

        debug!("Stored analyzed letter {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::analysis::{compose_analysis, ComposeOptions};
    use crate::models::{AnalysisDepth, AnalysisMethod, AnalysisRecord, Diagnostics};

    fn letter() -> NewAnalyzedLetter {
        let analysis = compose_analysis(
            "Attorney: Jane Doe demands $20,000 in settlement.",
            &ComposeOptions {
                today: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                depth: AnalysisDepth::Standard,
            },
        );
        let record = AnalysisRecord::new(
            analysis,
            Diagnostics {
                analysis_method: AnalysisMethod::RegexText,
                model_used: "regex".to_string(),
                has_ai_configured: false,
                file_type: "text/plain".to_string(),
                timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            },
        );
        NewAnalyzedLetter::new(record, b"letter bytes", "letter.txt", Some("biz-1".into()), None)
    }

    #[tokio::test]
    async fn test_insert_round_trips_columns() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let id = store.insert(&letter()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let conn = store.conn.lock().unwrap();
        let (business, method, urgency, record): (Option<String>, String, String, String) = conn
            .query_row(
                "SELECT business_id, analysis_method, urgency_level, record FROM analyzed_letters WHERE id = ?1",
                [&id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();

        assert_eq!(business.as_deref(), Some("biz-1"));
        assert_eq!(method, "regex-text");
        assert_eq!(urgency, "high");
        let parsed: AnalysisRecord = serde_json::from_str(&record).unwrap();
        assert_eq!(parsed, letter().record);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("letters.db");
        let store = SqliteRecordStore::open(&path).unwrap();
        store.insert(&letter()).await.unwrap();
        store.insert(&letter()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(path.exists());
    }
}
