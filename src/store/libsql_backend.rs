//! libSQL backend: durable `DraftStore` implementation.
//!
//! Supports local file and in-memory databases. Keys are scoped by an
//! applicant id so several applicants can share one database file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StorageError;
use crate::store::migrations;
use crate::store::traits::DraftStore;

/// libSQL draft store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    applicant_id: String,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path, applicant_id: &str) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db, applicant_id).await?;
        info!(path = %path.display(), applicant = applicant_id, "Draft store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory(applicant_id: &str) -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StorageError::Open(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db, applicant_id).await
    }

    async fn from_database(db: LibSqlDatabase, applicant_id: &str) -> Result<Self, StorageError> {
        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
            applicant_id: applicant_id.to_string(),
        })
    }

    pub fn applicant_id(&self) -> &str {
        &self.applicant_id
    }

    /// When the value under `key` was last written, if it exists.
    pub async fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let mut rows = self
            .conn
            .query(
                "SELECT updated_at FROM drafts WHERE applicant_id = ?1 AND key = ?2",
                params![self.applicant_id.as_str(), key],
            )
            .await
            .map_err(|e| StorageError::Query(format!("updated_at: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("updated_at: {e}")))?;
                Ok(Some(parse_datetime(&raw)))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("updated_at: {e}"))),
        }
    }
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    // Try RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // SQLite datetime() output
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

#[async_trait]
impl DraftStore for LibSqlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM drafts WHERE applicant_id = ?1 AND key = ?2",
                params![self.applicant_id.as_str(), key],
            )
            .await
            .map_err(|e| StorageError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("get: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO drafts (applicant_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (applicant_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
                params![self.applicant_id.as_str(), key, value, now],
            )
            .await
            .map_err(|e| StorageError::Query(format!("set: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let count = self
            .conn
            .execute(
                "DELETE FROM drafts WHERE applicant_id = ?1 AND key = ?2",
                params![self.applicant_id.as_str(), key],
            )
            .await
            .map_err(|e| StorageError::Query(format!("remove: {e}")))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(applicant: &str) -> LibSqlStore {
        LibSqlStore::new_memory(applicant).await.unwrap()
    }

    #[tokio::test]
    async fn draft_crud() {
        let store = test_store("applicant1").await;
        let value = r#"{"currentStep":2}"#;

        // Set
        store.set("applicationFormDraft", value).await.unwrap();

        // Get
        let fetched = store.get("applicationFormDraft").await.unwrap().unwrap();
        assert_eq!(fetched, value);

        // Update (upsert)
        store.set("applicationFormDraft", "{}").await.unwrap();
        let fetched = store.get("applicationFormDraft").await.unwrap().unwrap();
        assert_eq!(fetched, "{}");

        // Delete
        assert!(store.remove("applicationFormDraft").await.unwrap());
        assert!(store.get("applicationFormDraft").await.unwrap().is_none());

        // Delete non-existent
        assert!(!store.remove("applicationFormDraft").await.unwrap());
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let store = test_store("nobody").await;
        assert!(store.get("nothing").await.unwrap().is_none());
        assert!(store.updated_at("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updated_at_is_recorded() {
        let store = test_store("applicant1").await;
        let before = Utc::now() - chrono::Duration::seconds(1);
        store.set("k", "v").await.unwrap();
        let stamp = store.updated_at("k").await.unwrap().unwrap();
        assert!(stamp >= before);
    }

    #[tokio::test]
    async fn reopening_a_file_keeps_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drafts.db");

        {
            let store = LibSqlStore::new_local(&path, "a").await.unwrap();
            store.set("draft", "saved").await.unwrap();
        }

        let store = LibSqlStore::new_local(&path, "a").await.unwrap();
        assert_eq!(store.get("draft").await.unwrap().as_deref(), Some("saved"));

        let other = LibSqlStore::new_local(&path, "b").await.unwrap();
        assert!(other.get("draft").await.unwrap().is_none());
    }

    #[test]
    fn parse_datetime_formats() {
        let rfc = parse_datetime("2026-01-02T03:04:05+00:00");
        assert_eq!(rfc.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        let sqlite = parse_datetime("2026-01-02 03:04:05");
        assert_eq!(sqlite, rfc);
        assert_eq!(parse_datetime("garbage"), DateTime::<Utc>::MIN_UTC);
    }
}
