//! SQLite-based document store.

use super::{now_string, DocumentKey, DocumentStore, DocumentStoreType, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const DB_FILENAME: &str = "task-priority.db";

pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StoreError::io(&base_dir, e))?;
        let db_path = base_dir.join(DB_FILENAME);

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            tracing::debug!("Opened document database {}", db_path.display());
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn is_persistent(&self) -> bool {
        true
    }

    fn kind(&self) -> DocumentStoreType {
        DocumentStoreType::Sqlite
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<String>, StoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM documents WHERE key = ?1",
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok::<_, StoreError>(value)
        })
        .await?
    }

    async fn put(&self, key: DocumentKey, value: String) -> Result<(), StoreError> {
        let conn = self.conn.clone();
        let now = now_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT OR REPLACE INTO documents (key, value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key.as_str(), value, now],
            )?;
            Ok::<_, StoreError>(())
        })
        .await?
    }
}
