//! Document storage with pluggable backends.
//!
//! The service keeps exactly two JSON documents, `taskList` and
//! `taskHistory`. Each is read and replaced as a whole; there are no partial
//! updates and no transactions spanning both.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: One JSON file per document
//! - `sqlite`: SQLite key-value table

mod file;
mod memory;
mod sqlite;

pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Names of the stored documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    TaskList,
    TaskHistory,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 2] = [DocumentKey::TaskList, DocumentKey::TaskHistory];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::TaskList => "taskList",
            DocumentKey::TaskHistory => "taskHistory",
        }
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by document store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Stored document {key} is not valid JSON: {source}")]
    Malformed {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize document {key}: {source}")]
    Serialize {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Get current timestamp as RFC3339 string.
pub fn now_string() -> String {
    Utc::now().to_rfc3339()
}

/// Document store trait - implemented by all storage backends.
///
/// Writes are unconditional overwrites: the last `put` wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Backend identifier used in logs and the health endpoint.
    fn kind(&self) -> DocumentStoreType;

    /// Read the raw document, `None` if it was never written.
    async fn get(&self, key: DocumentKey) -> Result<Option<String>, StoreError>;

    /// Replace the raw document.
    async fn put(&self, key: DocumentKey, value: String) -> Result<(), StoreError>;
}

/// Parse a stored document as a JSON array; a missing document is empty.
pub fn decode_list<T: DeserializeOwned>(
    key: DocumentKey,
    raw: Option<&str>,
) -> Result<Vec<T>, StoreError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => {
            serde_json::from_str(raw).map_err(|source| StoreError::Malformed { key, source })
        }
    }
}

/// Read and decode a list document.
pub async fn read_list<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: DocumentKey,
) -> Result<Vec<T>, StoreError> {
    let raw = store.get(key).await?;
    decode_list(key, raw.as_deref())
}

/// Encode and replace a list document.
pub async fn write_list<T: Serialize>(
    store: &dyn DocumentStore,
    key: DocumentKey,
    items: &[T],
) -> Result<(), StoreError> {
    let raw =
        serde_json::to_string(items).map_err(|source| StoreError::Serialize { key, source })?;
    store.put(key, raw).await
}

/// Document store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStoreType {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl DocumentStoreType {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" | "json" => Some(Self::File),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for DocumentStoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared handle to the configured store.
pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// Create a document store based on type and configuration.
pub async fn create_document_store(
    store_type: DocumentStoreType,
    base_dir: PathBuf,
) -> Result<SharedDocumentStore, StoreError> {
    match store_type {
        DocumentStoreType::Memory => Ok(Arc::new(InMemoryDocumentStore::new())),
        DocumentStoreType::File => {
            let store = FileDocumentStore::new(base_dir).await?;
            Ok(Arc::new(store))
        }
        DocumentStoreType::Sqlite => {
            let store = SqliteDocumentStore::new(base_dir).await?;
            Ok(Arc::new(store))
        }
    }
}
