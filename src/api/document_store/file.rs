//! JSON file-based document store.
//!
//! Each document lives in `{base_dir}/{key}.json`. Documents are loaded once
//! at startup and written through a temp file on every `put`.

use super::{DocumentKey, DocumentStore, DocumentStoreType, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct FileDocumentStore {
    base_dir: PathBuf,
    documents: Arc<RwLock<HashMap<DocumentKey, String>>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileDocumentStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StoreError::io(&base_dir, e))?;

        let mut documents = HashMap::new();
        for key in DocumentKey::ALL {
            let path = Self::document_path(&base_dir, key);
            match fs::read_to_string(&path).await {
                Ok(raw) => {
                    documents.insert(key, raw);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!("Failed to read document {}: {}", path.display(), err);
                }
            }
        }
        tracing::debug!(
            "Loaded {} document(s) from {}",
            documents.len(),
            base_dir.display()
        );

        Ok(Self {
            base_dir,
            documents: Arc::new(RwLock::new(documents)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    fn document_path(base_dir: &Path, key: DocumentKey) -> PathBuf {
        base_dir.join(format!("{}.json", key.as_str()))
    }

    /// Callers hold `persist_lock`.
    async fn persist(&self, key: DocumentKey, value: &str) -> Result<(), StoreError> {
        let path = Self::document_path(&self.base_dir, key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    fn is_persistent(&self) -> bool {
        true
    }

    fn kind(&self) -> DocumentStoreType {
        DocumentStoreType::File
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<String>, StoreError> {
        Ok(self.documents.read().await.get(&key).cloned())
    }

    async fn put(&self, key: DocumentKey, value: String) -> Result<(), StoreError> {
        // Disk and memory change together so they never hold different writes.
        let _guard = self.persist_lock.lock().await;
        self.persist(key, &value).await?;
        self.documents.write().await.insert(key, value);
        Ok(())
    }
}
