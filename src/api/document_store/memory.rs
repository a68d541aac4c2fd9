//! In-memory document store (non-persistent).

use super::{DocumentKey, DocumentStore, DocumentStoreType, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentKey, String>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn is_persistent(&self) -> bool {
        false
    }

    fn kind(&self) -> DocumentStoreType {
        DocumentStoreType::Memory
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<String>, StoreError> {
        Ok(self.documents.read().await.get(&key).cloned())
    }

    async fn put(&self, key: DocumentKey, value: String) -> Result<(), StoreError> {
        self.documents.write().await.insert(key, value);
        Ok(())
    }
}
