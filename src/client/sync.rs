//! Transport between the client board and the document store.
//!
//! Every push sends the complete list; the receiving side replaces what it
//! had. There is no retry and no conflict detection.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::api::document_store::{
    read_list, write_list, DocumentKey, SharedDocumentStore, StoreError,
};
use crate::task::{CompletedTask, Task};

/// Errors raised while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whole-list transport used by [`super::TaskBoard`].
#[async_trait]
pub trait TaskSync: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError>;

    async fn push_tasks(&self, tasks: &[Task]) -> Result<(), SyncError>;

    async fn fetch_history(&self) -> Result<Vec<CompletedTask>, SyncError>;

    async fn push_history(&self, history: &[CompletedTask]) -> Result<(), SyncError>;
}

/// Talks to the HTTP API (`/tasks`, `/history`).
#[derive(Clone)]
pub struct HttpTaskSync {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTaskSync {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SyncError::Http {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SyncError::Status {
                url,
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| SyncError::Parse { url, source })
    }

    async fn post_list<T: Serialize + Sync>(
        &self,
        path: &str,
        items: &[T],
    ) -> Result<(), SyncError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(items)
            .send()
            .await
            .map_err(|source| SyncError::Http {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Status { url, status, body });
        }
        tracing::debug!("Pushed {} item(s) to {}", items.len(), url);
        Ok(())
    }
}

#[async_trait]
impl TaskSync for HttpTaskSync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
        self.get_list("/tasks").await
    }

    async fn push_tasks(&self, tasks: &[Task]) -> Result<(), SyncError> {
        self.post_list("/tasks", tasks).await
    }

    async fn fetch_history(&self) -> Result<Vec<CompletedTask>, SyncError> {
        self.get_list("/history").await
    }

    async fn push_history(&self, history: &[CompletedTask]) -> Result<(), SyncError> {
        self.post_list("/history", history).await
    }
}

/// Writes straight into a document store, bypassing HTTP.
#[derive(Clone)]
pub struct StoreTaskSync {
    store: SharedDocumentStore,
}

impl StoreTaskSync {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskSync for StoreTaskSync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
        Ok(read_list(self.store.as_ref(), DocumentKey::TaskList).await?)
    }

    async fn push_tasks(&self, tasks: &[Task]) -> Result<(), SyncError> {
        Ok(write_list(self.store.as_ref(), DocumentKey::TaskList, tasks).await?)
    }

    async fn fetch_history(&self) -> Result<Vec<CompletedTask>, SyncError> {
        Ok(read_list(self.store.as_ref(), DocumentKey::TaskHistory).await?)
    }

    async fn push_history(&self, history: &[CompletedTask]) -> Result<(), SyncError> {
        Ok(write_list(self.store.as_ref(), DocumentKey::TaskHistory, history).await?)
    }
}
