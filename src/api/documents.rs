//! Task list and history document endpoints.
//!
//! - `GET /tasks` - Read the active task list (`[]` when never written)
//! - `POST /tasks` - Replace the active task list
//! - `GET /history` - Read the completed-task history
//! - `POST /history` - Replace the completed-task history
//!
//! Writes replace the whole document. Nothing is merged with what was stored
//! before, so concurrent writers race and the last one wins.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::document_store::{decode_list, write_list, DocumentKey, StoreError};
use super::routes::AppState;
use super::types::WRITE_ACK;
use crate::task::{board, CompletedTask, Task};
use crate::util::truncate_for_log;

const RAW_LOG_LIMIT: usize = 2048;

/// Create document routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(get_tasks).post(post_tasks))
        .route("/history", get(get_history).post(post_history))
}

fn store_error(err: StoreError) -> (StatusCode, String) {
    tracing::error!("Document store error: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

async fn read_document<T: DeserializeOwned>(
    state: &AppState,
    key: DocumentKey,
) -> Result<Vec<T>, (StatusCode, String)> {
    let raw = state.store.get(key).await.map_err(store_error)?;
    if state.config.log_documents {
        tracing::debug!(
            "Raw {}: {}",
            key,
            raw.as_deref()
                .map(|r| truncate_for_log(r, RAW_LOG_LIMIT))
                .unwrap_or_else(|| "(absent)".to_string())
        );
    }
    decode_list(key, raw.as_deref()).map_err(store_error)
}

async fn write_document<T: Serialize>(
    state: &AppState,
    key: DocumentKey,
    items: &[T],
) -> Result<(StatusCode, &'static str), (StatusCode, String)> {
    write_list(state.store.as_ref(), key, items)
        .await
        .map_err(store_error)?;
    tracing::info!("Replaced {} with {} item(s)", key, items.len());
    Ok((StatusCode::OK, WRITE_ACK))
}

/// GET /tasks - Read the active task list.
async fn get_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    read_document(&state, DocumentKey::TaskList).await.map(Json)
}

/// POST /tasks - Replace the active task list.
async fn post_tasks(
    State(state): State<Arc<AppState>>,
    Json(tasks): Json<Vec<Task>>,
) -> Result<(StatusCode, &'static str), (StatusCode, String)> {
    if !board::is_well_formed(&tasks) {
        // Stored as sent; clients own the ordering.
        tracing::warn!(
            "Task list with {} item(s) has non-contiguous orders or several top-priority flags",
            tasks.len()
        );
    }
    write_document(&state, DocumentKey::TaskList, &tasks).await
}

/// GET /history - Read the completed-task history.
async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CompletedTask>>, (StatusCode, String)> {
    read_document(&state, DocumentKey::TaskHistory)
        .await
        .map(Json)
}

/// POST /history - Replace the completed-task history.
async fn post_history(
    State(state): State<Arc<AppState>>,
    Json(history): Json<Vec<CompletedTask>>,
) -> Result<(StatusCode, &'static str), (StatusCode, String)> {
    write_document(&state, DocumentKey::TaskHistory, &history).await
}
