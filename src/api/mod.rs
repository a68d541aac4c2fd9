//! HTTP API for the task-priority service.
//!
//! ## Endpoints
//!
//! - `GET /tasks` - Active task list (`[]` if never written)
//! - `POST /tasks` - Replace the active task list
//! - `GET /history` - Completed-task history
//! - `POST /history` - Replace the completed-task history
//! - `GET /health` - Health check

pub mod document_store;
mod documents;
mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
