//! # task-priority
//!
//! Personal task prioritization: an ordered task list with a single
//! "top priority" task, and a log of completed tasks.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────┐   full-list POST    ┌──────────────────┐
//!   │    TaskBoard     │ ──────────────────► │     HTTP API     │
//!   │ (client state)   │ ◄────────────────── │  /tasks /history │
//!   └──────────────────┘        GET          └────────┬─────────┘
//!                                                     │
//!                                                     ▼
//!                                            ┌──────────────────┐
//!                                            │  DocumentStore   │
//!                                            │memory/file/sqlite│
//!                                            └──────────────────┘
//! ```
//!
//! ## Modules
//! - `task`: Task records and the ordering/priority rules
//! - `api`: HTTP endpoints and document store backends
//! - `client`: Local board state and the sync transports
//! - `config`: Environment-based configuration

pub mod api;
pub mod client;
pub mod config;
pub mod task;
pub mod util;

pub use client::TaskBoard;
pub use config::Config;
