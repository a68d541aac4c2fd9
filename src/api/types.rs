//! API request and response types.

use serde::{Deserialize, Serialize};

/// Plain-text body returned by document writes.
pub const WRITE_ACK: &str = "okiedokie";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Document store backend in use
    pub store: String,

    /// Whether documents survive a restart
    pub persistent: bool,
}
