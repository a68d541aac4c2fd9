//! Configuration management for the task-priority service and client.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8787`.
//! - `TASK_PRIORITY_STORE` - Optional. `memory`, `file` (`json`) or `sqlite` (`db`). Defaults to `sqlite`.
//! - `TASK_PRIORITY_DATA_DIR` - Optional. Directory for the file and sqlite stores. Defaults to `./.task-priority`.
//! - `TASK_PRIORITY_LOG_DOCUMENTS` - Optional. Log raw stored documents when read. Defaults to `true`.
//! - `TASK_PRIORITY_API_URL` - Optional. Base URL used by the client. Defaults to `http://127.0.0.1:8787`.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::document_store::DocumentStoreType;
use crate::util::parse_bool;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8787";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Which document store backend to use
    pub store_type: DocumentStoreType,

    /// Directory for persistent stores
    pub data_dir: PathBuf,

    /// Log raw documents on read
    pub log_documents: bool,

    /// Base URL of the HTTP API (client side)
    pub api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set to something
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?,
            None => DEFAULT_PORT,
        };

        let store_type = match lookup("TASK_PRIORITY_STORE") {
            Some(raw) => DocumentStoreType::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TASK_PRIORITY_STORE".to_string(),
                    format!("unknown store '{}' (expected memory, file or sqlite)", raw),
                )
            })?,
            None => DocumentStoreType::default(),
        };

        let data_dir = lookup("TASK_PRIORITY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".task-priority"));

        let log_documents = match lookup("TASK_PRIORITY_LOG_DOCUMENTS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidValue("TASK_PRIORITY_LOG_DOCUMENTS".to_string(), raw.clone())
            })?,
            None => true,
        };

        let mut api_url =
            lookup("TASK_PRIORITY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        while api_url.ends_with('/') {
            api_url.pop();
        }
        if api_url.is_empty() {
            return Err(ConfigError::MissingEnvVar("TASK_PRIORITY_API_URL".to_string()));
        }

        Ok(Self {
            host,
            port,
            store_type,
            data_dir,
            log_documents,
            api_url,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(store_type: DocumentStoreType, data_dir: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            store_type,
            data_dir,
            log_documents: true,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
