//! Configuration management for the task service.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `TASK_STORE` - Optional. `memory`, `file` or `sqlite`. Defaults to `sqlite`.
//! - `TASK_STORE_DIR` - Optional. Directory for the file and SQLite stores.
//!   Defaults to `./.task-prioritizer`.
//! - `SEED_ON_STARTUP` - Optional. Seed demo tasks into an empty store. Defaults to `false`.

use std::path::PathBuf;
use thiserror::Error;

use crate::task_store::TaskStoreType;
use crate::util::env_var_bool;

#[derive(Debug, Error)]
pub enum ConfigError {
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

    /// Storage backend
    pub store_type: TaskStoreType,

    /// Directory holding persistent store files
    pub store_dir: PathBuf,

    /// Seed demo tasks when the store is empty
    pub seed_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store_type: TaskStoreType::default(),
            store_dir: PathBuf::from(".task-prioritizer"),
            seed_on_startup: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?,
            Err(_) => defaults.port,
        };

        let store_type = std::env::var("TASK_STORE")
            .map(|s| TaskStoreType::from_str(&s))
            .unwrap_or(defaults.store_type);

        let store_dir = std::env::var("TASK_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        Ok(Self {
            host,
            port,
            store_type,
            store_dir,
            seed_on_startup: env_var_bool("SEED_ON_STARTUP", false),
        })
    }
}
