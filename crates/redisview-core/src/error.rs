//! Unified error handling for redisview-core
//!
//! Command passthrough deliberately does not use this type: it hands back
//! the client's own [`redis::RedisError`] untouched.

use redis::RedisError;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The redis client could not be constructed
    #[error("Failed to create client: {0}")]
    Connection(#[source] RedisError),

    /// A SCAN page failed; keys from earlier pages are discarded
    #[error("SCAN failed: {0}")]
    Scan(#[source] RedisError),

    /// INFO failed or returned something other than text
    #[error("INFO failed: {0}")]
    Info(#[source] RedisError),

    /// A key lookup command failed
    #[error("{command} failed: {source}")]
    Lookup {
        command: &'static str,
        #[source]
        source: RedisError,
    },

    /// The key does not exist
    #[error("Key '{0}' not found")]
    KeyNotFound(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    fn redis_error(&self) -> Option<&RedisError> {
        match self {
            CoreError::Connection(e)
            | CoreError::Scan(e)
            | CoreError::Info(e)
            | CoreError::Lookup { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Returns true if the transport timed out
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.redis_error().is_some_and(RedisError::is_timeout)
    }

    /// Returns true if the server could not be reached or the connection broke
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        self.redis_error().is_some_and(|e| {
            e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error()
        })
    }

    /// Returns true if this is a configuration error
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, CoreError::Config(_))
    }
}
