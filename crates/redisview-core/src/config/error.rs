//! Error types for configuration resolution

use thiserror::Error;

/// Errors that can occur while resolving connection configuration
///
/// All of these are fatal at startup: a configuration that fails to resolve
/// is never partially applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid database number: {0}")]
    InvalidDatabase(String),

    #[error("malformed connection URL: {source}")]
    MalformedUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to load config from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Failed to determine config directory")]
    ConfigDirError,
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
