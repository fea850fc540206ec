//! Connection configuration
//!
//! Resolves a single [`ConnectionConfig`] from defaults, an optional config
//! file profile, the `REDIS_URL` environment variable, command-line flags,
//! and an explicit override URL.

pub mod connection;
pub mod connection_url;
pub mod error;
pub mod file;

pub use connection::{
    ConfigSources, ConnectionConfig, ConnectionOverrides, DEFAULT_HOST, DEFAULT_PORT,
    REDIS_URL_ENV, TlsSettings,
};
pub use connection_url::{PLAIN_SCHEME, SECURE_SCHEME, apply_connection_url};
pub use error::{ConfigError, Result};
pub use file::ProfileFile;
