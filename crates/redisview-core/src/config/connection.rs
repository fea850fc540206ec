//! Connection configuration and layered resolution
//!
//! Configuration is resolved once at startup from, lowest to highest
//! precedence:
//!
//! 1. Built-in defaults
//! 2. The selected profile from the config file
//! 3. The `REDIS_URL` environment variable
//! 4. Individual command-line flags (only those the user supplied)
//! 5. An explicit `--url`, which wins over everything
//!
//! Each layer is applied to a copy; a layer that fails to parse rejects the
//! whole resolution.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use super::error::Result;
use super::connection_url::apply_connection_url;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 6379;

/// Environment variable holding the lowest-precedence connection URL
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Fully resolved connection configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u32,
    pub cluster: bool,
    pub debug: bool,
    pub tls: TlsSettings,
}

/// Transport security settings as configured (paths, not loaded material)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub enabled: bool,
    pub verify: bool,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub ca_cert: Option<PathBuf>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            verify: true,
            cert: None,
            key: None,
            ca_cert: None,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: None,
            db: 0,
            cluster: false,
            debug: false,
            tls: TlsSettings::default(),
        }
    }
}

impl ConnectionConfig {
    /// `host:port`, as used for the cluster seed and standalone address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:port/db`, as shown in the server summary
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("db", &self.db)
            .field("cluster", &self.cluster)
            .field("debug", &self.debug)
            .field("tls", &self.tls)
            .finish()
    }
}

/// A partial configuration: every field is optional and only the ones that
/// are set override the layer below.
///
/// Used for command-line flags and for profiles in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionOverrides {
    /// Connection URL applied before the individual fields of this layer
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub db: Option<u32>,
    pub cluster: Option<bool>,
    pub debug: Option<bool>,
    pub tls: Option<bool>,
    pub tls_verify: Option<bool>,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub tls_ca_cert: Option<PathBuf>,
}

impl ConnectionOverrides {
    /// Apply this layer on top of `base`
    pub fn apply(&self, base: &ConnectionConfig) -> Result<ConnectionConfig> {
        let mut config = match &self.url {
            Some(url) => apply_connection_url(base, url)?,
            None => base.clone(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(db) = self.db {
            config.db = db;
        }
        if let Some(cluster) = self.cluster {
            config.cluster = cluster;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(tls) = self.tls {
            config.tls.enabled = tls;
        }
        if let Some(verify) = self.tls_verify {
            config.tls.verify = verify;
        }
        if let Some(cert) = &self.tls_cert {
            config.tls.cert = Some(cert.clone());
        }
        if let Some(key) = &self.tls_key {
            config.tls.key = Some(key.clone());
        }
        if let Some(ca_cert) = &self.tls_ca_cert {
            config.tls.ca_cert = Some(ca_cert.clone());
        }

        Ok(config)
    }

    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// All configuration sources, collected before resolution
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Selected profile from the config file
    pub profile: Option<ConnectionOverrides>,
    /// Value of `REDIS_URL`
    pub env_url: Option<String>,
    /// Flags the user supplied on the command line
    pub flags: ConnectionOverrides,
    /// Explicit override URL
    pub url: Option<String>,
}

impl ConfigSources {
    /// Read the environment-sourced URL from `REDIS_URL`
    pub fn with_env(mut self) -> Self {
        self.env_url = std::env::var(REDIS_URL_ENV).ok();
        self
    }

    /// Resolve every layer in precedence order
    pub fn resolve(&self) -> Result<ConnectionConfig> {
        let mut config = ConnectionConfig::default();

        if let Some(profile) = &self.profile {
            debug!("Applying config file profile");
            config = profile.apply(&config)?;
        }

        if let Some(url) = self.env_url.as_deref().filter(|u| !u.is_empty()) {
            debug!("Applying {} environment variable", REDIS_URL_ENV);
            config = apply_connection_url(&config, url)?;
        }

        if !self.flags.is_empty() {
            debug!("Applying command-line flags");
            config = self.flags.apply(&config)?;
        }

        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            debug!("Applying explicit connection URL");
            config = apply_connection_url(&config, url)?;
        }

        debug!("Resolved connection config: {:?}", config);
        Ok(config)
    }
}
