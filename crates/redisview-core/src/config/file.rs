//! Config file with named connection profiles
//!
//! The file is optional. When present it is TOML with an optional
//! `default_profile` and one `[profiles.<name>]` table per connection:
//!
//! ```toml
//! default_profile = "local"
//!
//! [profiles.local]
//! url = "redis://127.0.0.1:6379/0"
//!
//! [profiles.prod]
//! host = "cache.prod.internal"
//! password = "${PROD_REDIS_PASSWORD}"
//! tls = true
//! tls_ca_cert = "/etc/ssl/prod-ca.pem"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use super::connection::ConnectionOverrides;
use super::error::{ConfigError, Result};

/// Parsed config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFile {
    /// Profile used when none is selected explicitly
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Map of profile name -> connection settings
    #[serde(default)]
    pub profiles: HashMap<String, ConnectionOverrides>,
}

impl ProfileFile {
    /// Load from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load from a specific path; a missing file is an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            debug!("No config file at {}", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let file: ProfileFile = toml::from_str(&expanded_content)?;

        debug!(
            "Loaded {} profile(s) from {}",
            file.profiles.len(),
            config_path.display()
        );
        Ok(file)
    }

    /// Pick a profile: the explicit name, else `default_profile`, else none.
    ///
    /// An explicit or default name that doesn't exist is an error.
    pub fn select(&self, explicit: Option<&str>) -> Result<Option<&ConnectionOverrides>> {
        let Some(name) = explicit.or(self.default_profile.as_deref()) else {
            return Ok(None);
        };

        self.profiles
            .get(name)
            .map(Some)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Profile names, sorted
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Path to the config file: `~/.config/redisview/config.toml` on Linux,
    /// the platform config directory elsewhere.
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("com", "redisview", "redisview").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}`; unknown variables are left as-is.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
