//! Connection string parsing
//!
//! Accepts `redis://[:password@]host[:port][/db][?cluster=true]`, with
//! `rediss://` selecting TLS. Only the fields present in the URL are applied;
//! everything else keeps the value from the configuration it is layered on.

use url::{Host, Url};

use super::connection::ConnectionConfig;
use super::error::{ConfigError, Result};

/// Scheme for plain TCP connections
pub const PLAIN_SCHEME: &str = "redis";

/// Scheme for TLS connections
pub const SECURE_SCHEME: &str = "rediss";

/// Apply a connection URL on top of `base`, returning the updated configuration.
///
/// `base` is never modified: on error the caller keeps its previous
/// configuration intact.
pub fn apply_connection_url(base: &ConnectionConfig, raw: &str) -> Result<ConnectionConfig> {
    let url = Url::parse(raw).map_err(|source| match source {
        url::ParseError::InvalidPort => ConfigError::InvalidPort(port_text(raw)),
        source => ConfigError::MalformedUrl { source },
    })?;

    let mut config = base.clone();

    config.tls.enabled = match url.scheme() {
        PLAIN_SCHEME => false,
        SECURE_SCHEME => true,
        other => return Err(ConfigError::InvalidScheme(other.to_string())),
    };

    match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => config.host = domain.to_string(),
        Some(Host::Ipv4(addr)) => config.host = addr.to_string(),
        Some(Host::Ipv6(addr)) => config.host = addr.to_string(),
        _ => {}
    }

    if let Some(port) = url.port() {
        config.port = port;
    }

    // Username is ignored; only the password half of the userinfo is used.
    if let Some(password) = url.password() {
        let decoded = urlencoding::decode(password)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| password.to_string());
        config.password = Some(decoded);
    }

    let path = url.path();
    if !path.is_empty() && path != "/" {
        let db = path.strip_prefix('/').unwrap_or(path);
        config.db = db
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidDatabase(db.to_string()))?;
    }

    let cluster = url
        .query_pairs()
        .find(|(key, _)| key == "cluster")
        .map(|(_, value)| value == "true")
        .unwrap_or(false);
    if cluster {
        config.cluster = true;
    }

    Ok(config)
}

/// Best-effort extraction of the port text for error messages.
fn port_text(raw: &str) -> String {
    let authority = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(raw)
        .split(['/', '?'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    host_port
        .rsplit_once(':')
        .map(|(_, port)| port.to_string())
        .unwrap_or_default()
}
