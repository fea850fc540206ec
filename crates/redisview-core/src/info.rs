//! INFO parsing and the server summary line

use std::collections::HashMap;
use std::fmt;

use redis::Value;
use serde::Serialize;

use crate::client::Client;
use crate::config::ConnectionConfig;
use crate::error::{CoreError, Result};

/// Shown when the selected db has no keyspace entry
pub const PLACEHOLDER: &str = "-";

/// Parse INFO text into `field -> value`.
///
/// Section headers (`# Server`) and blank lines are skipped, as is any line
/// that does not split on its first colon into a non-empty key and value.
pub fn parse_info(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Header summary of the connected server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfoSummary {
    pub version: String,
    pub used_memory: String,
    pub endpoint: String,
    pub keyspace: String,
}

impl ServerInfoSummary {
    /// Build from parsed INFO fields for the db selected in `config`
    pub fn from_fields(fields: &HashMap<String, String>, config: &ConnectionConfig) -> Self {
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        Self {
            version: field("redis_version"),
            used_memory: field("used_memory_human"),
            endpoint: config.endpoint(),
            keyspace: fields
                .get(&format!("db{}", config.db))
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }

    pub fn from_text(text: &str, config: &ConnectionConfig) -> Self {
        Self::from_fields(&parse_info(text), config)
    }
}

impl fmt::Display for ServerInfoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " RedisVersion: {}    Memory: {}    Server: {}\n KeySpace: {}",
            self.version, self.used_memory, self.endpoint, self.keyspace
        )
    }
}

/// Run INFO and summarize it
pub async fn server_info(client: &Client, config: &ConnectionConfig) -> Result<ServerInfoSummary> {
    let value = client
        .query(&redis::cmd("INFO"))
        .await
        .map_err(CoreError::Info)?;
    let text = info_text(&value).map_err(CoreError::Info)?;
    Ok(ServerInfoSummary::from_text(&text, config))
}

/// Extract INFO text. A cluster may answer with one reply per node; the
/// first node's text is used.
fn info_text(value: &Value) -> redis::RedisResult<String> {
    match value {
        Value::Map(entries) => match entries.first() {
            Some((_, reply)) => redis::from_redis_value(reply),
            None => Ok(String::new()),
        },
        other => redis::from_redis_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientKind;
    use crate::testing::{ScriptedBackend, bulk};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const INFO: &str = "# Server\r\n\
redis_version:7.2.4\r\n\
redis_mode:standalone\r\n\
\r\n\
# Memory\r\n\
used_memory:1048576\r\n\
used_memory_human:1.00M\r\n\
\r\n\
# Keyspace\r\n\
db0:keys=12,expires=1,avg_ttl=0\r\n\
db3:keys=4,expires=0,avg_ttl=0\r\n";

    fn config(db: u32) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_skips_headers_and_blank_lines() {
        let fields = parse_info(INFO);
        assert_eq!(fields.len(), 6);
        assert_eq!(fields["redis_version"], "7.2.4");
        assert_eq!(fields["db0"], "keys=12,expires=1,avg_ttl=0");
    }

    #[test]
    fn test_value_may_contain_colons() {
        let fields = parse_info("executable:/usr/bin/redis-server\nconfig_file:C:\\redis.conf\n");
        assert_eq!(fields["config_file"], "C:\\redis.conf");
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let text = "redis_version:7.0.0\ngarbage line\n:novalue\nnokey:\nused_memory_human:2.5M\n";
        let fields = parse_info(text);
        assert_eq!(fields.len(), 2);

        let summary = ServerInfoSummary::from_text(text, &config(0));
        assert_eq!(summary.version, "7.0.0");
        assert_eq!(summary.used_memory, "2.5M");
        assert_eq!(summary.endpoint, "127.0.0.1:6379/0");
    }

    #[test]
    fn test_keyspace_for_selected_db() {
        let summary = ServerInfoSummary::from_text(INFO, &config(3));
        assert_eq!(summary.keyspace, "keys=4,expires=0,avg_ttl=0");
    }

    #[test]
    fn test_keyspace_placeholder() {
        let summary = ServerInfoSummary::from_text(INFO, &config(9));
        assert_eq!(summary.keyspace, "-");
    }

    #[test]
    fn test_missing_server_fields_stay_empty() {
        let summary = ServerInfoSummary::from_text("# Keyspace\ndb0:keys=1\n", &config(0));
        assert_eq!(summary.version, "");
        assert_eq!(summary.used_memory, "");
        assert_eq!(summary.keyspace, "keys=1");
    }

    #[test]
    fn test_display() {
        let summary = ServerInfoSummary::from_text(INFO, &config(0));
        assert_eq!(
            summary.to_string(),
            " RedisVersion: 7.2.4    Memory: 1.00M    Server: 127.0.0.1:6379/0\n KeySpace: keys=12,expires=1,avg_ttl=0"
        );
    }

    #[tokio::test]
    async fn test_server_info_queries_info() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok("INFO", bulk(INFO));
        let client = Client::new(ClientKind::Standalone, backend.clone());

        let summary = server_info(&client, &config(0)).await.unwrap();
        assert_eq!(summary.version, "7.2.4");
        assert_eq!(backend.calls(), vec![vec!["INFO".to_string()]]);
    }

    #[tokio::test]
    async fn test_cluster_map_reply_uses_first_node() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok(
            "INFO",
            Value::Map(vec![(bulk("10.0.0.1:7000"), bulk("redis_version:7.0.11\n"))]),
        );
        let client = Client::new(ClientKind::Cluster, backend);

        let summary = server_info(&client, &config(0)).await.unwrap();
        assert_eq!(summary.version, "7.0.11");
    }
}
