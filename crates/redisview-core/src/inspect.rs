//! Single-key lookup: type, TTL and a bounded preview of the value

use std::fmt;

use redis::FromRedisValue;
use serde::Serialize;

use crate::client::Client;
use crate::error::{CoreError, Result};

/// Most elements fetched for list and sorted-set previews
pub const PREVIEW_LIMIT: isize = 1000;

/// Data type reported by TYPE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    String,
    List,
    Set,
    Zset,
    Hash,
    Stream,
    Other(String),
}

impl KeyKind {
    fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "none" => return None,
            "string" => KeyKind::String,
            "list" => KeyKind::List,
            "set" => KeyKind::Set,
            "zset" => KeyKind::Zset,
            "hash" => KeyKind::Hash,
            "stream" => KeyKind::Stream,
            other => KeyKind::Other(other.to_string()),
        };
        Some(kind)
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::String => "string",
            KeyKind::List => "list",
            KeyKind::Set => "set",
            KeyKind::Zset => "zset",
            KeyKind::Hash => "hash",
            KeyKind::Stream => "stream",
            KeyKind::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Remaining time to live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "seconds")]
pub enum Ttl {
    Persistent,
    Seconds(i64),
}

impl Ttl {
    fn from_reply(seconds: i64) -> Self {
        if seconds < 0 {
            Ttl::Persistent
        } else {
            Ttl::Seconds(seconds)
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Persistent => write!(f, "persistent"),
            Ttl::Seconds(s) => write!(f, "{}s", s),
        }
    }
}

/// Preview of a key's content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Text(String),
    Items(Vec<String>),
    Scored(Vec<(String, f64)>),
    Fields(Vec<(String, String)>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyDetails {
    pub key: String,
    pub kind: KeyKind,
    pub ttl: Ttl,
    pub value: KeyValue,
}

async fn lookup<T: FromRedisValue>(
    client: &Client,
    command: &'static str,
    cmd: &redis::Cmd,
) -> Result<T> {
    client
        .query_as(cmd)
        .await
        .map_err(|source| CoreError::Lookup { command, source })
}

fn key_cmd(name: &str, key: &str) -> redis::Cmd {
    let mut cmd = redis::cmd(name);
    cmd.arg(key);
    cmd
}

fn range_cmd(name: &str, key: &str) -> redis::Cmd {
    let mut cmd = key_cmd(name, key);
    cmd.arg(0).arg(PREVIEW_LIMIT - 1);
    cmd
}

/// Look up `key`.
///
/// A key that does not exist is [`CoreError::KeyNotFound`]. Types without a
/// preview (streams, module types) report [`KeyValue::Unsupported`].
pub async fn inspect(client: &Client, key: &str) -> Result<KeyDetails> {
    let kind: String = lookup(client, "TYPE", &key_cmd("TYPE", key)).await?;
    let kind = KeyKind::parse(&kind).ok_or_else(|| CoreError::KeyNotFound(key.to_string()))?;
    let ttl: i64 = lookup(client, "TTL", &key_cmd("TTL", key)).await?;

    let value = match kind {
        KeyKind::String => {
            let text: Option<String> = lookup(client, "GET", &key_cmd("GET", key)).await?;
            // expired between TYPE and GET
            let text = text.ok_or_else(|| CoreError::KeyNotFound(key.to_string()))?;
            KeyValue::Text(text)
        }
        KeyKind::List => {
            KeyValue::Items(lookup(client, "LRANGE", &range_cmd("LRANGE", key)).await?)
        }
        KeyKind::Set => {
            let mut members: Vec<String> =
                lookup(client, "SMEMBERS", &key_cmd("SMEMBERS", key)).await?;
            members.sort();
            KeyValue::Items(members)
        }
        KeyKind::Zset => {
            let mut cmd = range_cmd("ZRANGE", key);
            cmd.arg("WITHSCORES");
            KeyValue::Scored(lookup(client, "ZRANGE", &cmd).await?)
        }
        KeyKind::Hash => {
            let mut fields: Vec<(String, String)> =
                lookup(client, "HGETALL", &key_cmd("HGETALL", key)).await?;
            fields.sort();
            KeyValue::Fields(fields)
        }
        KeyKind::Stream | KeyKind::Other(_) => KeyValue::Unsupported,
    };

    Ok(KeyDetails {
        key: key.to_string(),
        kind,
        ttl: Ttl::from_reply(ttl),
        value,
    })
}
