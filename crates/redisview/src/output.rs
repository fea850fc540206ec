//! Rendering results as text or JSON

use anyhow::{Context, Result};
use redis::Value;
use redisview_core::{KeyDetails, KeyValue, ServerInfoSummary, format_value};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;

/// Pretty-print any serializable value as JSON
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize output")
}

/// Convert a raw reply to JSON
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Int(i) => json!(i),
        Value::Double(d) => json!(d),
        Value::Boolean(b) => json!(b),
        Value::Okay => json!("OK"),
        Value::SimpleString(s) => json!(s),
        Value::BulkString(bytes) => json!(String::from_utf8_lossy(bytes)),
        Value::Array(items) | Value::Set(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (format_value(k), value_to_json(v)))
                .collect(),
        ),
        other => json!(format_value(other)),
    }
}

pub fn render_reply(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_value(value)),
        OutputFormat::Json => to_json(&value_to_json(value)),
    }
}

pub fn render_keys(keys: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(keys.join("\n")),
        OutputFormat::Json => to_json(keys),
    }
}

pub fn render_info(summary: &ServerInfoSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(summary.to_string()),
        OutputFormat::Json => to_json(summary),
    }
}

pub fn render_details(details: &KeyDetails, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(details);
    }

    let mut out = format!(
        "key:  {}\ntype: {}\nttl:  {}\n",
        details.key, details.kind, details.ttl
    );
    match &details.value {
        KeyValue::Text(text) => out.push_str(text),
        KeyValue::Items(items) => {
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("{}) {}\n", i + 1, item));
            }
        }
        KeyValue::Scored(members) => {
            for (member, score) in members {
                out.push_str(&format!("{} {}\n", score, member));
            }
        }
        KeyValue::Fields(fields) => {
            for (field, value) in fields {
                out.push_str(&format!("{}: {}\n", field, value));
            }
        }
        KeyValue::Unsupported => out.push_str("(no preview for this type)"),
    }
    Ok(out.trim_end().to_string())
}
