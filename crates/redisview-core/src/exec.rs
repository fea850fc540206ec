//! Raw command passthrough
//!
//! A command line is split into arguments and sent as-is. No whitelist,
//! no retries; the reply or error comes back exactly as the client produced
//! it.

use redis::{RedisResult, Value};
use tracing::debug;

use crate::client::Client;

/// How a command line is split into arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandSyntax {
    /// Split on every single space. Arguments containing spaces cannot be
    /// expressed, and consecutive spaces produce empty arguments.
    #[default]
    Verbatim,
    /// Split on whitespace runs, honoring `'...'`, `"..."` and backslash
    /// escapes inside double quotes
    Quoted,
}

/// Split a command line into arguments
pub fn split_command(line: &str, syntax: CommandSyntax) -> Vec<String> {
    match syntax {
        CommandSyntax::Verbatim => line.split(' ').map(str::to_string).collect(),
        CommandSyntax::Quoted => split_quoted(line),
    }
}

fn split_quoted(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_arg = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some('n') => current.push('\n'),
                            Some('t') => current.push('\t'),
                            Some(other) => current.push(other),
                            None => current.push('\\'),
                        },
                        other => current.push(other),
                    }
                }
            }
            '\'' => {
                in_arg = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    current.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            other => {
                in_arg = true;
                current.push(other);
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

/// Build the passthrough command for `args`
pub fn build_command(args: &[String]) -> redis::Cmd {
    let mut parts = args.iter();
    let mut cmd = redis::cmd(parts.next().map(String::as_str).unwrap_or_default());
    for arg in parts {
        cmd.arg(arg);
    }
    cmd
}

/// Split `line` and send it, returning the raw reply or error
pub async fn execute(client: &Client, line: &str, syntax: CommandSyntax) -> RedisResult<Value> {
    let args = split_command(line, syntax);
    debug!("Executing {} argument(s)", args.len());
    client.query(&build_command(&args)).await
}

/// Render a reply the way an interactive prompt prints it
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Nil => "(nil)".to_string(),
        Value::Int(i) => i.to_string(),
        Value::BulkString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::SimpleString(s) => s.clone(),
        Value::Okay => "OK".to_string(),
        Value::Double(d) => d.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) | Value::Set(items) => format!(
            "[{}]",
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Map(entries) => format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(k, v)| format!("{}: {}", format_value(k), format_value(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientKind;
    use crate::testing::{ScriptedBackend, bulk};
    use pretty_assertions::assert_eq;
    use redis::ErrorKind;
    use std::sync::Arc;

    #[test]
    fn test_verbatim_split() {
        assert_eq!(
            split_command("SET foo bar", CommandSyntax::Verbatim),
            vec!["SET", "foo", "bar"]
        );
    }

    #[test]
    fn test_verbatim_keeps_empty_arguments() {
        assert_eq!(
            split_command("SET  foo \"a b\"", CommandSyntax::Verbatim),
            vec!["SET", "", "foo", "\"a", "b\""]
        );
    }

    #[test]
    fn test_quoted_split() {
        assert_eq!(
            split_command(
                r#"  SET greeting "hello world"  'it is' a\b  "#,
                CommandSyntax::Quoted
            ),
            vec!["SET", "greeting", "hello world", "it is", "a\\b"]
        );
    }

    #[test]
    fn test_quoted_escapes_and_empty_strings() {
        assert_eq!(
            split_command(r#"SET k "say \"hi\"\n" """#, CommandSyntax::Quoted),
            vec!["SET", "k", "say \"hi\"\n", ""]
        );
    }

    #[test]
    fn test_quoted_blank_line() {
        assert!(split_command("   ", CommandSyntax::Quoted).is_empty());
    }

    #[tokio::test]
    async fn test_execute_dispatches_arguments() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok("SET", Value::Okay);
        let client = Client::new(ClientKind::Standalone, backend.clone());

        let reply = execute(&client, "SET foo bar", CommandSyntax::default())
            .await
            .unwrap();

        assert_eq!(reply, Value::Okay);
        assert_eq!(backend.calls(), vec![vec!["SET", "foo", "bar"]]);
    }

    #[tokio::test]
    async fn test_execute_returns_server_error_unchanged() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_err("LPUSH", ErrorKind::TypeError, "WRONGTYPE");
        let client = Client::new(ClientKind::Standalone, backend);

        let err = execute(&client, "LPUSH foo x", CommandSyntax::Verbatim)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Nil), "(nil)");
        assert_eq!(format_value(&Value::Okay), "OK");
        assert_eq!(format_value(&Value::Int(7)), "7");
        assert_eq!(
            format_value(&Value::Array(vec![bulk("a"), Value::Int(2)])),
            "[a, 2]"
        );
        assert_eq!(
            format_value(&Value::Map(vec![(bulk("f"), bulk("v"))])),
            "{f: v}"
        );
    }
}
