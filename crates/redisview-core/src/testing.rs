//! Scripted in-memory backend for tests
//!
//! Replies are queued per command name and handed out in order. Every
//! command that reaches the backend is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use redis::{Cmd, ErrorKind, RedisError, RedisResult, Value};

use crate::client::{Backend, command_args};

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<String, VecDeque<RedisResult<Value>>>>,
    calls: Mutex<Vec<Vec<String>>>,
    pinned: Mutex<Vec<bool>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: &str, reply: RedisResult<Value>) {
        self.replies
            .lock()
            .unwrap()
            .entry(command.to_ascii_uppercase())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful reply for `command`
    pub fn push_ok(&self, command: &str, value: Value) {
        self.push(command, Ok(value));
    }

    /// Queue an error reply for `command`
    pub fn push_err(&self, command: &str, kind: ErrorKind, message: &'static str) {
        self.push(command, Err(RedisError::from((kind, message))));
    }

    /// Queue one SCAN page
    pub fn push_scan_page(&self, next_cursor: u64, keys: &[&str]) {
        self.push_ok("SCAN", scan_reply(next_cursor, keys));
    }

    /// Every command received, as text arguments
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// For each command received, whether it went through the pinned path
    pub fn pinned(&self) -> Vec<bool> {
        self.pinned.lock().unwrap().clone()
    }

    /// Number of times `command` was received
    pub fn count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.first().is_some_and(|c| c.eq_ignore_ascii_case(command)))
            .count()
    }

    fn reply(&self, cmd: &Cmd, pinned: bool) -> RedisResult<Value> {
        let args = command_args(cmd);
        let name = args.first().cloned().unwrap_or_default().to_ascii_uppercase();
        self.calls.lock().unwrap().push(args);
        self.pinned.lock().unwrap().push(pinned);

        self.replies
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(RedisError::from((
                    ErrorKind::ClientError,
                    "no scripted reply",
                    name,
                )))
            })
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn query(&self, cmd: &Cmd) -> RedisResult<Value> {
        self.reply(cmd, false)
    }

    async fn query_pinned(&self, cmd: &Cmd) -> RedisResult<Value> {
        self.reply(cmd, true)
    }
}

/// Build a raw SCAN reply: `[cursor, [keys...]]`
pub fn scan_reply(next_cursor: u64, keys: &[&str]) -> Value {
    Value::Array(vec![
        Value::BulkString(next_cursor.to_string().into_bytes()),
        Value::Array(
            keys.iter()
                .map(|k| Value::BulkString(k.as_bytes().to_vec()))
                .collect(),
        ),
    ])
}

/// Build a bulk string reply
pub fn bulk(text: &str) -> Value {
    Value::BulkString(text.as_bytes().to_vec())
}
