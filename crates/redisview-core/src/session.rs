//! Session: everything one connected front end needs
//!
//! A session is built once from the resolved configuration and lives for the
//! whole process. It owns the client, the key cache and the diagnostic
//! sender; every operation a front end performs goes through it.

use std::sync::Arc;

use redis::{RedisResult, Value};
use tracing::instrument;

use crate::cache::KeyCache;
use crate::client::Client;
use crate::config::ConnectionConfig;
use crate::connection::ConnectionFactory;
use crate::diagnostics::DiagnosticSender;
use crate::error::Result;
use crate::exec::{self, CommandSyntax};
use crate::info::{self, ServerInfoSummary};
use crate::inspect::{self, KeyDetails};

#[derive(Debug)]
pub struct Session {
    config: ConnectionConfig,
    client: Client,
    cache: KeyCache,
    diagnostics: DiagnosticSender,
    syntax: CommandSyntax,
}

impl Session {
    /// Build the client for `config` and wrap it in a session
    pub fn new(config: ConnectionConfig, diagnostics: DiagnosticSender) -> Result<Self> {
        let client = ConnectionFactory::new(diagnostics.clone()).build(&config)?;
        Ok(Self::with_client(config, client, diagnostics))
    }

    /// Wrap an already built client
    pub fn with_client(
        config: ConnectionConfig,
        client: Client,
        diagnostics: DiagnosticSender,
    ) -> Self {
        Self {
            config,
            client,
            cache: KeyCache::default(),
            diagnostics,
            syntax: CommandSyntax::default(),
        }
    }

    /// Choose how [`Session::execute`] splits command lines
    pub fn with_command_syntax(mut self, syntax: CommandSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn diagnostics(&self) -> &DiagnosticSender {
        &self.diagnostics
    }

    /// Every key matching `pattern`, never cached
    #[instrument(skip(self))]
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.cache.keys_matching(&self.client, pattern).await
    }

    /// A bounded sample of all keys, cached for a minute when `use_cache`
    pub async fn all_keys(&self, use_cache: bool) -> Result<Arc<[String]>> {
        self.cache.all_keys(&self.client, use_cache).await
    }

    pub async fn server_info(&self) -> Result<ServerInfoSummary> {
        info::server_info(&self.client, &self.config).await
    }

    /// Raw passthrough; the reply or error is returned untouched
    pub async fn execute(&self, line: &str) -> RedisResult<Value> {
        exec::execute(&self.client, line, self.syntax).await
    }

    #[instrument(skip(self))]
    pub async fn inspect(&self, key: &str) -> Result<KeyDetails> {
        inspect::inspect(&self.client, key).await
    }

    pub async fn ping(&self) -> RedisResult<String> {
        self.client.ping().await
    }

    /// Forget the cached key sample
    pub async fn refresh(&self) {
        self.cache.invalidate().await;
    }
}
