//! Polymorphic redis client
//!
//! [`Client`] is the single handle every operation in this crate runs
//! against. It hides whether the server is a standalone instance or a
//! cluster behind the [`Backend`] trait, and optionally traces each command
//! to the diagnostic channel before it is sent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::cluster_routing::{Route, RoutingInfo, SingleNodeRoutingInfo, SlotAddr};
use redis::{Cmd, FromRedisValue, RedisResult, Value};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, trace};

use crate::diagnostics::DiagnosticSender;

/// Response timeout for standalone connections
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Connect/write timeout for standalone connections
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// Something that can execute a single redis command
#[async_trait]
pub trait Backend: Send + Sync {
    async fn query(&self, cmd: &Cmd) -> RedisResult<Value>;

    /// Execute a command on the same node every time.
    ///
    /// Cursor-based commands such as SCAN need this: a cursor is only
    /// meaningful to the node that issued it.
    async fn query_pinned(&self, cmd: &Cmd) -> RedisResult<Value> {
        self.query(cmd).await
    }
}

/// Which topology the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Standalone,
    Cluster,
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKind::Standalone => write!(f, "standalone"),
            ClientKind::Cluster => write!(f, "cluster"),
        }
    }
}

/// Shared client handle. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Client {
    kind: ClientKind,
    tls: bool,
    backend: Arc<dyn Backend>,
    tracer: Option<DiagnosticSender>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("kind", &self.kind)
            .field("tls", &self.tls)
            .field("tracing", &self.tracer.is_some())
            .finish()
    }
}

impl Client {
    /// Wrap an arbitrary backend
    pub fn new(kind: ClientKind, backend: Arc<dyn Backend>) -> Self {
        Self {
            kind,
            tls: false,
            backend,
            tracer: None,
        }
    }

    /// Mark the transport as TLS
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Emit `redis: <ARGS...>` to `diagnostics` before every command
    pub fn with_tracing(mut self, diagnostics: DiagnosticSender) -> Self {
        self.tracer = Some(diagnostics);
        self
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    fn trace(&self, cmd: &Cmd) {
        if let Some(tracer) = &self.tracer {
            tracer.debug(format!("redis: <{}>", command_args(cmd).join(" ")));
        }
    }

    /// Execute a command and return the raw reply
    pub async fn query(&self, cmd: &Cmd) -> RedisResult<Value> {
        self.trace(cmd);
        self.backend.query(cmd).await
    }

    /// Execute on a fixed node and convert the reply; see [`Backend::query_pinned`]
    pub async fn query_pinned_as<T: FromRedisValue>(&self, cmd: &Cmd) -> RedisResult<T> {
        self.trace(cmd);
        let value = self.backend.query_pinned(cmd).await?;
        redis::from_redis_value(&value)
    }

    /// Execute a command and convert the reply
    pub async fn query_as<T: FromRedisValue>(&self, cmd: &Cmd) -> RedisResult<T> {
        let value = self.query(cmd).await?;
        redis::from_redis_value(&value)
    }

    /// Round-trip a PING
    pub async fn ping(&self) -> RedisResult<String> {
        self.query_as(&redis::cmd("PING")).await
    }
}

/// Arguments of a command as text, for tracing and tests
pub fn command_args(cmd: &Cmd) -> Vec<String> {
    cmd.args_iter()
        .map(|arg| match arg {
            redis::Arg::Simple(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            redis::Arg::Cursor => "0".to_string(),
        })
        .collect()
}

/// Single-node backend over a multiplexed connection.
///
/// Connects on first use. If the connection breaks, the failing command
/// returns its error and the next command reconnects.
pub struct StandaloneBackend {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl StandaloneBackend {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            connection: Mutex::new(None),
        }
    }

    async fn connection(&self) -> RedisResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        debug!("Opening standalone connection");
        let conn = self
            .client
            .get_multiplexed_async_connection_with_timeouts(READ_TIMEOUT, WRITE_TIMEOUT)
            .await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl Backend for StandaloneBackend {
    async fn query(&self, cmd: &Cmd) -> RedisResult<Value> {
        let mut conn = self.connection().await?;
        let result: RedisResult<Value> = cmd.query_async(&mut conn).await;

        if let Err(e) = &result {
            if e.is_connection_dropped() || e.is_io_error() {
                trace!("Discarding broken standalone connection: {}", e);
                *self.connection.lock().await = None;
            }
        }
        result
    }
}

/// Where pinned commands go in a cluster: the primary serving slot 0.
///
/// redis-rs sends commands without a key to a random node, which breaks
/// cursor continuity across SCAN pages. Only that primary's share of the
/// keyspace is listed.
pub fn pinned_route() -> RoutingInfo {
    RoutingInfo::SingleNode(SingleNodeRoutingInfo::SpecificNode(Route::new(
        0,
        SlotAddr::Master,
    )))
}

/// Cluster backend; topology discovery starts from the seed node on first use.
pub struct ClusterBackend {
    client: ClusterClient,
    connection: OnceCell<ClusterConnection>,
}

impl ClusterBackend {
    pub fn new(client: ClusterClient) -> Self {
        Self {
            client,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> RedisResult<ClusterConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                debug!("Opening cluster connection");
                self.client.get_async_connection().await
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl Backend for ClusterBackend {
    async fn query(&self, cmd: &Cmd) -> RedisResult<Value> {
        let mut conn = self.connection().await?;
        cmd.query_async(&mut conn).await
    }

    async fn query_pinned(&self, cmd: &Cmd) -> RedisResult<Value> {
        let mut conn = self.connection().await?;
        conn.route_command(cmd, pinned_route()).await
    }
}
