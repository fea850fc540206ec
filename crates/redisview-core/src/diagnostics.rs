//! Diagnostic messages for the presentation layer
//!
//! The core never writes to a display surface. Anything the user should see
//! outside of a command's own result (TLS fallbacks, debug traces of
//! commands) goes through a bounded channel that the front end drains.
//!
//! Sending never blocks: when the channel is full or the receiver is gone the
//! message is dropped and counted, so a stalled consumer cannot hold up a
//! command in flight. Every diagnostic is also mirrored to `tracing`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 100;

/// How prominently a diagnostic should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single (severity, message) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Receiving half, owned by the presentation layer
pub type DiagnosticReceiver = mpsc::Receiver<Diagnostic>;

/// Sending half, cloned into every component that reports diagnostics
#[derive(Debug, Clone)]
pub struct DiagnosticSender {
    tx: mpsc::Sender<Diagnostic>,
    dropped: Arc<AtomicU64>,
}

/// Create a bounded diagnostic channel
pub fn channel(capacity: usize) -> (DiagnosticSender, DiagnosticReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DiagnosticSender {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}

impl DiagnosticSender {
    /// Emit a diagnostic without blocking
    pub fn emit(&self, severity: Severity, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(severity, message);

        match diagnostic.severity {
            Severity::Debug => debug!(target: "redisview_core::diagnostics", "{}", diagnostic.message),
            Severity::Info => info!(target: "redisview_core::diagnostics", "{}", diagnostic.message),
            Severity::Warning => warn!(target: "redisview_core::diagnostics", "{}", diagnostic.message),
            Severity::Error => error!(target: "redisview_core::diagnostics", "{}", diagnostic.message),
        }

        if self.tx.try_send(diagnostic).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Severity::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    /// Number of diagnostics dropped because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Drain everything currently buffered without waiting
pub fn drain(rx: &mut DiagnosticReceiver) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    while let Ok(diagnostic) = rx.try_recv() {
        out.push(diagnostic);
    }
    out
}
