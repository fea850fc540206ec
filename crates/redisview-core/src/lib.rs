//! # redisview-core
//!
//! Connectivity and keyspace layer for the redisview client. A front end
//! resolves a [`ConnectionConfig`], opens a [`Session`], and drains the
//! diagnostic channel; everything else happens through the session.
//!
//! ```text
//! ConfigSources ──resolve──▶ ConnectionConfig ──ConnectionFactory──▶ Client
//!                                                                    │
//!            Session { KeyCache, scan, info, exec, inspect } ◀───────┘
//!                     │
//!                     └──▶ DiagnosticSender ──mpsc──▶ front end
//! ```
//!
//! ## Modules
//!
//! - [`config`]: URL parsing, precedence, profile file
//! - [`tls`]: certificate material for `rediss` connections
//! - [`connection`] / [`client`]: standalone or cluster client behind one handle
//! - [`scan`] / [`cache`]: cursor iteration and the cached key sample
//! - [`info`], [`exec`], [`inspect`]: server summary, passthrough, key lookup
//! - [`diagnostics`]: messages for the presentation layer

pub mod cache;
pub mod client;
pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod info;
pub mod inspect;
pub mod scan;
pub mod session;
pub mod tls;

#[cfg(test)]
pub mod testing;

pub use cache::KeyCache;
pub use client::{Backend, Client, ClientKind};
pub use config::{ConfigError, ConfigSources, ConnectionConfig, ConnectionOverrides, ProfileFile};
pub use connection::ConnectionFactory;
pub use diagnostics::{Diagnostic, DiagnosticReceiver, DiagnosticSender, Severity};
pub use error::{CoreError, Result};
pub use exec::{CommandSyntax, format_value};
pub use info::ServerInfoSummary;
pub use inspect::{KeyDetails, KeyKind, KeyValue, Ttl};
pub use scan::{ScanLimit, scan_keys};
pub use session::Session;
pub use tls::{TlsConfigBuilder, TlsError};
