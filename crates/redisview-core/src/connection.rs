//! Connection factory
//!
//! Turns a resolved [`ConnectionConfig`] into a [`Client`]. Nothing here
//! touches the network; both backends connect on their first command.
//!
//! TLS problems never fail the build. If the configured certificate material
//! cannot be loaded, an error diagnostic is emitted and the client connects
//! without TLS.

use std::sync::Arc;

use redis::cluster::ClusterClientBuilder;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::{debug, info};

use crate::client::{Client, ClientKind, ClusterBackend, StandaloneBackend};
use crate::config::ConnectionConfig;
use crate::diagnostics::DiagnosticSender;
use crate::error::{CoreError, Result};
use crate::tls::{TlsConfigBuilder, TlsMaterial};

/// Builds clients and reports TLS fallbacks to the diagnostic channel
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    diagnostics: DiagnosticSender,
}

impl ConnectionFactory {
    pub fn new(diagnostics: DiagnosticSender) -> Self {
        Self { diagnostics }
    }

    /// Build a standalone or cluster client for `config`
    pub fn build(&self, config: &ConnectionConfig) -> Result<Client> {
        debug!("Building client for {:?}", config);

        let tls = self.tls_material(config);
        let client = if config.cluster {
            self.build_cluster(config, tls)?
        } else {
            self.build_standalone(config, tls)?
        };

        info!(
            "Client ready: {} {} (tls: {})",
            client.kind(),
            config.address(),
            client.is_tls()
        );

        if config.debug {
            Ok(client.with_tracing(self.diagnostics.clone()))
        } else {
            Ok(client)
        }
    }

    fn tls_material(&self, config: &ConnectionConfig) -> Option<TlsMaterial> {
        if !config.tls.enabled {
            return None;
        }

        match TlsConfigBuilder::from_settings(&config.tls).build() {
            Ok(material) => Some(material),
            Err(e) => {
                self.tls_fallback(e);
                None
            }
        }
    }

    fn tls_fallback(&self, err: impl std::fmt::Display) {
        self.diagnostics
            .error(format!("TLS configuration error: {}", err));
    }

    fn build_standalone(
        &self,
        config: &ConnectionConfig,
        tls: Option<TlsMaterial>,
    ) -> Result<Client> {
        if let Some(material) = tls {
            let info = connection_info(config, Some(&material), i64::from(config.db));
            let built = match material.certificates() {
                Some(certs) => redis::Client::build_with_tls(info, certs),
                None => redis::Client::open(info),
            };

            match built {
                Ok(client) => {
                    return Ok(Client::new(
                        ClientKind::Standalone,
                        Arc::new(StandaloneBackend::new(client)),
                    )
                    .with_tls(true));
                }
                Err(e) => self.tls_fallback(e),
            }
        }

        let info = connection_info(config, None, i64::from(config.db));
        let client = redis::Client::open(info).map_err(CoreError::Connection)?;
        Ok(Client::new(
            ClientKind::Standalone,
            Arc::new(StandaloneBackend::new(client)),
        ))
    }

    fn build_cluster(&self, config: &ConnectionConfig, tls: Option<TlsMaterial>) -> Result<Client> {
        if let Some(material) = tls {
            match cluster_builder(config, Some(&material)).build() {
                Ok(client) => {
                    return Ok(
                        Client::new(ClientKind::Cluster, Arc::new(ClusterBackend::new(client)))
                            .with_tls(true),
                    );
                }
                Err(e) => self.tls_fallback(e),
            }
        }

        let client = cluster_builder(config, None)
            .build()
            .map_err(CoreError::Connection)?;
        Ok(Client::new(
            ClientKind::Cluster,
            Arc::new(ClusterBackend::new(client)),
        ))
    }
}

/// Seed node, password and TLS for the cluster; clusters have no db index
fn cluster_builder(config: &ConnectionConfig, tls: Option<&TlsMaterial>) -> ClusterClientBuilder {
    let mut builder = ClusterClientBuilder::new(vec![connection_info(config, tls, 0)]);
    if let Some(password) = &config.password {
        builder = builder.password(password.clone());
    }
    if let Some(certs) = tls.and_then(TlsMaterial::certificates) {
        builder = builder.certs(certs);
    }
    builder
}

fn connection_info(config: &ConnectionConfig, tls: Option<&TlsMaterial>, db: i64) -> ConnectionInfo {
    let addr = match tls {
        Some(material) => ConnectionAddr::TcpTls {
            host: config.host.clone(),
            port: config.port,
            insecure: material.skip_verify,
            tls_params: None,
        },
        None => ConnectionAddr::Tcp(config.host.clone(), config.port),
    };

    ConnectionInfo {
        addr,
        redis: RedisConnectionInfo {
            db,
            password: config.password.clone(),
            ..Default::default()
        },
    }
}
