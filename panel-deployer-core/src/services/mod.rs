//! Business logic service layer

mod analysis;
mod connection_service;
mod discovery;
mod dns_record_service;
mod provisioning_service;
mod transfer;

pub use analysis::{BatchReader, DomainAnalysisService, MetadataRead, PlexSignal, detect_plex};
pub use connection_service::{ConnectionService, ConnectionTestResult};
pub use discovery::{DiscoveryStrategy, DomainDiscoveryService, merge_discoveries, parse_long_listing};
pub use dns_record_service::{
    DNS_RECORD_TEMPLATES, DnsRecordService, PlannedRecord, expand_templates,
};
pub use provisioning_service::{ProvisioningService, is_valid_subdomain_label};
pub use transfer::{Selection, TransferService, classify, plan_item, plan_transfer};

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::registry::ModuleRegistry;
use crate::remote::CommandExecutor;
use crate::traits::{ConfigService, DnsBackendFactory, RemoteConnector, RemoteSession};
use crate::types::{AppConfig, ConnectionConfig};

/// Service context - holds all dependencies
///
/// The binary builds this once, injecting the transport, configuration
/// source and DNS backend factory.
pub struct ServiceContext {
    /// Opens remote sessions
    pub connector: Arc<dyn RemoteConnector>,
    /// Configuration source
    pub config: Arc<dyn ConfigService>,
    /// Module registry (read-only, shared)
    pub registry: Arc<ModuleRegistry>,
    /// DNS backend construction
    pub dns_backend_factory: Arc<dyn DnsBackendFactory>,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        connector: Arc<dyn RemoteConnector>,
        config: Arc<dyn ConfigService>,
        registry: Arc<ModuleRegistry>,
        dns_backend_factory: Arc<dyn DnsBackendFactory>,
    ) -> Self {
        Self {
            connector,
            config,
            registry,
            dns_backend_factory,
        }
    }

    /// Snapshot of the current configuration
    pub async fn config(&self) -> Arc<AppConfig> {
        self.config.current().await
    }

    /// Open a new session for one operation.
    ///
    /// The caller owns the session and must close it on every path
    /// (see [`close_quietly`](crate::remote::close_quietly)).
    pub async fn open_session(
        &self,
        connection: &ConnectionConfig,
    ) -> CoreResult<Box<dyn RemoteSession>> {
        if connection.host.trim().is_empty() || connection.username.trim().is_empty() {
            return Err(CoreError::Configuration(
                "Remote host and username must be configured".to_string(),
            ));
        }

        let timeout_secs = connection.connect_timeout_secs;
        let connect = self.connector.connect(connection);
        match tokio::time::timeout(Duration::from_secs(timeout_secs), connect).await {
            Ok(Ok(session)) => {
                log::info!("[session] Connected to {}", connection.display_target());
                Ok(session)
            }
            Ok(Err(e)) => {
                if e.is_expected() {
                    log::warn!("[session] Connect to {} failed: {e}", connection.host);
                } else {
                    log::error!("[session] Connect to {} failed: {e}", connection.host);
                }
                Err(e)
            }
            Err(_) => {
                log::error!(
                    "[session] Connect to {} timed out after {timeout_secs}s",
                    connection.host
                );
                Err(CoreError::ConnectTimeout {
                    host: connection.host.clone(),
                    timeout_secs,
                })
            }
        }
    }

    /// Command executor using the configured command timeout
    pub fn executor(connection: &ConnectionConfig) -> CommandExecutor {
        CommandExecutor::from_config(connection)
    }
}
