//! DNS backend factory abstract Trait

use std::sync::Arc;

use async_trait::async_trait;

use panel_deployer_provider::{
    BackendKind, CF_API_BASE, DnsBackend, DnsCredentials, create_backend, select_backend_at,
};

use crate::error::CoreResult;

/// Builds DNS backends for the record service.
///
/// Kept behind a trait so the record service can be exercised without
/// network access, and so precondition failures can be shown not to reach it.
#[async_trait]
pub trait DnsBackendFactory: Send + Sync {
    /// Pick the backend for this zone, probing the provider if needed
    async fn select(
        &self,
        credentials: &DnsCredentials,
        zone_id: &str,
    ) -> CoreResult<Arc<dyn DnsBackend>>;

    /// Build a specific backend without probing
    fn create(&self, kind: BackendKind, credentials: &DnsCredentials) -> Arc<dyn DnsBackend>;
}

/// Default factory: probes the zone with the structured client.
pub struct ProbingBackendFactory {
    base_url: String,
}

impl ProbingBackendFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(CF_API_BASE)
    }

    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl Default for ProbingBackendFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsBackendFactory for ProbingBackendFactory {
    async fn select(
        &self,
        credentials: &DnsCredentials,
        zone_id: &str,
    ) -> CoreResult<Arc<dyn DnsBackend>> {
        Ok(select_backend_at(credentials, zone_id, &self.base_url).await?)
    }

    fn create(&self, kind: BackendKind, credentials: &DnsCredentials) -> Arc<dyn DnsBackend> {
        create_backend(kind, credentials.clone(), &self.base_url)
    }
}
