//! Backend construction and capability-probe selection.

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{CF_API_BASE, CloudflareClient, DirectHttpsBackend};
use crate::traits::DnsBackend;
use crate::types::{BackendCapability, BackendKind, DnsCredentials};

/// Build a backend of the given kind against `base_url`.
pub fn create_backend(
    kind: BackendKind,
    credentials: DnsCredentials,
    base_url: &str,
) -> Arc<dyn DnsBackend> {
    match kind {
        BackendKind::Structured => Arc::new(CloudflareClient::with_base_url(credentials, base_url)),
        BackendKind::DirectHttps => {
            Arc::new(DirectHttpsBackend::with_base_url(credentials, base_url))
        }
    }
}

/// Pick a backend for `zone_id` on the public Cloudflare API.
///
/// See [`select_backend_at`].
pub async fn select_backend(
    credentials: &DnsCredentials,
    zone_id: &str,
) -> Result<Arc<dyn DnsBackend>> {
    select_backend_at(credentials, zone_id, CF_API_BASE).await
}

/// Pick a backend by probing the structured client.
///
/// - probe succeeds: structured client
/// - zone answer has an unexpected shape: direct HTTPS backend
/// - credentials rejected: error, nothing will work with these credentials
/// - any other probe failure: structured client, the per-record calls
///   report their own errors
pub async fn select_backend_at(
    credentials: &DnsCredentials,
    zone_id: &str,
    base_url: &str,
) -> Result<Arc<dyn DnsBackend>> {
    let structured = create_backend(BackendKind::Structured, credentials.clone(), base_url);

    match structured.probe(zone_id).await {
        Ok(BackendCapability::Supported) => Ok(structured),
        Ok(BackendCapability::ShapeMismatch { detail }) => {
            log::warn!("[dns] Structured client cannot read zone {zone_id} ({detail}); using direct HTTPS");
            Ok(create_backend(
                BackendKind::DirectHttps,
                credentials.clone(),
                base_url,
            ))
        }
        Err(e @ crate::ProviderError::InvalidCredentials { .. }) => Err(e),
        Err(e) => {
            log::warn!("[dns] Zone probe failed, keeping structured client: {e}");
            Ok(structured)
        }
    }
}
