//! # panel-deployer-provider
//!
//! DNS backend abstraction used by panel-deployer to publish the records a
//! freshly provisioned subdomain needs.
//!
//! ## Backends
//!
//! | Backend | Kind | Notes |
//! |---------|------|-------|
//! | [`CloudflareClient`] | [`BackendKind::Structured`] | Typed responses, error-code mapping, retries |
//! | [`DirectHttpsBackend`] | [`BackendKind::DirectHttps`] | Raw JSON `POST`, hand-built auth headers |
//!
//! Both authenticate with either an API token (`Authorization: Bearer`) or an
//! account email plus global API key (`X-Auth-Email` / `X-Auth-Key`).
//!
//! ## Backend selection
//!
//! [`select_backend`] builds the structured client and probes the zone. When
//! the zone response does not have the shape the client expects, the direct
//! HTTPS backend is used instead:
//!
//! ```rust,no_run
//! use panel_deployer_provider::{select_backend, DnsCredentials, DnsRecord, DnsRecordType};
//!
//! # async fn example() -> panel_deployer_provider::Result<()> {
//! let credentials = DnsCredentials::ApiToken {
//!     api_token: "your-token".to_string(),
//! };
//! let backend = select_backend(&credentials, "zone-id").await?;
//!
//! let record = DnsRecord {
//!     name: "demo.example.com".to_string(),
//!     record_type: DnsRecordType::A,
//!     content: "203.0.113.10".to_string(),
//!     ttl: 1,
//!     proxied: true,
//! };
//! let created = backend.create_record("zone-id", &record).await?;
//! println!("created {} ({})", created.name, created.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All backend operations return [`Result<T, ProviderError>`](ProviderError).
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are retried
//! with exponential backoff by the shared HTTP utilities.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use factory::{create_backend, select_backend, select_backend_at};

pub use traits::DnsBackend;

pub use types::{
    BackendCapability, BackendKind, CreatedDnsRecord, DnsCredentials, DnsRecord, DnsRecordType,
};

pub use providers::{CF_API_BASE, CloudflareClient, DirectHttpsBackend};

pub use utils::log_sanitizer::truncate_for_log;
