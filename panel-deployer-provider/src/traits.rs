use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{BackendCapability, BackendKind, CreatedDnsRecord, DnsRecord};

/// Raw API error (internal)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Provider error code, if the API sent one
    pub code: Option<String>,
    /// Raw message
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra information used while mapping errors (internal)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name (for `RecordExists`)
    pub record_name: Option<String>,
    /// Zone ID (for `ZoneNotFound`)
    pub zone_id: Option<String>,
}

/// Maps raw API errors onto [`ProviderError`] (internal)
pub(crate) trait ProviderErrorMapper {
    /// Backend identifier used in error payloads
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// A way of publishing DNS records to the provider.
///
/// Implementations are selected once per configuration by
/// [`select_backend`](crate::select_backend) rather than by inspecting the
/// client shape at every call.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// Backend identifier
    fn id(&self) -> &'static str;

    /// Which implementation this is
    fn kind(&self) -> BackendKind;

    /// Check that this backend can talk to the zone.
    ///
    /// Transport and authentication failures are returned as errors; a
    /// response that parses but not into the expected shape is reported as
    /// [`BackendCapability::ShapeMismatch`].
    async fn probe(&self, zone_id: &str) -> Result<BackendCapability>;

    /// Create one record in the zone.
    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<CreatedDnsRecord>;
}
