//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareClient;

/// Map Cloudflare error codes to [`ProviderError`].
///
/// Also used by the direct backend, which talks to the same API.
pub(crate) fn map_cloudflare_error(
    provider: &'static str,
    raw: RawApiError,
    context: ErrorContext,
) -> ProviderError {
    match raw.code.as_deref() {
        // 6003 invalid request headers, 6103 invalid X-Auth-Key format,
        // 6111 invalid Authorization header, 9103 unknown X-Auth-Key or X-Auth-Email,
        // 10000 authentication error
        Some("6003" | "6103" | "6111" | "9103" | "10000") => ProviderError::InvalidCredentials {
            provider: provider.to_string(),
            raw_message: Some(raw.message),
        },

        // 9109 unauthorized to access requested resource
        Some("9109") => ProviderError::PermissionDenied {
            provider: provider.to_string(),
            raw_message: Some(raw.message),
        },

        // 1004 DNS validation error, 9000 invalid name, 9005/9006 bad A/AAAA content,
        // 9021 invalid TTL, 9041 record cannot be proxied
        Some(code @ ("1004" | "9000" | "9005" | "9006" | "9021" | "9041")) => {
            let param = match code {
                "9000" => "name",
                "9005" | "9006" => "content",
                "9021" => "ttl",
                "9041" => "proxied",
                _ => "general",
            };
            ProviderError::InvalidParameter {
                provider: provider.to_string(),
                param: param.to_string(),
                detail: raw.message,
            }
        }

        // 81053..81058 record with that host/settings already exists
        Some("81053" | "81054" | "81055" | "81056" | "81057" | "81058") => {
            ProviderError::RecordExists {
                provider: provider.to_string(),
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            }
        }

        // 81045 record quota exceeded
        Some("81045") => ProviderError::QuotaExceeded {
            provider: provider.to_string(),
            raw_message: Some(raw.message),
        },

        // 1001 invalid zone identifier, 7000/7003 no route for that URI
        Some("1001" | "7000" | "7003") => ProviderError::ZoneNotFound {
            provider: provider.to_string(),
            zone_id: context.zone_id.unwrap_or_else(|| "<unknown>".to_string()),
            raw_message: Some(raw.message),
        },

        _ => ProviderError::Unknown {
            provider: provider.to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        },
    }
}

impl ProviderErrorMapper for CloudflareClient {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code {
            Some(_) => map_cloudflare_error(self.provider_name(), raw, context),
            None => self.unknown_error(raw),
        }
    }
}
