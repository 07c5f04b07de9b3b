use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

// ============ Credentials ============

/// Authentication for the DNS provider API.
///
/// Cloudflare accepts either a scoped API token or the legacy account email
/// plus global API key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DnsCredentials {
    /// Scoped API token, sent as `Authorization: Bearer <token>`.
    #[serde(rename_all = "camelCase")]
    ApiToken {
        /// API token.
        api_token: String,
    },
    /// Account email and global API key, sent as `X-Auth-Email` / `X-Auth-Key`.
    #[serde(rename_all = "camelCase")]
    GlobalKey {
        /// Account email.
        email: String,
        /// Global API key.
        api_key: String,
    },
}

impl DnsCredentials {
    /// Build credentials from optional configuration values.
    ///
    /// A non-empty token wins; otherwise both email and key must be present.
    /// Returns `None` when no usable authentication method is configured.
    pub fn from_parts(
        api_token: Option<&str>,
        email: Option<&str>,
        api_key: Option<&str>,
    ) -> Option<Self> {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(token) = non_empty(api_token) {
            return Some(Self::ApiToken {
                api_token: token.to_string(),
            });
        }
        match (non_empty(email), non_empty(api_key)) {
            (Some(email), Some(key)) => Some(Self::GlobalKey {
                email: email.to_string(),
                api_key: key.to_string(),
            }),
            _ => None,
        }
    }

    /// Short label for logs; never includes the secret.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::ApiToken { .. } => "api-token",
            Self::GlobalKey { .. } => "global-key",
        }
    }

    /// Attach the authentication headers to a request.
    pub(crate) fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiToken { api_token } => {
                builder.header("Authorization", format!("Bearer {api_token}"))
            }
            Self::GlobalKey { email, api_key } => builder
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", api_key),
        }
    }
}

impl std::fmt::Debug for DnsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiToken { .. } => f.debug_struct("ApiToken").finish_non_exhaustive(),
            Self::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

// ============ Records ============

/// Record types the deployer publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl DnsRecordType {
    /// Wire name used by the provider API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete record to create. `name` is the fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Fully-qualified record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Address or literal content.
    pub content: String,
    /// TTL in seconds (`1` = automatic).
    pub ttl: u32,
    /// Whether traffic is proxied through the provider edge.
    pub proxied: bool,
}

/// A record as reported back by the provider after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDnsRecord {
    /// Provider record ID.
    pub id: String,
    /// Fully-qualified record name.
    pub name: String,
    /// Record type as echoed by the API.
    pub record_type: String,
    /// Content as echoed by the API.
    pub content: String,
    /// Proxy flag as echoed by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

// ============ Backend selection ============

/// Which backend implementation is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Typed Cloudflare client.
    Structured,
    /// Raw HTTPS fallback.
    DirectHttps,
}

/// Outcome of probing a backend against the configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCapability {
    /// The backend understood the zone response.
    Supported,
    /// The API answered, but not in the shape this backend expects.
    ShapeMismatch {
        /// Parse failure details.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_takes_precedence_over_global_key() {
        let creds = DnsCredentials::from_parts(Some("tok"), Some("a@b.c"), Some("key"));
        assert!(matches!(creds, Some(DnsCredentials::ApiToken { .. })));
    }

    #[test]
    fn global_key_requires_both_parts() {
        assert!(DnsCredentials::from_parts(None, Some("a@b.c"), None).is_none());
        assert!(DnsCredentials::from_parts(None, None, Some("key")).is_none());
        assert!(matches!(
            DnsCredentials::from_parts(Some("  "), Some("a@b.c"), Some("key")),
            Some(DnsCredentials::GlobalKey { .. })
        ));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let token = String::from("  tok \n");
        match DnsCredentials::from_parts(Some(&token), None, None) {
            Some(DnsCredentials::ApiToken { api_token }) => assert_eq!(api_token, "tok"),
            other => panic!("unexpected credentials: {other:?}"),
        }
        match DnsCredentials::from_parts(None, Some(" ops@example.com "), Some("\tkey ")) {
            Some(DnsCredentials::GlobalKey { email, api_key }) => {
                assert_eq!(email, "ops@example.com");
                assert_eq!(api_key, "key");
            }
            other => panic!("unexpected credentials: {other:?}"),
        }
    }

    #[test]
    fn nothing_configured_yields_none() {
        assert!(DnsCredentials::from_parts(None, None, None).is_none());
        assert!(DnsCredentials::from_parts(Some(""), Some(""), Some("")).is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = DnsCredentials::GlobalKey {
            email: "ops@example.com".to_string(),
            api_key: "super-secret".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ops@example.com"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn record_type_serializes_as_wire_name() {
        assert_eq!(serde_json::to_value(DnsRecordType::Aaaa).unwrap(), "AAAA");
        assert_eq!(DnsRecordType::A.to_string(), "A");
    }
}
