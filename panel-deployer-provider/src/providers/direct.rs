//! Direct HTTPS backend
//!
//! Talks to the same REST endpoint as the structured client but builds the
//! auth headers by hand and reads the response as untyped JSON, so it keeps
//! working when the typed payloads no longer line up with the API.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};

use crate::error::{ProviderError, Result};
use crate::http_client::{DEFAULT_MAX_RETRIES, HttpUtils};
use crate::providers::cloudflare::{CF_API_BASE, map_cloudflare_error};
use crate::providers::common::{create_http_client, normalize_base_url};
use crate::traits::{DnsBackend, ErrorContext, RawApiError};
use crate::types::{BackendCapability, BackendKind, CreatedDnsRecord, DnsCredentials, DnsRecord};

const PROVIDER_NAME: &str = "cloudflare-direct";

/// Raw HTTPS fallback backend
pub struct DirectHttpsBackend {
    client: Client,
    credentials: DnsCredentials,
    base_url: String,
}

impl DirectHttpsBackend {
    pub fn new(credentials: DnsCredentials) -> Self {
        Self::with_base_url(credentials, CF_API_BASE)
    }

    pub fn with_base_url(credentials: DnsCredentials, base_url: &str) -> Self {
        Self {
            client: create_http_client(),
            credentials,
            base_url: normalize_base_url(base_url),
        }
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut insert = |name: &'static str, value: &str| -> Result<()> {
            let value = HeaderValue::from_str(value).map_err(|e| ProviderError::InvalidParameter {
                provider: PROVIDER_NAME.to_string(),
                param: name.to_string(),
                detail: e.to_string(),
            })?;
            headers.insert(HeaderName::from_static(name), value);
            Ok(())
        };

        match &self.credentials {
            DnsCredentials::ApiToken { api_token } => {
                insert("authorization", &format!("Bearer {api_token}"))?;
            }
            DnsCredentials::GlobalKey { email, api_key } => {
                insert("x-auth-email", email)?;
                insert("x-auth-key", api_key)?;
            }
        }
        Ok(headers)
    }
}

/// Pull the first `errors[]` entry out of an untyped envelope.
fn first_error(envelope: &Value) -> RawApiError {
    envelope
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .map(|e| {
            let message = e
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            match e.get("code").and_then(Value::as_i64) {
                Some(code) => RawApiError::with_code(code.to_string(), message),
                None => RawApiError::new(message),
            }
        })
        .unwrap_or_else(|| RawApiError::new("Unknown error"))
}

/// Read a created record out of `result`, tolerating missing fields.
fn created_from_result(result: &Value, requested: &DnsRecord) -> CreatedDnsRecord {
    let text = |key: &str| result.get(key).and_then(Value::as_str).map(str::to_string);
    CreatedDnsRecord {
        id: text("id").unwrap_or_default(),
        name: text("name").unwrap_or_else(|| requested.name.clone()),
        record_type: text("type").unwrap_or_else(|| requested.record_type.as_str().to_string()),
        content: text("content").unwrap_or_else(|| requested.content.clone()),
        proxied: result.get("proxied").and_then(Value::as_bool),
    }
}

#[async_trait]
impl DnsBackend for DirectHttpsBackend {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DirectHttps
    }

    async fn probe(&self, _zone_id: &str) -> Result<BackendCapability> {
        Ok(BackendCapability::Supported)
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<CreatedDnsRecord> {
        let url = format!("{}/zones/{zone_id}/dns_records", self.base_url);
        let body = json!({
            "type": record.record_type.as_str(),
            "name": record.name,
            "content": record.content,
            "ttl": record.ttl,
            "proxied": record.proxied,
        });
        let builder = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .body(body.to_string());

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            builder,
            PROVIDER_NAME,
            "POST",
            &url,
            DEFAULT_MAX_RETRIES,
        )
        .await?;

        let envelope: Value = HttpUtils::parse_json(&response_text, PROVIDER_NAME)?;
        let success = envelope
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or((200..300).contains(&status));

        if !success {
            let raw = first_error(&envelope);
            log::error!("[{PROVIDER_NAME}] API error (HTTP {status}): {}", raw.message);
            let context = ErrorContext {
                record_name: Some(record.name.clone()),
                zone_id: Some(zone_id.to_string()),
            };
            return Err(map_cloudflare_error(PROVIDER_NAME, raw, context));
        }

        let result = envelope.get("result").cloned().unwrap_or(Value::Null);
        Ok(created_from_result(&result, record))
    }
}
