//! Cloudflare structured backend

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::{create_http_client, normalize_base_url};
use crate::types::DnsCredentials;

pub(crate) use error::map_cloudflare_error;
pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

/// Public Cloudflare API v4 base URL
pub const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Typed Cloudflare client
pub struct CloudflareClient {
    pub(crate) client: Client,
    pub(crate) credentials: DnsCredentials,
    pub(crate) base_url: String,
    pub(crate) max_retries: u32,
}

impl CloudflareClient {
    pub fn new(credentials: DnsCredentials) -> Self {
        Self::with_base_url(credentials, CF_API_BASE)
    }

    /// Point the client at another API root (mock servers, API gateways).
    pub fn with_base_url(credentials: DnsCredentials, base_url: &str) -> Self {
        Self {
            client: create_http_client(),
            credentials,
            base_url: normalize_base_url(base_url),
            max_retries: crate::http_client::DEFAULT_MAX_RETRIES,
        }
    }
}
