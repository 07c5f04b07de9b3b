//! DNS record creation types

use serde::{Deserialize, Serialize};

use panel_deployer_provider::{BackendKind, DnsRecordType};

/// Where a template's record content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateContent {
    /// The configured IPv4 address.
    Ipv4,
    /// The configured IPv6 address.
    Ipv6,
    Literal(&'static str),
}

/// Static record template. `name_pattern` contains [`SUBDOMAIN_PLACEHOLDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsRecordTemplate {
    pub name_pattern: &'static str,
    pub record_type: DnsRecordType,
    pub content: TemplateContent,
    /// `None` uses the configured default.
    pub proxied: Option<bool>,
}

pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

/// Outcome of creating one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordOutcome {
    /// Name relative to the zone apex.
    pub name: String,
    pub fqdn: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub content: String,
    pub proxied: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `create_records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsCreationResult {
    /// At least one record was created.
    pub success: bool,
    pub subdomain: String,
    pub fqdn: String,
    pub created_count: usize,
    pub total_count: usize,
    pub cancelled: bool,
    pub records: Vec<DnsRecordOutcome>,
}

impl DnsCreationResult {
    pub fn from_outcomes(
        subdomain: &str,
        fqdn: String,
        records: Vec<DnsRecordOutcome>,
        cancelled: bool,
    ) -> Self {
        let created_count = records.iter().filter(|r| r.success).count();
        Self {
            success: created_count > 0,
            subdomain: subdomain.to_string(),
            fqdn,
            created_count,
            total_count: records.len(),
            cancelled,
            records,
        }
    }
}
