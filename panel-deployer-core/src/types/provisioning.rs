//! Subdomain provisioning types

use serde::{Deserialize, Serialize};

/// Request for `create_subdomain`. Unset PHP fields use the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubdomainRequest {
    /// Label only, e.g. `demo` for `demo.parent.tld`.
    pub subdomain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<String>,
}

impl CreateSubdomainRequest {
    pub fn new(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            ..Self::default()
        }
    }
}

/// Outcome of provisioning one subdomain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResult {
    /// Domain creation succeeded. PHP configuration does not affect this.
    pub success: bool,
    pub domain_name: String,
    pub web_root_path: String,
    /// Set when neither PHP configuration command succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_config_warning: Option<String>,
    /// Captured stderr when domain creation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
