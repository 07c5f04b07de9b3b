//! Application configuration

use serde::{Deserialize, Serialize};

use panel_deployer_provider::DnsCredentials;

/// Full application configuration, one section per concern.
///
/// Every field has a default so a partial (or missing) config file still
/// deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub dns: DnsConfig,
    pub paths: PathsConfig,
    pub provisioning: ProvisioningConfig,
    pub transfer: TransferConfig,
    pub analysis: AnalysisConfig,
}

/// Configuration section identifiers, used for change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSection {
    Connection,
    Dns,
    Paths,
    Provisioning,
    Transfer,
    Analysis,
}

impl ConfigSection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Dns => "dns",
            Self::Paths => "paths",
            Self::Provisioning => "provisioning",
            Self::Transfer => "transfer",
            Self::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replacement value for one configuration section.
#[derive(Debug, Clone)]
pub enum SectionUpdate {
    Connection(ConnectionConfig),
    Dns(DnsConfig),
    Paths(PathsConfig),
    Provisioning(ProvisioningConfig),
    Transfer(TransferConfig),
    Analysis(AnalysisConfig),
}

impl SectionUpdate {
    pub fn section(&self) -> ConfigSection {
        match self {
            Self::Connection(_) => ConfigSection::Connection,
            Self::Dns(_) => ConfigSection::Dns,
            Self::Paths(_) => ConfigSection::Paths,
            Self::Provisioning(_) => ConfigSection::Provisioning,
            Self::Transfer(_) => ConfigSection::Transfer,
            Self::Analysis(_) => ConfigSection::Analysis,
        }
    }

    /// Write this section into `config`.
    pub fn apply_to(self, config: &mut AppConfig) {
        match self {
            Self::Connection(c) => config.connection = c,
            Self::Dns(c) => config.dns = c,
            Self::Paths(c) => config.paths = c,
            Self::Provisioning(c) => config.provisioning = c,
            Self::Transfer(c) => config.transfer = c,
            Self::Analysis(c) => config.analysis = c,
        }
    }
}

// ============ connection ============

/// Remote host and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Private key used instead of the password when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
    /// Session establishment timeout. Must be shorter than the command timeout.
    pub connect_timeout_secs: u64,
    /// Per-command timeout.
    pub command_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            private_key_path: None,
            connect_timeout_secs: 10,
            command_timeout_secs: 60,
        }
    }
}

impl ConnectionConfig {
    /// `user@host:port`, for logs.
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("private_key_path", &self.private_key_path)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .finish_non_exhaustive()
    }
}

// ============ dns ============

/// DNS zone and provider authentication.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DnsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub zone_id: String,
    /// Zone apex, e.g. `example.com`.
    pub root_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
    /// TTL in seconds, `1` = automatic.
    pub default_ttl: u32,
    /// Default proxy flag for templates that don't pin one.
    pub proxied: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            email: None,
            api_key: None,
            zone_id: String::new(),
            root_domain: String::new(),
            ipv4_address: None,
            ipv6_address: None,
            default_ttl: 1,
            proxied: true,
        }
    }
}

impl DnsConfig {
    /// Usable provider credentials, if any method is fully configured.
    pub fn credentials(&self) -> Option<DnsCredentials> {
        DnsCredentials::from_parts(
            self.api_token.as_deref(),
            self.email.as_deref(),
            self.api_key.as_deref(),
        )
    }
}

impl std::fmt::Debug for DnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsConfig")
            .field("has_api_token", &self.api_token.is_some())
            .field("email", &self.email)
            .field("zone_id", &self.zone_id)
            .field("root_domain", &self.root_domain)
            .field("ipv4_address", &self.ipv4_address)
            .field("ipv6_address", &self.ipv6_address)
            .field("default_ttl", &self.default_ttl)
            .field("proxied", &self.proxied)
            .finish_non_exhaustive()
    }
}

// ============ paths ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathsConfig {
    /// Remote directory holding one directory per hosted domain.
    pub base_path: String,
    /// Local directory downloads are written into.
    pub local_destination: String,
    /// Remote library directory module files are copied from.
    pub module_source: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_path: "/var/www".to_string(),
            local_destination: "./downloads".to_string(),
            module_source: String::new(),
        }
    }
}

// ============ provisioning ============

/// Optional resource limits passed to `create-domain`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisioningQuotas {
    /// Disk quota in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_mb: Option<u64>,
    /// Monthly bandwidth limit in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_mb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisioningConfig {
    /// Existing domain new subdomains are created under.
    pub parent_domain: String,
    /// Control-panel command, e.g. `virtualmin`.
    pub cli_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotas: Option<ProvisioningQuotas>,
    pub php_mode: String,
    pub php_version: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            parent_domain: String::new(),
            cli_command: "virtualmin".to_string(),
            template: None,
            plan: None,
            quotas: None,
            php_mode: "fpm".to_string(),
            php_version: "8.1".to_string(),
        }
    }
}

// ============ transfer ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferConfig {
    /// `uid:gid` (or `user:group`) applied to transferred files.
    pub owner: String,
    /// Octal mode applied recursively to transferred files.
    pub directory_mode: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            owner: "1000:1000".to_string(),
            directory_mode: "755".to_string(),
        }
    }
}

// ============ analysis ============

/// Batch reader and tree walk limits for structure analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Maximum concurrent metadata reads.
    pub concurrency: usize,
    /// Reads per sequential batch.
    pub batch_size: usize,
    /// Retries after the first failed attempt.
    pub retries: u32,
    pub retry_delay_ms: u64,
    /// Directory levels walked below the web root.
    pub max_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            batch_size: 5,
            retries: 2,
            retry_delay_ms: 500,
            max_depth: 2,
        }
    }
}
