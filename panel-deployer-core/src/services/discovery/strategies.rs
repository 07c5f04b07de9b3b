//! Domain discovery strategies: one remote command and one output parser each

use std::net::IpAddr;

use crate::types::DiscoveredDomain;
use crate::utils::remote_path;
use crate::utils::shell::quote;

const NGINX_VHOST_DIRS: &str = "/etc/nginx/sites-enabled /etc/nginx/conf.d";
const APACHE_VHOST_DIRS: &str = "/etc/apache2/sites-enabled /etc/httpd/conf.d";

/// One independent way of enumerating hosted domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStrategy {
    /// Subdirectories of the configured domains root
    DomainsDirectory,
    /// `server_name` directives in nginx vhosts
    NginxVhosts,
    /// `ServerName` / `ServerAlias` directives in apache vhosts
    ApacheVhosts,
    /// The hosting control panel's domain list
    ControlPanel,
    /// `public_html` directories under `/home`
    HomePublicHtml,
}

impl DiscoveryStrategy {
    pub const ALL: [Self; 5] = [
        Self::DomainsDirectory,
        Self::NginxVhosts,
        Self::ApacheVhosts,
        Self::ControlPanel,
        Self::HomePublicHtml,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DomainsDirectory => "domains-directory",
            Self::NginxVhosts => "nginx-vhosts",
            Self::ApacheVhosts => "apache-vhosts",
            Self::ControlPanel => "control-panel",
            Self::HomePublicHtml => "home-public-html",
        }
    }

    pub fn command(self, base_path: &str, cli_command: &str) -> String {
        match self {
            Self::DomainsDirectory => format!(
                r"find {} -mindepth 1 -maxdepth 1 -type d -printf '%f\n'",
                quote(base_path)
            ),
            Self::NginxVhosts => format!(
                "grep -rhoE 'server_name[[:space:]]+[^;]+' {NGINX_VHOST_DIRS} 2>/dev/null"
            ),
            Self::ApacheVhosts => format!(
                "grep -rhoiE '^[[:space:]]*Server(Name|Alias)[[:space:]]+.+' {APACHE_VHOST_DIRS} 2>/dev/null"
            ),
            Self::ControlPanel => format!("{} list-domains --name-only", quote(cli_command)),
            Self::HomePublicHtml => {
                "find /home -mindepth 2 -maxdepth 4 -type d -name public_html 2>/dev/null"
                    .to_string()
            }
        }
    }

    /// Scans over paths that may be absent or unreadable on a given host.
    /// `grep` exits 2 when one of its paths is missing and `find` exits 1 on
    /// an unreadable subtree, even after printing matches, so a non-zero
    /// exit from these still carries usable output.
    pub fn scans_optional_paths(self) -> bool {
        !matches!(self, Self::ControlPanel)
    }

    /// Extract domains from the command's stdout. Implausible names are dropped.
    pub fn parse(self, stdout: &str) -> Vec<DiscoveredDomain> {
        match self {
            Self::DomainsDirectory | Self::ControlPanel => stdout
                .lines()
                .filter_map(normalize_name)
                .map(DiscoveredDomain::named)
                .collect(),
            Self::NginxVhosts | Self::ApacheVhosts => stdout
                .lines()
                .flat_map(|line| line.split_whitespace().skip(1))
                .filter(|token| !token.to_ascii_lowercase().starts_with("www."))
                .filter_map(normalize_name)
                .map(DiscoveredDomain::named)
                .collect(),
            Self::HomePublicHtml => stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter_map(|path| {
                    let parent = remote_path::parent(path)?;
                    let name = normalize_name(remote_path::file_name(parent))?;
                    Some(DiscoveredDomain::with_path(name, path))
                })
                .collect(),
        }
    }
}

/// Lowercase, strip a port or trailing dot, and keep only plausible domains.
pub(super) fn normalize_name(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches(';');
    let host = raw.split(':').next().unwrap_or(raw);
    let name = host.trim_end_matches('.').to_ascii_lowercase();
    is_plausible_domain(&name).then_some(name)
}

/// Shape check only: dotted labels of letters, digits and hyphens, an
/// alphabetic TLD, and not an IP address.
pub(super) fn is_plausible_domain(name: &str) -> bool {
    if name.len() > 253 || !name.contains('.') || name.parse::<IpAddr>().is_ok() {
        return false;
    }
    let labels: Vec<&str> = name.split('.').collect();
    let valid_labels = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    valid_labels && tld_ok
}
