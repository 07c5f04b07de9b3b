//! Domain discovery and analysis types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transfer::ItemKind;

/// A domain hosted on the remote machine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    /// Web root.
    pub path: String,
}

/// A name reported by one discovery strategy, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDomain {
    pub name: String,
    /// Set when the strategy knows the web root.
    pub path: Option<String>,
}

impl DiscoveredDomain {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    pub fn with_path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
        }
    }
}

/// Result of a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub domains: Vec<Domain>,
    /// Strategies that contributed at least one name.
    pub contributing_sources: Vec<String>,
    /// Strategy name to failure message.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub failures: BTreeMap<String, String>,
    pub used_fallback: bool,
}

/// A module found under `panel/` or `api/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledModule {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub has_update: bool,
}

/// Snapshot of what is installed under one domain's web root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStructureAnalysis {
    pub domain_path: String,
    pub has_main_panel: bool,
    pub has_branding: bool,
    pub has_support: bool,
    pub has_plex_webview: bool,
    pub has_webview: bool,
    /// Versions of the special components, keyed by registry key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_versions: BTreeMap<String, String>,
    /// Registry keys of special components with a newer library version.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub component_updates: Vec<String>,
    pub modules: Vec<InstalledModule>,
    pub panel_directory_empty: bool,
    pub api_directory_empty: bool,
    /// Set when the analysis could not complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl DomainStructureAnalysis {
    pub fn failed(domain_path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            domain_path: domain_path.into(),
            panel_directory_empty: true,
            api_directory_empty: true,
            error: Some(error.into()),
            analyzed_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn updates_available(&self) -> usize {
        self.modules.iter().filter(|m| m.has_update).count() + self.component_updates.len()
    }
}
