//! Transfer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of unit a selected item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    /// A combined-path entry (the main panel, branding, support).
    Panel,
    ModuleApi,
    ModulePanel,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::ModuleApi => "module-api",
            Self::ModulePanel => "module-panel",
        }
    }
}

/// A user-chosen unit of transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub display_name: String,
    /// Path relative to the module library (and to the web root).
    pub source_path: String,
    pub is_main_panel_placement: bool,
}

impl SelectedItem {
    /// `key:type`, unique within a selection.
    pub fn selection_key(&self) -> String {
        format!("{}:{}", self.key, self.kind.as_str())
    }
}

/// Placement rule an item resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementCategory {
    /// Files land directly in the web root.
    MainPanel,
    /// Plex webview halves land in the regular webview directories.
    PlexWebview,
    /// Relative path preserved under the web root.
    Regular,
}

/// A resolved copy operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPlanItem {
    pub key: String,
    pub display_name: String,
    pub kind: ItemKind,
    pub category: PlacementCategory,
    pub source_absolute_path: String,
    pub destination_absolute_path: String,
    /// Filled in by the existence probe at execution time.
    pub is_directory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Error,
}

/// Per-item outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub name: String,
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    /// Ownership/permission fix-up failed after a successful copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TransferResult {
    pub fn success(item: &TransferPlanItem, warning: Option<String>) -> Self {
        Self {
            name: item.display_name.clone(),
            status: TransferStatus::Success,
            path: Some(item.destination_absolute_path.clone()),
            error: None,
            kind: Some(item.kind),
            warning,
        }
    }

    pub fn error(item: &TransferPlanItem, error: impl Into<String>) -> Self {
        Self {
            name: item.display_name.clone(),
            status: TransferStatus::Error,
            path: Some(item.destination_absolute_path.clone()),
            error: Some(error.into()),
            kind: Some(item.kind),
            warning: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// Aggregated batch outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    /// At least one item succeeded.
    pub success: bool,
    pub success_count: usize,
    pub total_count: usize,
    pub cancelled: bool,
    /// Whether the final recursive ownership fix-up on the web root succeeded.
    pub ownership_fixed: bool,
    pub results: Vec<TransferResult>,
    pub finished_at: DateTime<Utc>,
}

impl TransferSummary {
    pub fn from_results(results: Vec<TransferResult>, cancelled: bool, ownership_fixed: bool) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        Self {
            success: success_count > 0,
            success_count,
            total_count: results.len(),
            cancelled,
            ownership_fixed,
            results,
            finished_at: Utc::now(),
        }
    }

    pub fn fully_succeeded(&self) -> bool {
        self.total_count > 0 && self.success_count == self.total_count
    }

    pub fn failed_count(&self) -> usize {
        self.total_count - self.success_count
    }
}
