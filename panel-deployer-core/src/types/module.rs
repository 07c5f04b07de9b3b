//! Module registry types

use serde::Serialize;

/// Where a module's files live inside the module library (and, mirrored,
/// inside a domain's web root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModulePaths {
    /// One combined placement.
    #[serde(rename_all = "camelCase")]
    Combined { source_path: &'static str },
    /// Independent API and panel halves.
    Split {
        api: &'static str,
        panel: &'static str,
    },
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Stable lowercase key.
    pub key: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    /// Current version shipped in the module library.
    pub version: &'static str,
    pub paths: ModulePaths,
    /// Files are placed directly in the web root instead of a subdirectory.
    pub web_root_placement: bool,
}

/// One half of a split module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulePart {
    Api,
    Panel,
}

impl ModulePart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Panel => "panel",
        }
    }
}

impl std::str::FromStr for ModulePart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "panel" => Ok(Self::Panel),
            other => Err(format!("unknown module part '{other}' (expected api or panel)")),
        }
    }
}
