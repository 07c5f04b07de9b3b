//! Config file loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use panel_deployer_core::types::AppConfig;

const APP_DIR: &str = "panel-deployer";
const CONFIG_FILE: &str = "config.json";

/// `<config dir>/panel-deployer/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load from `explicit` or the default location. A missing file yields the
/// defaults; an unreadable or malformed one is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_config_path) else {
        tracing::warn!("No config directory on this platform, using defaults");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        if explicit.is_some() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
