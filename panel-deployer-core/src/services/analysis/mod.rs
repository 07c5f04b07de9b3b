//! Domain structure analysis
//!
//! Rebuilds, on every call, what is installed under a domain's web root
//! from its directory layout and the small JSON metadata files each
//! component carries. Nothing is cached between calls.

mod batch_reader;
mod plex;

pub use batch_reader::{BatchReader, MetadataRead};
pub use plex::{PlexSignal, detect_plex};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::registry::{MAIN_PANEL_KEY, ModuleRegistry};
use crate::remote::{RemoteFs, close_quietly};
use crate::services::ServiceContext;
use crate::traits::RemoteSession;
use crate::types::{AnalysisConfig, DomainStructureAnalysis, InstalledModule, ItemKind};
use crate::utils::remote_path;

const PANEL_DIR: &str = "panel";
const API_DIR: &str = "api";
const ROOT_METADATA: &str = "panel_info.json";
const MODULE_METADATA: &str = "module_info.json";

const BRANDING: &str = "branding";
const SUPPORT: &str = "support";
const WEBVIEW: &str = "webview";
const WEBVIEW_PLEX_KEY: &str = "webview-plex";

/// Directories under `panel/` and `api/` that are components, not modules.
const SPECIAL_DIRS: [&str; 3] = [BRANDING, SUPPORT, WEBVIEW];

/// The tree walk needs at least `panel/<module>` to find modules.
const MIN_WALK_DEPTH: usize = 2;

fn special_metadata_relative(parent: &str, component: &str) -> String {
    format!("{parent}/{component}/{component}_info.json")
}

/// Analyzes installed components under a domain's web root
pub struct DomainAnalysisService {
    ctx: Arc<ServiceContext>,
}

impl DomainAnalysisService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Analyze `domain_path`.
    ///
    /// Never fails: connection and listing errors are reported in the
    /// `error` field of the returned analysis.
    pub async fn analyze(&self, domain_path: &str) -> DomainStructureAnalysis {
        let domain_path = remote_path::trim_trailing_slash(domain_path.trim());
        if domain_path.is_empty() {
            return DomainStructureAnalysis::failed(domain_path, "No domain path given");
        }

        let config = self.ctx.config().await;
        let session = match self.ctx.open_session(&config.connection).await {
            Ok(session) => session,
            Err(e) => return DomainStructureAnalysis::failed(domain_path, e.to_string()),
        };

        let analysis = analyze_with_session(
            session.as_ref(),
            domain_path,
            &config.analysis,
            &self.ctx.registry,
        )
        .await;
        close_quietly(session.as_ref()).await;

        match &analysis.error {
            Some(error) => log::warn!("[analysis] {domain_path}: {error}"),
            None => log::info!(
                "[analysis] {domain_path}: {} module(s), {} update(s) available",
                analysis.modules.len(),
                analysis.updates_available()
            ),
        }
        analysis
    }
}

/// Directory layout gathered from the tree walk.
#[derive(Debug, Default)]
struct Layout {
    /// Relative paths of directories.
    dirs: BTreeSet<String>,
    /// Child directory names of `panel/`.
    panel_children: BTreeSet<String>,
    /// Child directory names of `api/`.
    api_children: BTreeSet<String>,
    panel_has_entries: bool,
    api_has_entries: bool,
}

impl Layout {
    fn has_dir(&self, relative: &str) -> bool {
        self.dirs.contains(relative)
    }

    fn has_special(&self, component: &str) -> bool {
        [PANEL_DIR, API_DIR]
            .iter()
            .any(|parent| self.has_dir(&format!("{parent}/{component}")))
    }
}

/// Metadata reads keyed by absolute path, looked up by relative path.
struct Reads<'a> {
    domain_path: &'a str,
    results: HashMap<String, MetadataRead>,
}

impl Reads<'_> {
    fn get(&self, relative: &str) -> Option<&Value> {
        self.results
            .get(&remote_path::join(self.domain_path, relative))
            .and_then(MetadataRead::value)
    }

    /// Special component metadata, `panel/` copy first.
    fn special(&self, component: &str) -> Option<&Value> {
        [PANEL_DIR, API_DIR]
            .iter()
            .find_map(|parent| self.get(&special_metadata_relative(parent, component)))
    }
}

async fn analyze_with_session(
    session: &dyn RemoteSession,
    domain_path: &str,
    config: &AnalysisConfig,
    registry: &ModuleRegistry,
) -> DomainStructureAnalysis {
    let fs = RemoteFs::new(session);
    let entries = match fs.walk(domain_path, config.max_depth.max(MIN_WALK_DEPTH)).await {
        Ok(entries) => entries,
        Err(e) => {
            return DomainStructureAnalysis::failed(
                domain_path,
                format!("Cannot read {domain_path}: {e}"),
            );
        }
    };

    let mut layout = Layout::default();
    for walked in &entries {
        let (parent, name) = match walked.relative_path.split_once('/') {
            Some((parent, rest)) if !rest.contains('/') => (Some(parent), rest),
            _ => (None, walked.relative_path.as_str()),
        };
        match parent {
            Some(PANEL_DIR) => {
                layout.panel_has_entries = true;
                if walked.entry.is_dir {
                    layout.panel_children.insert(name.to_string());
                }
            }
            Some(API_DIR) => {
                layout.api_has_entries = true;
                if walked.entry.is_dir {
                    layout.api_children.insert(name.to_string());
                }
            }
            _ => {}
        }
        if walked.entry.is_dir {
            layout.dirs.insert(walked.relative_path.clone());
        }
    }

    let mut queued = vec![remote_path::join(domain_path, ROOT_METADATA)];
    for component in SPECIAL_DIRS {
        for parent in [PANEL_DIR, API_DIR] {
            if layout.has_dir(&format!("{parent}/{component}")) {
                queued.push(remote_path::join(
                    domain_path,
                    &special_metadata_relative(parent, component),
                ));
            }
        }
    }
    for (parent, children) in [
        (PANEL_DIR, &layout.panel_children),
        (API_DIR, &layout.api_children),
    ] {
        for module in children.iter().filter(|m| !is_special(m)) {
            queued.push(remote_path::join(
                domain_path,
                &format!("{parent}/{module}/{MODULE_METADATA}"),
            ));
        }
    }

    let reads = Reads {
        domain_path,
        results: BatchReader::new(config).read_all(session, &queued).await,
    };

    let mut analysis = DomainStructureAnalysis {
        domain_path: domain_path.to_string(),
        panel_directory_empty: !layout.panel_has_entries,
        api_directory_empty: !layout.api_has_entries,
        analyzed_at: Some(Utc::now()),
        ..DomainStructureAnalysis::default()
    };

    if let Some(root) = reads.get(ROOT_METADATA) {
        analysis.has_main_panel = true;
        record_component_version(&mut analysis, registry, MAIN_PANEL_KEY, root);
    }

    for component in [BRANDING, SUPPORT] {
        if !layout.has_special(component) {
            continue;
        }
        if component == BRANDING {
            analysis.has_branding = true;
        } else {
            analysis.has_support = true;
        }
        if let Some(value) = reads.special(component) {
            record_component_version(&mut analysis, registry, component, value);
        }
    }

    if layout.has_special(WEBVIEW) {
        let webview_metadata = reads.special(WEBVIEW);
        let plex = webview_metadata.and_then(detect_plex);
        if let Some(signal) = plex {
            log::debug!("[analysis] Plex webview detected ({signal:?})");
        }
        analysis.has_plex_webview = plex.is_some();
        analysis.has_webview = plex.is_none();
        if let Some(value) = webview_metadata {
            let key = if plex.is_some() { WEBVIEW_PLEX_KEY } else { WEBVIEW };
            record_component_version(&mut analysis, registry, key, value);
        }
    }

    for (parent, kind, children) in [
        (PANEL_DIR, ItemKind::ModulePanel, &layout.panel_children),
        (API_DIR, ItemKind::ModuleApi, &layout.api_children),
    ] {
        for name in children.iter().filter(|m| !is_special(m)) {
            let version = reads
                .get(&format!("{parent}/{name}/{MODULE_METADATA}"))
                .and_then(version_of);
            let key = name.to_ascii_lowercase();
            analysis.modules.push(InstalledModule {
                display_name: registry.display_name(&key).to_string(),
                kind,
                path: remote_path::join(domain_path, &format!("{parent}/{name}")),
                has_update: version
                    .as_deref()
                    .is_some_and(|v| registry.has_update(&key, v)),
                version,
                name: name.clone(),
            });
        }
    }

    analysis
}

fn is_special(name: &str) -> bool {
    SPECIAL_DIRS.iter().any(|s| s.eq_ignore_ascii_case(name))
}

fn version_of(metadata: &Value) -> Option<String> {
    match metadata.get("version")? {
        Value::String(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_component_version(
    analysis: &mut DomainStructureAnalysis,
    registry: &ModuleRegistry,
    key: &str,
    metadata: &Value,
) {
    let Some(version) = version_of(metadata) else {
        return;
    };
    if registry.has_update(key, &version) {
        analysis.component_updates.push(key.to_string());
    }
    analysis.component_versions.insert(key.to_string(), version);
}
