//! Placement rules: where each selected item lands under the web root

use crate::types::{ItemKind, PlacementCategory, SelectedItem, TransferPlanItem};
use crate::utils::remote_path;

const WEBVIEW_API_DIR: &str = "api/webview";
const WEBVIEW_PANEL_DIR: &str = "panel/webview";

struct PlacementRule {
    category: PlacementCategory,
    matches: fn(&SelectedItem) -> bool,
}

/// Checked in order; the first match wins. Anything unmatched is
/// [`PlacementCategory::Regular`].
const PLACEMENT_RULES: &[PlacementRule] = &[
    PlacementRule {
        category: PlacementCategory::MainPanel,
        matches: is_main_panel,
    },
    PlacementRule {
        category: PlacementCategory::PlexWebview,
        matches: is_plex_webview,
    },
];

fn is_main_panel(item: &SelectedItem) -> bool {
    item.is_main_panel_placement
}

/// The Plex webview variant names both `webview` and `plex` as separate
/// words (`webview-plex`, `panel/webview_plex`, `WebView (Plex)`), so
/// modules that merely contain the letters (`duplex`) do not match.
fn is_plex_webview(item: &SelectedItem) -> bool {
    matches!(item.kind, ItemKind::ModuleApi | ItemKind::ModulePanel)
        && [&item.key, &item.display_name, &item.source_path]
            .into_iter()
            .any(|s| names_plex_webview(s))
}

fn names_plex_webview(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let has_word = |w: &str| lower.split(|c: char| !c.is_ascii_alphanumeric()).any(|x| x == w);
    has_word("webview") && has_word("plex")
}

/// Placement category for one item.
pub fn classify(item: &SelectedItem) -> PlacementCategory {
    PLACEMENT_RULES
        .iter()
        .find(|rule| (rule.matches)(item))
        .map_or(PlacementCategory::Regular, |rule| rule.category)
}

/// Resolve one item against the module library and the domain's web root.
pub fn plan_item(item: &SelectedItem, source_root: &str, domain_root: &str) -> TransferPlanItem {
    let category = classify(item);
    let domain_root = remote_path::trim_trailing_slash(domain_root);

    let destination = match category {
        PlacementCategory::MainPanel => domain_root.to_string(),
        PlacementCategory::PlexWebview => {
            let dir = if item.kind == ItemKind::ModuleApi {
                WEBVIEW_API_DIR
            } else {
                WEBVIEW_PANEL_DIR
            };
            remote_path::join(domain_root, dir)
        }
        PlacementCategory::Regular => remote_path::join(domain_root, &item.source_path),
    };

    TransferPlanItem {
        key: item.key.clone(),
        display_name: item.display_name.clone(),
        kind: item.kind,
        category,
        source_absolute_path: remote_path::join(source_root, &item.source_path),
        destination_absolute_path: destination,
        is_directory: true,
    }
}

/// Resolve every item, preserving input order.
pub fn plan_transfer<'a>(
    items: impl IntoIterator<Item = &'a SelectedItem>,
    source_root: &str,
    domain_root: &str,
) -> Vec<TransferPlanItem> {
    items
        .into_iter()
        .map(|item| plan_item(item, source_root, domain_root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MAIN_PANEL_KEY, ModuleRegistry};

    const LIBRARY: &str = "/opt/modules";
    const ROOT: &str = "/home/demo/public_html";

    fn items(key: &str) -> Vec<SelectedItem> {
        ModuleRegistry::builtin().selected_items(key, None).unwrap()
    }

    #[test]
    fn main_panel_lands_in_web_root_itself() {
        let plan = plan_transfer(&items(MAIN_PANEL_KEY), LIBRARY, ROOT);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].category, PlacementCategory::MainPanel);
        assert_eq!(plan[0].destination_absolute_path, ROOT);
        assert_eq!(plan[0].source_absolute_path, "/opt/modules/cockpit");
    }

    #[test]
    fn main_panel_flag_beats_plex_name() {
        let item = SelectedItem {
            key: "plex-cockpit".into(),
            kind: ItemKind::Panel,
            display_name: "Plex Cockpit".into(),
            source_path: "plex_cockpit".into(),
            is_main_panel_placement: true,
        };
        assert_eq!(classify(&item), PlacementCategory::MainPanel);
    }

    #[test]
    fn plex_webview_maps_to_regular_webview_dirs() {
        let plan = plan_transfer(&items("webview-plex"), LIBRARY, ROOT);
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.category == PlacementCategory::PlexWebview));
        assert!(plan[0].destination_absolute_path.ends_with("/api/webview"));
        assert!(plan[1].destination_absolute_path.ends_with("/panel/webview"));
        assert_eq!(
            plan[0].source_absolute_path,
            "/opt/modules/api/webview_plex"
        );
    }

    #[test]
    fn plex_detection_is_case_insensitive_on_path() {
        let item = SelectedItem {
            key: "webview2".into(),
            kind: ItemKind::ModulePanel,
            display_name: "WebView 2".into(),
            source_path: "panel/WebView_PLEX".into(),
            is_main_panel_placement: false,
        };
        assert_eq!(classify(&item), PlacementCategory::PlexWebview);
    }

    #[test]
    fn names_that_only_contain_plex_letters_are_regular() {
        let plan = plan_transfer(&items("duplex"), LIBRARY, ROOT);
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.category == PlacementCategory::Regular));
        assert_eq!(plan[0].destination_absolute_path, format!("{ROOT}/api/duplex"));
        assert_eq!(plan[1].destination_absolute_path, format!("{ROOT}/panel/duplex"));
    }

    #[test]
    fn regular_items_preserve_relative_path() {
        let registry = ModuleRegistry::builtin();
        for module in registry.all() {
            if module.key == MAIN_PANEL_KEY || module.key == "webview-plex" {
                continue;
            }
            for item in registry.selected_items(module.key, None).unwrap() {
                assert_eq!(
                    classify(&item),
                    PlacementCategory::Regular,
                    "{} should be regular",
                    item.key
                );
                let planned = plan_item(&item, LIBRARY, ROOT);
                assert_eq!(
                    planned.destination_absolute_path,
                    format!("{ROOT}/{}", item.source_path)
                );
            }
        }
    }

    #[test]
    fn planning_is_idempotent() {
        let selection: Vec<_> = ["xciptv", "branding", MAIN_PANEL_KEY, "webview-plex"]
            .iter()
            .flat_map(|k| items(k))
            .collect();
        assert_eq!(
            plan_transfer(&selection, LIBRARY, ROOT),
            plan_transfer(&selection, LIBRARY, ROOT)
        );
    }

    #[test]
    fn trailing_slash_on_root_is_normalized() {
        let plan = plan_transfer(&items("tivimate"), LIBRARY, "/home/demo/public_html/");
        assert_eq!(
            plan[0].destination_absolute_path,
            "/home/demo/public_html/api/tivimate"
        );
    }
}
