//! Module path registry
//!
//! Static table of every known module: where its files live in the module
//! library, how it is displayed, and the version currently shipped. Lookups
//! never fail; unknown keys degrade to defaults so anything found on disk
//! can still be rendered.

mod catalog;

use std::collections::HashMap;

pub use catalog::{BUILTIN_MODULES, MAIN_PANEL_KEY};

use crate::error::{CoreError, CoreResult};
use crate::types::{ItemKind, ModuleDescriptor, ModulePart, ModulePaths, SelectedItem};
use crate::utils::version::is_update_available;

/// Icon used for keys the registry does not know.
pub const DEFAULT_MODULE_ICON: &str = "module";

/// Version reported for keys the registry does not know.
pub const DEFAULT_MODULE_VERSION: &str = "1.0.0";

/// Read-only module lookup table.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    by_key: HashMap<&'static str, usize>,
}

impl ModuleRegistry {
    /// Registry over the built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::index(BUILTIN_MODULES.to_vec())
    }

    /// Registry over a custom table.
    ///
    /// Keys must be lowercase and unique.
    pub fn from_descriptors(modules: Vec<ModuleDescriptor>) -> CoreResult<Self> {
        let mut seen = HashMap::new();
        for module in &modules {
            if module.key != module.key.to_ascii_lowercase() {
                return Err(CoreError::ValidationError(format!(
                    "Module key '{}' must be lowercase",
                    module.key
                )));
            }
            if seen.insert(module.key, ()).is_some() {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate module key '{}'",
                    module.key
                )));
            }
        }
        Ok(Self::index(modules))
    }

    fn index(modules: Vec<ModuleDescriptor>) -> Self {
        let by_key = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key, i))
            .collect();
        Self { modules, by_key }
    }

    /// Look up a descriptor by key (case-insensitive).
    pub fn resolve(&self, key: &str) -> Option<&ModuleDescriptor> {
        let key = key.trim().to_ascii_lowercase();
        self.by_key.get(key.as_str()).map(|&i| &self.modules[i])
    }

    pub fn all(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Reverse lookup by display name (case-insensitive).
    pub fn find_by_display_name(&self, display_name: &str) -> Option<&ModuleDescriptor> {
        let wanted = display_name.trim();
        self.modules
            .iter()
            .find(|m| m.display_name.eq_ignore_ascii_case(wanted))
    }

    pub fn main_panel(&self) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.web_root_placement)
    }

    /// Display name, or the raw key when unknown.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.resolve(key).map_or(key, |m| m.display_name)
    }

    pub fn icon(&self, key: &str) -> &str {
        self.resolve(key).map_or(DEFAULT_MODULE_ICON, |m| m.icon)
    }

    pub fn version(&self, key: &str) -> &str {
        self.resolve(key).map_or(DEFAULT_MODULE_VERSION, |m| m.version)
    }

    /// Whether the library ships a newer version than `installed`.
    ///
    /// Unknown keys never have updates.
    pub fn has_update(&self, key: &str, installed: &str) -> bool {
        self.resolve(key)
            .is_some_and(|m| is_update_available(installed, m.version))
    }

    /// Transfer units for a module.
    ///
    /// A split module yields both halves unless `part` picks one; a combined
    /// entry yields a single panel item and rejects `part`.
    pub fn selected_items(
        &self,
        key: &str,
        part: Option<ModulePart>,
    ) -> CoreResult<Vec<SelectedItem>> {
        let module = self
            .resolve(key)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown module '{key}'")))?;

        let item = |kind: ItemKind, source_path: &str| SelectedItem {
            key: module.key.to_string(),
            kind,
            display_name: module.display_name.to_string(),
            source_path: source_path.to_string(),
            is_main_panel_placement: module.web_root_placement,
        };

        match (module.paths, part) {
            (ModulePaths::Combined { source_path }, None) => {
                Ok(vec![item(ItemKind::Panel, source_path)])
            }
            (ModulePaths::Combined { .. }, Some(part)) => Err(CoreError::ValidationError(
                format!("Module '{}' has no separate {} part", module.key, part.as_str()),
            )),
            (ModulePaths::Split { api, panel }, None) => Ok(vec![
                item(ItemKind::ModuleApi, api),
                item(ItemKind::ModulePanel, panel),
            ]),
            (ModulePaths::Split { api, .. }, Some(ModulePart::Api)) => {
                Ok(vec![item(ItemKind::ModuleApi, api)])
            }
            (ModulePaths::Split { panel, .. }, Some(ModulePart::Panel)) => {
                Ok(vec![item(ItemKind::ModulePanel, panel)])
            }
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let registry = ModuleRegistry::from_descriptors(BUILTIN_MODULES.to_vec()).unwrap();
        assert_eq!(registry.all().len(), BUILTIN_MODULES.len());
        assert_eq!(
            registry.main_panel().map(|m| m.key),
            Some(MAIN_PANEL_KEY)
        );
        assert_eq!(
            BUILTIN_MODULES.iter().filter(|m| m.web_root_placement).count(),
            1
        );
    }

    #[test]
    fn every_key_round_trips() {
        let registry = ModuleRegistry::builtin();
        for module in registry.all() {
            let resolved = registry.resolve(module.key).unwrap();
            assert_eq!(resolved, module);
            assert_eq!(registry.display_name(module.key), module.display_name);
            assert_eq!(registry.version(module.key), module.version);
            assert_eq!(registry.icon(module.key), module.icon);
            assert_eq!(
                registry.find_by_display_name(module.display_name).map(|m| m.key),
                Some(module.key)
            );
        }
    }

    #[test]
    fn unknown_key_degrades_to_defaults() {
        let registry = ModuleRegistry::builtin();
        assert!(registry.resolve("brand-new-app").is_none());
        assert_eq!(registry.display_name("brand-new-app"), "brand-new-app");
        assert_eq!(registry.icon("brand-new-app"), DEFAULT_MODULE_ICON);
        assert_eq!(registry.version("brand-new-app"), DEFAULT_MODULE_VERSION);
        assert!(!registry.has_update("brand-new-app", "0.0.1"));
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let registry = ModuleRegistry::builtin();
        assert_eq!(registry.resolve("XCIPTV").map(|m| m.key), Some("xciptv"));
        assert_eq!(
            registry.find_by_display_name("tivimate").map(|m| m.key),
            Some("tivimate")
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let module = BUILTIN_MODULES[0];
        let err = ModuleRegistry::from_descriptors(vec![module, module]).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn split_module_selects_both_halves() {
        let registry = ModuleRegistry::builtin();
        let items = registry.selected_items("xciptv", None).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ItemKind::ModuleApi);
        assert_eq!(items[0].source_path, "api/xciptv");
        assert_eq!(items[1].kind, ItemKind::ModulePanel);
        assert_eq!(items[1].source_path, "panel/xciptv");

        let api_only = registry
            .selected_items("xciptv", Some(ModulePart::Api))
            .unwrap();
        assert_eq!(api_only.len(), 1);
    }

    #[test]
    fn main_panel_selects_single_web_root_item() {
        let registry = ModuleRegistry::builtin();
        let items = registry.selected_items(MAIN_PANEL_KEY, None).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_main_panel_placement);
        assert_eq!(items[0].kind, ItemKind::Panel);
        assert!(registry
            .selected_items(MAIN_PANEL_KEY, Some(ModulePart::Api))
            .is_err());
    }

    #[test]
    fn update_detection_uses_library_version() {
        let registry = ModuleRegistry::builtin();
        let current = registry.version("tivimate").to_string();
        assert!(!registry.has_update("tivimate", &current));
        assert!(registry.has_update("tivimate", "0.1.0"));
    }
}
