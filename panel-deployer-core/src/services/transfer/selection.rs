//! Set of items chosen for the next transfer

use crate::error::CoreResult;
use crate::registry::ModuleRegistry;
use crate::types::{ItemKind, ModulePart, SelectedItem};

/// Selected items keyed by `key:type`, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<SelectedItem>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one item; re-selecting the same `key:type` replaces it in place.
    pub fn insert(&mut self, item: SelectedItem) {
        let selection_key = item.selection_key();
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.selection_key() == selection_key)
        {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    /// Select a registry module (both halves unless `part` is given).
    ///
    /// Returns the number of items added or replaced.
    pub fn select(
        &mut self,
        registry: &ModuleRegistry,
        key: &str,
        part: Option<ModulePart>,
    ) -> CoreResult<usize> {
        let items = registry.selected_items(key, part)?;
        let count = items.len();
        for item in items {
            self.insert(item);
        }
        Ok(count)
    }

    /// Remove every item of `key`, or just one half.
    pub fn deselect(&mut self, key: &str, part: Option<ModulePart>) -> usize {
        let key = key.to_ascii_lowercase();
        let before = self.items.len();
        self.items.retain(|item| {
            let same_key = item.key == key;
            let same_part = match part {
                None => true,
                Some(ModulePart::Api) => item.kind == ItemKind::ModuleApi,
                Some(ModulePart::Panel) => item.kind == ItemKind::ModulePanel,
            };
            !(same_key && same_part)
        });
        before - self.items.len()
    }

    pub fn contains(&self, selection_key: &str) -> bool {
        self.items.iter().any(|i| i.selection_key() == selection_key)
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
