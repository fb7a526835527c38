//! Spell catalog filtering.

use std::sync::Arc;

use datlens_store::records::{MagicSchool, SpellBase, SpellTable};

/// Predicate over the spell catalog. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterState {
    /// Case-insensitive substring of the spell name.
    pub name_substring: String,
    pub school: Option<MagicSchool>,
    /// Component id the spell must use.
    pub component: Option<u32>,
}

impl FilterState {
    pub fn name(substring: impl Into<String>) -> Self {
        Self {
            name_substring: substring.into(),
            ..Self::default()
        }
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.name_substring.trim().is_empty() && self.school.is_none() && self.component.is_none()
    }

    fn matcher(&self) -> impl Fn(&SpellBase) -> bool + '_ {
        let needle = self.name_substring.trim().to_lowercase();
        move |spell: &SpellBase| {
            (needle.is_empty() || spell.name.to_lowercase().contains(&needle))
                && self.school.map_or(true, |school| spell.school == school)
                && self.component.map_or(true, |c| spell.components.contains(&c))
        }
    }
}

/// One row of a filtered projection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilteredItem {
    pub key: u32,
    /// `"{key}: {name}"`
    pub label: String,
    pub spell: SpellBase,
}

/// A filtered, key-ordered projection of the active catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilteredResult {
    pub items: Vec<FilteredItem>,
    pub status_message: String,
    pub is_empty: bool,
    /// False when no catalog is active.
    pub applicable: bool,
    /// Size of the unfiltered catalog.
    pub total: usize,
}

impl FilteredResult {
    fn not_applicable() -> Self {
        Self {
            items: Vec::new(),
            status_message: "Filtering is not available for this selection".to_string(),
            is_empty: true,
            applicable: false,
            total: 0,
        }
    }
}

/// Stateful filter over the currently active spell catalog.
///
/// The catalog is shared, never modified; every call recomputes from the
/// full source.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    active: Option<Arc<SpellTable>>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the catalog to filter.
    pub fn set_active_collection(&mut self, collection: Option<Arc<SpellTable>>) {
        self.active = collection;
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active_collection(&self) -> Option<&Arc<SpellTable>> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Project the active catalog through `state`.
    ///
    /// Without an active catalog the result is empty and not applicable.
    pub fn apply_filter(&self, state: &FilterState) -> FilteredResult {
        let Some(table) = &self.active else {
            return FilteredResult::not_applicable();
        };

        let total = table.spells.len();
        let matches = state.matcher();
        let items: Vec<FilteredItem> = table
            .spells
            .iter()
            .filter(|(_, spell)| matches(*spell))
            .map(|(key, spell)| FilteredItem {
                key: *key,
                label: format!("{}: {}", key, spell.name),
                spell: spell.clone(),
            })
            .collect();

        let status_message = if state.is_empty() {
            format!("Listing all {} spells", total)
        } else {
            format!("Showing {} of {} spells matching", items.len(), total)
        };

        FilteredResult {
            is_empty: items.is_empty(),
            items,
            status_message,
            applicable: true,
            total,
        }
    }
}
