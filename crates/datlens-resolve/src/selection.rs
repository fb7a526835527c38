//! Per-selection state passed into each resolution.

use std::sync::Arc;

use crate::filter::{FilterEngine, FilterState, FilteredResult};
use crate::identifier::NavigationId;
use crate::lookup::LookupContext;
use crate::resolver::Resolution;

/// What the user currently has selected, and the state derived from it.
///
/// The filter only has an active collection while the selection is the
/// spell catalog; any other selection clears it.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    selection: Option<NavigationId>,
    filter: FilterEngine,
    filter_state: FilterState,
    lookups: Arc<LookupContext>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a successful resolution the current selection.
    pub fn apply(&mut self, resolution: &Resolution) {
        self.selection = Some(resolution.target.clone());
        self.lookups = resolution.lookups.clone();
        if resolution.filterable {
            self.filter.set_active_collection(resolution.catalog.clone());
        } else {
            self.filter.clear();
        }
    }

    /// Record that `target` was selected but could not be resolved.
    pub fn fail(&mut self, target: &NavigationId) {
        self.selection = Some(target.clone());
        self.lookups = Arc::default();
        self.filter.clear();
    }

    /// Forget the selection entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace the predicate and project the active collection through it.
    pub fn apply_filter(&mut self, state: FilterState) -> FilteredResult {
        self.filter_state = state;
        self.filter.apply_filter(&self.filter_state)
    }

    /// Re-project with the current predicate.
    pub fn refilter(&self) -> FilteredResult {
        self.filter.apply_filter(&self.filter_state)
    }

    pub fn selection(&self) -> Option<&NavigationId> {
        self.selection.as_ref()
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.is_active()
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    /// Lookup tables built for the current selection.
    pub fn lookups(&self) -> &LookupContext {
        &self.lookups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::family;
    use crate::identifier::SessionId;
    use crate::resolver::ResolvedContent;
    use datlens_store::records::SpellTable;

    fn resolution(filterable: bool) -> Resolution {
        Resolution {
            target: NavigationId::family(family::SPELL_TABLE, SessionId::new("portal-1")),
            content: ResolvedContent::Rows { rows: Vec::new() },
            filterable,
            catalog: filterable.then(|| Arc::new(SpellTable::default())),
            lookups: Arc::default(),
        }
    }

    #[test]
    fn test_leaving_catalog_clears_filter() {
        let mut context = SelectionContext::new();
        context.apply(&resolution(true));
        assert!(context.is_filterable());
        assert!(context.apply_filter(FilterState::name("bolt")).applicable);

        context.apply(&resolution(false));
        assert!(!context.is_filterable());
        assert!(!context.refilter().applicable);
        assert_eq!(context.filter_state().name_substring, "bolt");
    }

    #[test]
    fn test_failure_clears_filter() {
        let mut context = SelectionContext::new();
        context.apply(&resolution(true));

        let target = NavigationId::family(family::GFX_OBJ, SessionId::new("portal-2"));
        context.fail(&target);
        assert_eq!(context.selection(), Some(&target));
        assert!(!context.is_filterable());
    }
}
