//! Versioned selection set.
//!
//! `Selection` wraps an `Arc<BTreeSet<ElementId>>` so it can be cheaply
//! cloned into snapshots. The version counter moves on every real change,
//! which lets an in-flight edit notice that its selection went stale.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ElementId;

/// A set of selected element IDs plus a change counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Arc<BTreeSet<ElementId>>,
    version: u64,
}

impl Selection {
    /// Create a new empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selection holding `ids`.
    #[must_use]
    pub fn of(ids: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            ids: Arc::new(ids.into_iter().collect()),
            version: 0,
        }
    }

    /// Current change counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// The selected IDs.
    #[must_use]
    pub fn ids(&self) -> &BTreeSet<ElementId> {
        &self.ids
    }

    /// Check if the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if an element is selected.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    /// Iterate over selected IDs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.ids.iter()
    }

    /// Replace the whole selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let next: BTreeSet<ElementId> = ids.into_iter().collect();
        if next != *self.ids {
            self.ids = Arc::new(next);
            self.version += 1;
        }
    }

    /// Add an element to the selection.
    pub fn insert(&mut self, id: ElementId) {
        if !self.ids.contains(&id) {
            Arc::make_mut(&mut self.ids).insert(id);
            self.version += 1;
        }
    }

    /// Remove an element from the selection.
    pub fn remove(&mut self, id: &ElementId) {
        if self.ids.contains(id) {
            Arc::make_mut(&mut self.ids).remove(id);
            self.version += 1;
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        if !self.ids.is_empty() {
            self.ids = Arc::new(BTreeSet::new());
            self.version += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_selection_is_empty() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
        assert_eq!(sel.version(), 0);
    }

    #[test]
    fn test_insert_duplicate_keeps_version() {
        let mut sel = Selection::new();
        let id = ElementId::new();
        sel.insert(id);
        sel.insert(id);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.version(), 1);
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let mut sel = Selection::new();
        sel.remove(&ElementId::new());
        assert!(sel.is_empty());
        assert_eq!(sel.version(), 0);
    }

    #[test]
    fn test_set_same_ids_keeps_version() {
        let a = ElementId::new();
        let b = ElementId::new();
        let mut sel = Selection::new();
        sel.set([a, b]);
        assert_eq!(sel.version(), 1);
        sel.set([b, a]);
        assert_eq!(sel.version(), 1);
        sel.clear();
        assert_eq!(sel.version(), 2);
    }
}
