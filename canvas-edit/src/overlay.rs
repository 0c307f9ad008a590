//! Multi-select overlay bookkeeping.
//!
//! When more than one element is selected the selection is drawn as one
//! bounding box that can carry its own rotation. The overlay survives
//! across sessions while the selected IDs stay the same, is recomputed when
//! they change, and is updated in place when a session commits.

use std::collections::BTreeSet;

use canvas_core::{Document, ElementId, Point, Rect, Selection};
use serde::{Deserialize, Serialize};

use crate::operation::EditComputedResult;

/// Bounding overlay of a multi-selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSelectOverlay {
    /// Bounds in the overlay's unrotated frame.
    pub bounds: Rect,
    /// Overlay rotation in radians about the bounds center.
    pub rotation: f64,
    /// Selected IDs the overlay was computed for.
    pub element_ids: BTreeSet<ElementId>,
}

/// Persisted overlay state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionOverlayState {
    /// The overlay, present only for multi-selections.
    pub multi_select_overlay: Option<MultiSelectOverlay>,
}

impl SelectionOverlayState {
    /// A fresh overlay for `selection`: unrotated, tight around the
    /// elements' rotated bounds.
    #[must_use]
    pub fn for_selection(document: &Document, selection: &Selection) -> Self {
        if selection.len() < 2 {
            return Self::default();
        }
        let bounds = selection
            .iter()
            .filter_map(|id| document.get_element(*id))
            .map(canvas_core::Element::rotated_aabb)
            .reduce(|a, b| a.union(&b));
        Self {
            multi_select_overlay: bounds.map(|bounds| MultiSelectOverlay {
                bounds,
                rotation: 0.0,
                element_ids: selection.ids().clone(),
            }),
        }
    }

    /// Keep the overlay if it still describes `selection`, else recompute.
    #[must_use]
    pub fn synced(&self, document: &Document, selection: &Selection) -> Self {
        let unchanged_single = selection.len() < 2 && self.multi_select_overlay.is_none();
        if unchanged_single || self.overlay_for(selection).is_some() {
            return self.clone();
        }
        tracing::debug!(selected = selection.len(), "selection changed, recomputing overlay");
        Self::for_selection(document, selection)
    }

    /// The overlay, only if it was computed for exactly these IDs.
    #[must_use]
    pub fn overlay_for(&self, selection: &Selection) -> Option<&MultiSelectOverlay> {
        self.multi_select_overlay
            .as_ref()
            .filter(|o| o.element_ids == *selection.ids())
    }

    /// Apply a committed result's overlay geometry.
    #[must_use]
    pub fn after_commit(&self, selection: &Selection, result: &EditComputedResult) -> Self {
        let Some(bounds) = result.multi_select_bounds else {
            return self.clone();
        };
        let existing = self.overlay_for(selection);
        let rotation = result
            .multi_select_rotation
            .or_else(|| existing.map(|o| o.rotation))
            .unwrap_or(0.0);
        Self {
            multi_select_overlay: Some(MultiSelectOverlay {
                bounds,
                rotation,
                element_ids: selection.ids().clone(),
            }),
        }
    }
}

/// Resolved selection frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionGeometry {
    /// Bounds in the selection's unrotated frame.
    pub bounds: Rect,
    /// Center of the bounds.
    pub center: Point,
    /// Rotation of the frame.
    pub rotation: f64,
}

/// Bounds, center and rotation of the current selection.
///
/// A single element uses its own rectangle and rotation. Several elements
/// use the persisted overlay when it matches the selection, else the union
/// of their rotated bounds with no rotation. Returns `None` when no selected
/// element exists in the document.
#[must_use]
pub fn selection_geometry(
    document: &Document,
    selection: &Selection,
    overlay: &SelectionOverlayState,
) -> Option<SelectionGeometry> {
    let mut present = selection.iter().filter_map(|id| document.get_element(*id));
    let first = present.next()?;
    let Some(second) = present.next() else {
        return Some(SelectionGeometry {
            bounds: first.bounds,
            center: first.center(),
            rotation: first.rotation,
        });
    };
    if let Some(o) = overlay.overlay_for(selection) {
        return Some(SelectionGeometry {
            bounds: o.bounds,
            center: o.bounds.center(),
            rotation: o.rotation,
        });
    }
    let bounds = present.fold(first.rotated_aabb().union(&second.rotated_aabb()), |acc, e| {
        acc.union(&e.rotated_aabb())
    });
    Some(SelectionGeometry {
        bounds,
        center: bounds.center(),
        rotation: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{Element, ElementKind};
    use std::collections::HashMap;

    fn doc_with_two() -> (Document, Element, Element) {
        let a = Element::new(ElementKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Element::new(ElementKind::Ellipse, Rect::new(40.0, 20.0, 60.0, 50.0));
        (Document::from_elements([a.clone(), b.clone()]), a, b)
    }

    #[test]
    fn test_overlay_only_for_multi_select() {
        let (doc, a, b) = doc_with_two();
        assert!(SelectionOverlayState::for_selection(&doc, &Selection::of([a.id]))
            .multi_select_overlay
            .is_none());
        let state = SelectionOverlayState::for_selection(&doc, &Selection::of([a.id, b.id]));
        let overlay = state.multi_select_overlay.expect("overlay");
        assert_eq!(overlay.bounds, Rect::new(0.0, 0.0, 60.0, 50.0));
        assert_eq!(overlay.rotation, 0.0);
    }

    #[test]
    fn test_synced_keeps_overlay_for_same_ids() {
        let (doc, a, b) = doc_with_two();
        let selection = Selection::of([a.id, b.id]);
        let mut state = SelectionOverlayState::for_selection(&doc, &selection);
        if let Some(o) = state.multi_select_overlay.as_mut() {
            o.rotation = 0.3;
        }
        assert_eq!(state.synced(&doc, &selection), state);

        let cleared = state.synced(&doc, &Selection::of([a.id]));
        assert!(cleared.multi_select_overlay.is_none());
    }

    #[test]
    fn test_after_commit_updates_bounds_and_rotation() {
        let (doc, a, b) = doc_with_two();
        let selection = Selection::of([a.id, b.id]);
        let state = SelectionOverlayState::for_selection(&doc, &selection);
        let result = EditComputedResult {
            updated_elements: HashMap::new(),
            multi_select_bounds: Some(Rect::new(5.0, 5.0, 65.0, 55.0)),
            multi_select_rotation: Some(1.0),
        };
        let next = state.after_commit(&selection, &result);
        let overlay = next.multi_select_overlay.expect("overlay");
        assert_eq!(overlay.bounds, Rect::new(5.0, 5.0, 65.0, 55.0));
        assert_eq!(overlay.rotation, 1.0);
    }

    #[test]
    fn test_selection_geometry_single_uses_element_frame() {
        let (doc, a, _) = doc_with_two();
        let overlay = SelectionOverlayState::default();
        let geometry =
            selection_geometry(&doc, &Selection::of([a.id]), &overlay).expect("geometry");
        assert_eq!(geometry.bounds, a.bounds);
        assert_eq!(geometry.rotation, 0.0);
    }

    #[test]
    fn test_selection_geometry_empty() {
        let (doc, _, _) = doc_with_two();
        let overlay = SelectionOverlayState::default();
        assert!(selection_geometry(&doc, &Selection::new(), &overlay).is_none());
    }
}
