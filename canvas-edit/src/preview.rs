//! Effective geometry during a session.
//!
//! Rendering and hit-testing read through here while a session is active,
//! and straight from the document otherwise.

use std::collections::HashMap;

use canvas_core::{Element, ElementId, Rect};

use crate::context::SessionBase;
use crate::operation::EditComputedResult;
use crate::state::AppState;

/// Outline of the selection while editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPreview {
    /// Bounds in the selection's unrotated frame.
    pub bounds: Rect,
    /// Rotation of the outline.
    pub rotation: f64,
}

/// Uncommitted geometry for the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditPreview {
    /// Replacement elements, by ID.
    pub elements: HashMap<ElementId, Element>,
    /// Selection outline, if the session changes it.
    pub selection: Option<SelectionPreview>,
}

impl EditPreview {
    /// Build a preview from the same result a commit would apply.
    #[must_use]
    pub fn from_result(result: EditComputedResult, base: &SessionBase) -> Self {
        let selection = match result.multi_select_bounds {
            Some(bounds) => Some(SelectionPreview {
                bounds,
                rotation: result
                    .multi_select_rotation
                    .unwrap_or(base.selection_rotation),
            }),
            None => {
                let mut selected = base
                    .selected_ids
                    .iter()
                    .filter_map(|id| result.updated_elements.get(id));
                match (selected.next(), selected.next()) {
                    (Some(only), None) => Some(SelectionPreview {
                        bounds: only.bounds,
                        rotation: only.rotation,
                    }),
                    _ => None,
                }
            }
        };
        Self {
            elements: result.updated_elements,
            selection,
        }
    }

    /// Whether the preview changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.selection.is_none()
    }

    /// The element as it should be drawn: preview first, then document.
    #[must_use]
    pub fn effective_element<'a>(
        &'a self,
        state: &'a AppState,
        id: ElementId,
    ) -> Option<&'a Element> {
        self.elements
            .get(&id)
            .or_else(|| state.document.get_element(id))
    }

    /// Every document element as it should be drawn, in document order.
    pub fn effective_elements<'a>(
        &'a self,
        state: &'a AppState,
    ) -> impl Iterator<Item = &'a Element> {
        state
            .document
            .elements()
            .map(|e| self.elements.get(&e.id).unwrap_or(e))
    }
}
