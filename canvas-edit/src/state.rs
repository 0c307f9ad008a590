//! Application state threaded through the engine.
//!
//! Every transition returns a new [`AppState`]; nothing is mutated in
//! place. Document and selection storage is shared copy-on-write, so a
//! pointer-move update that only swaps the transform costs O(1) to clone.

use std::sync::Arc;

use canvas_core::{Document, ElementId, Selection};

use crate::context::EditContext;
use crate::operation::OperationId;
use crate::overlay::SelectionOverlayState;
use crate::snap::SnapGuide;
use crate::transform::EditTransform;

/// An in-flight edit session.
#[derive(Debug, Clone)]
pub struct EditSession {
    /// Operation driving the session.
    pub operation: OperationId,
    /// Start-of-session snapshot.
    pub context: Arc<EditContext>,
    /// Latest transform.
    pub transform: EditTransform,
    /// Snap guides produced by the latest update.
    pub guides: Vec<SnapGuide>,
}

/// What the user is doing right now.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    /// No session.
    #[default]
    Idle,
    /// A session is active; the document is not written until it ends.
    Editing(EditSession),
}

/// The complete editable state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Persistent elements.
    pub document: Document,
    /// Selected element IDs.
    pub selection: Selection,
    /// Multi-select overlay.
    pub overlay: SelectionOverlayState,
    /// Current interaction.
    pub interaction: InteractionState,
}

impl AppState {
    /// Idle state over `document` with nothing selected.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Replace the selection and re-sync the overlay.
    #[must_use]
    pub fn with_selection(&self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut selection = self.selection.clone();
        selection.set(ids);
        let overlay = self.overlay.synced(&self.document, &selection);
        Self {
            selection,
            overlay,
            ..self.clone()
        }
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        match &self.interaction {
            InteractionState::Editing(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.session().is_some()
    }

    /// The same state with the interaction reset to idle.
    #[must_use]
    pub fn to_idle(&self) -> Self {
        Self {
            interaction: InteractionState::Idle,
            ..self.clone()
        }
    }
}
