//! Edit intents delivered by the input layer.
//!
//! Raw pointer and keyboard events are resolved upstream; the engine only
//! sees these already-interpreted actions.

use canvas_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::operation::{OperationId, ResizeHandle};

/// Live modifier state for a pointer update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct EditModifiers {
    /// Keep the selection's aspect ratio while resizing.
    pub lock_aspect_ratio: bool,
    /// Resize symmetrically about the selection center.
    pub from_center: bool,
    /// Round rotation to the configured step.
    pub snap_angle: bool,
    /// Swap grid and object snapping for this update.
    pub invert_snap: bool,
}

/// Sub-mode of a free-transform session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreeTransformMode {
    /// Translate the selection.
    #[default]
    Move,
    /// Scale the selection from the session's handle.
    Resize,
    /// Rotate the selection about its center.
    Rotate,
}

/// A pointer sample during a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Pointer position in world coordinates.
    pub position: Point,
    /// Modifier state at this sample.
    #[serde(default)]
    pub modifiers: EditModifiers,
    /// Free-transform sub-mode; ignored by the other operations.
    #[serde(default)]
    pub mode: Option<FreeTransformMode>,
}

impl PointerInput {
    /// A sample at `position` with no modifiers.
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self {
            position,
            modifiers: EditModifiers::default(),
            mode: None,
        }
    }

    /// Set the modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: EditModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the free-transform sub-mode.
    #[must_use]
    pub fn with_mode(mut self, mode: FreeTransformMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Operation-specific start parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EditParams {
    /// Use these bounds instead of computing the selection bounds.
    pub bounds_override: Option<Rect>,
    /// Handle grabbed for a resize (required) or free transform.
    pub handle: Option<ResizeHandle>,
    /// Initial free-transform sub-mode.
    pub mode: Option<FreeTransformMode>,
}

impl EditParams {
    /// Parameters for a resize from `handle`.
    #[must_use]
    pub fn handle(handle: ResizeHandle) -> Self {
        Self {
            handle: Some(handle),
            ..Self::default()
        }
    }
}

/// An action consumed by [`crate::EditEngine::dispatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditAction {
    /// Begin a session.
    StartEdit {
        /// Operation to run.
        operation: OperationId,
        /// World point where the pointer went down.
        position: Point,
        /// Operation-specific parameters.
        #[serde(default)]
        params: EditParams,
    },

    /// Feed a pointer sample to the active session.
    UpdateEdit(PointerInput),

    /// Commit the active session.
    FinishEdit,

    /// Abandon the active session.
    CancelEdit,
}
