//! Start-of-session snapshots.
//!
//! An [`EditContext`] is built once when a session starts and is read-only
//! afterwards. Every update, preview and commit derives geometry from it,
//! never from the live document.

use std::collections::{BTreeSet, HashMap};

use canvas_core::{Element, ElementId, Point, Rect};

use crate::action::FreeTransformMode;
use crate::error::{EditError, EditResult};
use crate::operation::{OperationId, ResizeFrame, RotateSetup};

/// Pre-session geometry of one selected element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSnapshot {
    /// Unrotated bounds.
    pub bounds: Rect,
    /// Rotation in radians.
    pub rotation: f64,
    /// Rotation pivot (bounds center).
    pub center: Point,
}

impl From<&Element> for ElementSnapshot {
    fn from(element: &Element) -> Self {
        Self {
            bounds: element.bounds,
            rotation: element.rotation,
            center: element.center(),
        }
    }
}

/// State shared by every operation's context.
#[derive(Debug, Clone)]
pub struct SessionBase {
    /// World point where the session began.
    pub start_position: Point,
    /// Selection bounds at session start, in the selection's unrotated frame.
    pub start_bounds: Rect,
    /// Rotation of the selection frame (single element or overlay).
    pub selection_rotation: f64,
    /// Selected IDs frozen at session start.
    pub selected_ids: BTreeSet<ElementId>,
    /// Selection version captured at session start.
    pub selection_version: u64,
    /// Document version captured at session start.
    pub elements_version: u64,
    /// Geometry of every selected element at session start.
    pub snapshots: HashMap<ElementId, ElementSnapshot>,
}

impl SessionBase {
    /// Whether more than one element takes part in the session.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.snapshots.len() > 1
    }
}

/// Context of a move session.
#[derive(Debug, Clone)]
pub struct MoveContext {
    /// Shared session state.
    pub base: SessionBase,
}

/// Context of a resize session.
#[derive(Debug, Clone)]
pub struct ResizeContext {
    /// Shared session state.
    pub base: SessionBase,
    /// Handle, frame and anchor geometry fixed for the session.
    pub frame: ResizeFrame,
}

/// Context of a rotate session.
#[derive(Debug, Clone)]
pub struct RotateContext {
    /// Shared session state.
    pub base: SessionBase,
    /// Pivot and start angle.
    pub setup: RotateSetup,
}

/// Context of a free-transform session.
#[derive(Debug, Clone)]
pub struct FreeTransformContext {
    /// Shared session state.
    pub base: SessionBase,
    /// Resize geometry used by the resize sub-mode.
    pub resize: ResizeFrame,
    /// Rotation geometry used by the rotate sub-mode.
    pub rotate: RotateSetup,
    /// Sub-mode used when an update names none.
    pub default_mode: FreeTransformMode,
}

/// Immutable per-session context, one variant per operation.
#[derive(Debug, Clone)]
pub enum EditContext {
    /// Move session.
    Move(MoveContext),
    /// Resize session.
    Resize(ResizeContext),
    /// Rotate session.
    Rotate(RotateContext),
    /// Free-transform session.
    FreeTransform(FreeTransformContext),
}

impl EditContext {
    /// The operation this context belongs to.
    #[must_use]
    pub const fn operation_id(&self) -> OperationId {
        match self {
            Self::Move(_) => OperationId::Move,
            Self::Resize(_) => OperationId::Resize,
            Self::Rotate(_) => OperationId::Rotate,
            Self::FreeTransform(_) => OperationId::FreeTransform,
        }
    }

    /// Shared session state.
    #[must_use]
    pub const fn base(&self) -> &SessionBase {
        match self {
            Self::Move(ctx) => &ctx.base,
            Self::Resize(ctx) => &ctx.base,
            Self::Rotate(ctx) => &ctx.base,
            Self::FreeTransform(ctx) => &ctx.base,
        }
    }

    fn mismatch(&self, operation: OperationId) -> EditError {
        EditError::ContextMismatch {
            operation,
            found: self.operation_id(),
        }
    }

    /// Downcast to a move context.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ContextMismatch`] for any other variant.
    pub fn as_move(&self) -> EditResult<&MoveContext> {
        match self {
            Self::Move(ctx) => Ok(ctx),
            other => Err(other.mismatch(OperationId::Move)),
        }
    }

    /// Downcast to a resize context.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ContextMismatch`] for any other variant.
    pub fn as_resize(&self) -> EditResult<&ResizeContext> {
        match self {
            Self::Resize(ctx) => Ok(ctx),
            other => Err(other.mismatch(OperationId::Resize)),
        }
    }

    /// Downcast to a rotate context.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ContextMismatch`] for any other variant.
    pub fn as_rotate(&self) -> EditResult<&RotateContext> {
        match self {
            Self::Rotate(ctx) => Ok(ctx),
            other => Err(other.mismatch(OperationId::Rotate)),
        }
    }

    /// Downcast to a free-transform context.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ContextMismatch`] for any other variant.
    pub fn as_free_transform(&self) -> EditResult<&FreeTransformContext> {
        match self {
            Self::FreeTransform(ctx) => Ok(ctx),
            other => Err(other.mismatch(OperationId::FreeTransform)),
        }
    }
}
