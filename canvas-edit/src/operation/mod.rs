//! The edit operation contract and its four implementations.
//!
//! The operation set is closed: [`OperationId`] names every kind and
//! [`operation_for`] maps each one to its implementation, so dispatch stays
//! exhaustively matchable.
//!
//! ```text
//! StartEdit ──▶ create_context ──▶ initial_transform
//! UpdateEdit ─▶ update ─────────▶ (transform, guides)
//!                 compute_result ◀── build_preview
//! FinishEdit ─▶ finish ─────────▶ commit + history
//! CancelEdit ─▶ cancel ─────────▶ idle, document untouched
//! ```

mod apply;
mod free_transform;
mod move_op;
mod resize;
mod rotate;

use std::collections::HashMap;
use std::fmt;

use canvas_core::{Document, Element, ElementId, Point, Rect, Selection};
use serde::{Deserialize, Serialize};

use crate::action::{EditParams, PointerInput};
use crate::binding::{BindingResolver, ElementView};
use crate::config::EditConfig;
use crate::context::{EditContext, ElementSnapshot, SessionBase};
use crate::error::{EditError, EditResult};
use crate::history::HistoryMetadata;
use crate::overlay::selection_geometry;
use crate::preview::EditPreview;
use crate::snap::{GridSnapper, ObjectSnapper, SnapGuide};
use crate::state::AppState;
use crate::transform::EditTransform;

pub use free_transform::FreeTransformOperation;
pub use move_op::MoveOperation;
pub use resize::{ResizeFrame, ResizeHandle, ResizeOperation, ResizeSetup};
pub use rotate::{RotateOperation, RotateSetup};

/// Stable identifier of an operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationId {
    /// Translate the selection.
    Move,
    /// Scale the selection from a handle.
    Resize,
    /// Rotate the selection about its center.
    Rotate,
    /// Combined move, resize and rotate.
    FreeTransform,
}

impl OperationId {
    /// Every operation, in registry order.
    pub const ALL: [Self; 4] = [Self::Move, Self::Resize, Self::Rotate, Self::FreeTransform];
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Rotate => "rotate",
            Self::FreeTransform => "free_transform",
        };
        f.write_str(name)
    }
}

static MOVE: MoveOperation = MoveOperation;
static RESIZE: ResizeOperation = ResizeOperation;
static ROTATE: RotateOperation = RotateOperation;
static FREE_TRANSFORM: FreeTransformOperation = FreeTransformOperation;

/// The implementation registered for `id`.
#[must_use]
pub fn operation_for(id: OperationId) -> &'static dyn EditOperation {
    match id {
        OperationId::Move => &MOVE,
        OperationId::Resize => &RESIZE,
        OperationId::Rotate => &ROTATE,
        OperationId::FreeTransform => &FREE_TRANSFORM,
    }
}

/// Services available to operations.
#[derive(Clone, Copy)]
pub struct EditEnv<'a> {
    /// Engine configuration.
    pub config: &'a EditConfig,
    /// Grid snapping service.
    pub grid: &'a dyn GridSnapper,
    /// Object snapping service.
    pub objects: &'a dyn ObjectSnapper,
    /// Bound-arrow resolver.
    pub bindings: &'a dyn BindingResolver,
}

impl fmt::Debug for EditEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Output of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// The next transform.
    pub transform: EditTransform,
    /// Guides to draw for this sample.
    pub guides: Vec<SnapGuide>,
}

impl UpdateOutcome {
    /// An outcome with no guides.
    #[must_use]
    pub fn bare(transform: EditTransform) -> Self {
        Self {
            transform,
            guides: Vec::new(),
        }
    }
}

/// Geometry produced by applying a transform to the start snapshot.
///
/// Shared by preview and commit so both always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct EditComputedResult {
    /// Replacement elements, including re-routed bound arrows.
    pub updated_elements: HashMap<ElementId, Element>,
    /// New overlay bounds, for multi-selections.
    pub multi_select_bounds: Option<Rect>,
    /// New overlay rotation, for multi-selections.
    pub multi_select_rotation: Option<f64>,
}

/// The contract every edit operation implements.
///
/// All methods are pure: they read their inputs and return new values.
pub trait EditOperation: Sync {
    /// This operation's identifier.
    fn id(&self) -> OperationId;

    /// Snapshot the selection and capture operation-specific setup.
    ///
    /// # Errors
    ///
    /// [`EditError::EmptySelection`] when nothing selected exists, or
    /// [`EditError::MissingParameter`] when a required parameter is absent.
    fn create_context(
        &self,
        state: &AppState,
        start_position: Point,
        params: &EditParams,
    ) -> EditResult<EditContext>;

    /// The zero transform for a fresh session.
    ///
    /// # Errors
    ///
    /// [`EditError::ContextMismatch`] for another operation's context.
    fn initial_transform(&self, context: &EditContext) -> EditResult<EditTransform>;

    /// Next transform for a pointer sample.
    ///
    /// # Errors
    ///
    /// Mismatch errors for another operation's context or transform.
    fn update(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        context: &EditContext,
        transform: &EditTransform,
        input: &PointerInput,
    ) -> EditResult<UpdateOutcome>;

    /// Geometry the transform produces, or `None` when nothing would change.
    ///
    /// # Errors
    ///
    /// Mismatch errors for another operation's context or transform.
    fn compute_result(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        selection: &Selection,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<Option<EditComputedResult>>;

    /// Undo description for a committed session.
    ///
    /// # Errors
    ///
    /// Mismatch errors for another operation's context or transform.
    fn history_metadata(
        &self,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<HistoryMetadata>;

    /// Commit the session and return to idle.
    ///
    /// Either the whole result is applied in one replacement pass or nothing
    /// changes; in the latter case no metadata is returned.
    ///
    /// # Errors
    ///
    /// Mismatch errors for another operation's context or transform.
    fn finish(
        &self,
        env: &EditEnv<'_>,
        state: &AppState,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<(AppState, Option<HistoryMetadata>)> {
        let idle = state.to_idle();
        let result =
            self.compute_result(env, &state.document, &state.selection, context, transform)?;
        let Some(result) = result else {
            tracing::debug!(operation = %self.id(), "finish without changes");
            return Ok((idle, None));
        };
        let metadata = self.history_metadata(context, transform)?;
        Ok((commit(idle, &result), Some(metadata)))
    }

    /// Abandon the session without touching the document.
    fn cancel(&self, state: &AppState, _context: &EditContext) -> AppState {
        state.to_idle()
    }

    /// Preview from the same computation `finish` applies.
    fn build_preview(
        &self,
        env: &EditEnv<'_>,
        state: &AppState,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditPreview {
        match self.compute_result(env, &state.document, &state.selection, context, transform) {
            Ok(Some(result)) => EditPreview::from_result(result, context.base()),
            Ok(None) => EditPreview::default(),
            Err(err) => {
                tracing::error!(operation = %self.id(), %err, "preview suppressed");
                EditPreview::default()
            }
        }
    }
}

fn commit(mut state: AppState, result: &EditComputedResult) -> AppState {
    let replaced = state
        .document
        .replace_elements(result.updated_elements.values().cloned());
    state.overlay = state.overlay.after_commit(&state.selection, result);
    tracing::debug!(replaced, version = state.document.version(), "edit committed");
    state
}

/// Snapshot the selection into a [`SessionBase`].
pub(crate) fn collect_base(
    state: &AppState,
    start_position: Point,
    params: &EditParams,
) -> EditResult<SessionBase> {
    let snapshots: HashMap<ElementId, ElementSnapshot> = state
        .selection
        .iter()
        .filter_map(|id| state.document.get_element(*id))
        .map(|e| (e.id, ElementSnapshot::from(e)))
        .collect();
    if snapshots.is_empty() {
        return Err(EditError::EmptySelection);
    }
    let geometry = selection_geometry(&state.document, &state.selection, &state.overlay)
        .ok_or(EditError::EmptySelection)?;
    Ok(SessionBase {
        start_position,
        start_bounds: params.bounds_override.unwrap_or(geometry.bounds),
        selection_rotation: geometry.rotation,
        selected_ids: state.selection.ids().clone(),
        selection_version: state.selection.version(),
        elements_version: state.document.version(),
        snapshots,
    })
}

/// Selected elements still present in the document, paired with their
/// snapshots, in ID order. `None` when the session is stale or nothing is
/// left to edit.
pub(crate) fn live_elements<'a>(
    document: &'a Document,
    selection: &Selection,
    base: &'a SessionBase,
) -> Option<Vec<(&'a Element, &'a ElementSnapshot)>> {
    if selection.version() != base.selection_version {
        tracing::warn!(
            expected = base.selection_version,
            found = selection.version(),
            "selection changed during session, ignoring result"
        );
        return None;
    }
    let mut live: Vec<_> = base
        .snapshots
        .iter()
        .filter_map(|(id, snap)| document.get_element(*id).map(|e| (e, snap)))
        .collect();
    let dropped = base.snapshots.len() - live.len();
    if dropped > 0 {
        tracing::warn!(
            expected = base.elements_version,
            found = document.version(),
            dropped,
            "selected elements deleted during session, skipping them"
        );
    } else if document.version() != base.elements_version {
        tracing::debug!(
            expected = base.elements_version,
            found = document.version(),
            "document changed during session, revalidating"
        );
    }
    live.sort_by_key(|(e, _)| e.id);
    (!live.is_empty()).then_some(live)
}

/// IDs the session was started on, in ID order.
pub(crate) fn affected_ids(base: &SessionBase) -> Vec<ElementId> {
    let mut ids: Vec<ElementId> = base.snapshots.keys().copied().collect();
    ids.sort();
    ids
}

/// Add bound-arrow updates and package the result.
pub(crate) fn finalize(
    env: &EditEnv<'_>,
    document: &Document,
    base: &SessionBase,
    mut updated: HashMap<ElementId, Element>,
    multi_select_bounds: Option<Rect>,
    multi_select_rotation: Option<f64>,
) -> EditComputedResult {
    let mut changed: Vec<ElementId> = updated.keys().copied().collect();
    changed.sort();
    let arrows = {
        let view = ElementView::new(document, &updated).with_snapshots(&base.snapshots);
        env.bindings.resolve_bound_arrows(&view, &changed)
    };
    for (id, arrow) in arrows {
        updated.entry(id).or_insert(arrow);
    }
    EditComputedResult {
        updated_elements: updated,
        multi_select_bounds,
        multi_select_rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::ElementKind;

    #[test]
    fn test_registry_is_consistent() {
        for id in OperationId::ALL {
            assert_eq!(operation_for(id).id(), id);
        }
    }

    #[test]
    fn test_live_elements_skips_deleted() {
        let square = |x: f64| Element::new(ElementKind::Rectangle, Rect::new(x, 0.0, x + 9.0, 9.0));
        let (a, b) = (square(0.0), square(20.0));
        let (ia, ib) = (a.id, b.id);
        let mut state = AppState::new(Document::from_elements([a, b])).with_selection([ia, ib]);
        let base = collect_base(&state, Point::ZERO, &EditParams::default()).expect("base");

        state.document.remove_element(&ib).expect("remove");
        let live = live_elements(&state.document, &state.selection, &base).expect("one left");
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].0.id, ia);

        state.document.remove_element(&ia).expect("remove");
        assert!(live_elements(&state.document, &state.selection, &base).is_none());
    }

    #[test]
    fn test_operation_id_serializes_snake_case() {
        let json = serde_json::to_string(&OperationId::FreeTransform).expect("serialize");
        assert_eq!(json, "\"free_transform\"");
        assert_eq!(OperationId::FreeTransform.to_string(), "free_transform");
    }
}
