//! Translate the selection by the pointer displacement.

use std::collections::HashMap;

use canvas_core::{Document, Point, Selection};

use super::apply::rebase;
use super::{
    affected_ids, collect_base, finalize, live_elements, EditComputedResult, EditEnv,
    EditOperation, OperationId, UpdateOutcome,
};
use crate::action::{EditParams, PointerInput};
use crate::context::{EditContext, MoveContext, SessionBase};
use crate::error::EditResult;
use crate::history::{element_count_label, HistoryMetadata};
use crate::snap::{reference_elements, SnapEdges, SnapGuide, SnapMode};
use crate::state::AppState;
use crate::transform::{EditTransform, MoveTransform};

/// Displacement from the session start to `input`, snapped per the
/// effective snap mode.
pub(crate) fn snapped_translation(
    env: &EditEnv<'_>,
    document: &Document,
    base: &SessionBase,
    input: &PointerInput,
) -> (MoveTransform, Vec<SnapGuide>) {
    let raw = input.position.sub(base.start_position);
    if raw.is_zero() {
        return (MoveTransform::default(), Vec::new());
    }
    let mode = env.config.snap_mode.effective(input.modifiers.invert_snap);
    let target = base
        .start_bounds
        .rotated_bounds(base.selection_rotation)
        .translate(raw.x, raw.y);
    match mode {
        SnapMode::Off => (MoveTransform::new(raw.x, raw.y), Vec::new()),
        SnapMode::Grid => {
            let snapped = env.grid.snap_rect(target, env.config.grid_size, SnapEdges::MIN);
            let dx = raw.x + (snapped.min_x - target.min_x);
            let dy = raw.y + (snapped.min_y - target.min_y);
            (MoveTransform::new(dx, dy), Vec::new())
        }
        SnapMode::Object => {
            let references = reference_elements(document, &base.selected_ids);
            let result = env
                .objects
                .snap_move(target, &references, env.config.object_snap_distance);
            let t = MoveTransform::new(raw.x + result.dx, raw.y + result.dy);
            (t, result.guides)
        }
    }
}

/// Translates the selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOperation;

impl EditOperation for MoveOperation {
    fn id(&self) -> OperationId {
        OperationId::Move
    }

    fn create_context(
        &self,
        state: &AppState,
        start_position: Point,
        params: &EditParams,
    ) -> EditResult<EditContext> {
        let base = collect_base(state, start_position, params)?;
        tracing::debug!(elements = base.snapshots.len(), "move session started");
        Ok(EditContext::Move(MoveContext { base }))
    }

    fn initial_transform(&self, context: &EditContext) -> EditResult<EditTransform> {
        context.as_move()?;
        Ok(EditTransform::Move(MoveTransform::default()))
    }

    fn update(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        context: &EditContext,
        transform: &EditTransform,
        input: &PointerInput,
    ) -> EditResult<UpdateOutcome> {
        let ctx = context.as_move()?;
        transform.as_move(self.id())?;
        let (next, guides) = snapped_translation(env, document, &ctx.base, input);
        tracing::trace!(dx = next.dx, dy = next.dy, guides = guides.len(), "move updated");
        Ok(UpdateOutcome {
            transform: EditTransform::Move(next),
            guides,
        })
    }

    fn compute_result(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        selection: &Selection,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<Option<EditComputedResult>> {
        let ctx = context.as_move()?;
        let t = transform.as_move(self.id())?;
        if t.is_identity() {
            return Ok(None);
        }
        let Some(live) = live_elements(document, selection, &ctx.base) else {
            return Ok(None);
        };
        let updated: HashMap<_, _> = live
            .into_iter()
            .map(|(element, snapshot)| {
                (element.id, rebase(element, snapshot).translated(t.dx, t.dy))
            })
            .collect();
        let (bounds, rotation) = if ctx.base.is_multi() {
            (
                Some(ctx.base.start_bounds.translate(t.dx, t.dy)),
                Some(ctx.base.selection_rotation),
            )
        } else {
            (None, None)
        };
        Ok(Some(finalize(env, document, &ctx.base, updated, bounds, rotation)))
    }

    fn history_metadata(
        &self,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<HistoryMetadata> {
        let ctx = context.as_move()?;
        transform.as_move(self.id())?;
        let affected = affected_ids(&ctx.base);
        Ok(HistoryMetadata {
            description: format!("Move {}", element_count_label(affected.len())),
            affected_element_ids: affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::EditModifiers;
    use crate::binding::NoBindings;
    use crate::config::EditConfig;
    use crate::snap::{EdgeObjectSnapper, RoundingGridSnapper};
    use canvas_core::{Element, ElementKind, Rect};

    fn env(config: &EditConfig) -> EditEnv<'_> {
        EditEnv {
            config,
            grid: &RoundingGridSnapper,
            objects: &EdgeObjectSnapper,
            bindings: &NoBindings,
        }
    }

    fn single(bounds: Rect) -> (AppState, Element) {
        let element = Element::new(ElementKind::Rectangle, bounds);
        let state = AppState::new(Document::from_elements([element.clone()]));
        let state = state.with_selection([element.id]);
        (state, element)
    }

    fn drag(
        state: &AppState,
        config: &EditConfig,
        from: Point,
        input: PointerInput,
    ) -> UpdateOutcome {
        let ctx = MoveOperation
            .create_context(state, from, &EditParams::default())
            .expect("context");
        let initial = MoveOperation.initial_transform(&ctx).expect("initial");
        MoveOperation
            .update(&env(config), &state.document, &ctx, &initial, &input)
            .expect("update")
    }

    #[test]
    fn test_raw_displacement() {
        let (state, _) = single(Rect::new(0.0, 0.0, 20.0, 20.0));
        let config = EditConfig::default();
        let input = PointerInput::at(Point::new(15.0, 0.0));
        let outcome = drag(&state, &config, Point::new(5.0, 5.0), input);
        assert_eq!(outcome.transform, EditTransform::Move(MoveTransform::new(10.0, -5.0)));
        assert!(outcome.guides.is_empty());
    }

    #[test]
    fn test_grid_snaps_min_edges() {
        let (state, _) = single(Rect::new(0.0, 0.0, 20.0, 20.0));
        let config = EditConfig {
            snap_mode: SnapMode::Grid,
            ..EditConfig::default()
        };
        let input = PointerInput::at(Point::new(27.0, 12.0));
        let outcome = drag(&state, &config, Point::ZERO, input);
        assert_eq!(outcome.transform, EditTransform::Move(MoveTransform::new(20.0, 20.0)));
    }

    #[test]
    fn test_zero_displacement_skips_snapping() {
        let (state, _) = single(Rect::new(3.0, 3.0, 23.0, 23.0));
        let config = EditConfig {
            snap_mode: SnapMode::Grid,
            ..EditConfig::default()
        };
        let input = PointerInput::at(Point::new(10.0, 10.0));
        let outcome = drag(&state, &config, Point::new(10.0, 10.0), input);
        assert_eq!(outcome.transform, EditTransform::Move(MoveTransform::default()));
    }

    #[test]
    fn test_invert_switches_to_object_snap() {
        let (mut state, moving) = single(Rect::new(0.0, 0.0, 20.0, 20.0));
        let reference = Element::new(ElementKind::Rectangle, Rect::new(100.0, 200.0, 140.0, 240.0));
        state.document.add_element(reference);
        let state = state.with_selection([moving.id]);
        let config = EditConfig {
            snap_mode: SnapMode::Grid,
            ..EditConfig::default()
        };
        let input = PointerInput::at(Point::new(97.0, 0.0)).with_modifiers(EditModifiers {
            invert_snap: true,
            ..EditModifiers::default()
        });
        let outcome = drag(&state, &config, Point::ZERO, input);
        assert_eq!(outcome.transform, EditTransform::Move(MoveTransform::new(100.0, 0.0)));
        assert_eq!(outcome.guides.len(), 1);
    }

    #[test]
    fn test_history_description() {
        let (state, element) = single(Rect::new(0.0, 0.0, 20.0, 20.0));
        let ctx = MoveOperation
            .create_context(&state, Point::ZERO, &EditParams::default())
            .expect("context");
        let meta = MoveOperation
            .history_metadata(&ctx, &EditTransform::Move(MoveTransform::new(1.0, 0.0)))
            .expect("metadata");
        assert_eq!(meta.description, "Move 1 element");
        assert_eq!(meta.affected_element_ids, vec![element.id]);
    }
}
