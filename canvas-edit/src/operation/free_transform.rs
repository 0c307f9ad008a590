//! Move, resize and rotate in one session.
//!
//! Each update computes only the current sub-mode's member against the
//! start snapshot and merges it into the composite. The result applies
//! members in a fixed order regardless of how often the mode switched:
//!
//! ```text
//! snapshot ──resize──▶ ──translate──▶ ──rotate about moved center──▶ result
//! ```

use std::collections::HashMap;

use canvas_core::{normalize_angle, Document, Point, Rect, Selection};

use super::apply::{rebase, rotate_about};
use super::move_op::snapped_translation;
use super::rotate::requested_step;
use super::{
    affected_ids, collect_base, finalize, live_elements, EditComputedResult, EditEnv,
    EditOperation, OperationId, ResizeFrame, ResizeHandle, RotateSetup, UpdateOutcome,
};
use crate::action::{EditParams, FreeTransformMode, PointerInput};
use crate::context::{EditContext, FreeTransformContext};
use crate::error::EditResult;
use crate::history::{element_count_label, HistoryMetadata};
use crate::state::AppState;
use crate::transform::{
    CompositeTransform, EditTransform, ResizeTransform, RotateTransform, TransformKind,
};

/// Selection bounds after the composite's resize and move members.
fn transformed_bounds(ctx: &FreeTransformContext, composite: &CompositeTransform) -> Rect {
    let resized = composite
        .resize_member()
        .and_then(ResizeTransform::resolved)
        .map_or(ctx.base.start_bounds, |r| r.new_bounds);
    match composite.move_member() {
        Some(m) => resized.translate(m.dx, m.dy),
        None => resized,
    }
}

/// Combined move, resize and rotate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeTransformOperation;

impl EditOperation for FreeTransformOperation {
    fn id(&self) -> OperationId {
        OperationId::FreeTransform
    }

    fn create_context(
        &self,
        state: &AppState,
        start_position: Point,
        params: &EditParams,
    ) -> EditResult<EditContext> {
        let base = collect_base(state, start_position, params)?;
        let handle = params.handle.unwrap_or(ResizeHandle::SouthEast);
        let resize = ResizeFrame::for_session(&base, handle);
        let rotate = RotateSetup::new(&base.start_bounds, base.selection_rotation, start_position);
        let default_mode = params.mode.unwrap_or_default();
        let elements = base.snapshots.len();
        tracing::debug!(?default_mode, elements, "free transform session started");
        Ok(EditContext::FreeTransform(FreeTransformContext {
            base,
            resize,
            rotate,
            default_mode,
        }))
    }

    fn initial_transform(&self, context: &EditContext) -> EditResult<EditTransform> {
        context.as_free_transform()?;
        Ok(EditTransform::Composite(CompositeTransform::new()))
    }

    fn update(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        context: &EditContext,
        transform: &EditTransform,
        input: &PointerInput,
    ) -> EditResult<UpdateOutcome> {
        let ctx = context.as_free_transform()?;
        let composite = transform.as_composite(self.id())?;
        let mode = input.mode.unwrap_or(ctx.default_mode);
        let (member, guides) = match mode {
            FreeTransformMode::Move => {
                let (m, guides) = snapped_translation(env, document, &ctx.base, input);
                (EditTransform::Move(m), guides)
            }
            FreeTransformMode::Resize => {
                let (r, guides) = ctx.resize.update(env, document, &ctx.base, input);
                (EditTransform::Resize(r), guides)
            }
            FreeTransformMode::Rotate => {
                let pivot = transformed_bounds(ctx, composite).center();
                let previous = match (composite.active(), composite.last_rotation()) {
                    (Some(TransformKind::Rotate), Some(r)) => r,
                    (None, _) => RotateTransform::starting_at(ctx.rotate.start_angle),
                    // Entering rotate from another mode: pointer travel so far
                    // was not rotation, and the pivot may have moved.
                    (_, r) => RotateTransform {
                        last_raw_angle: input.position.angle_from(pivot),
                        ..r.unwrap_or_default()
                    },
                };
                let step = requested_step(env, input);
                let next = ctx.rotate.advance(&previous, pivot, input.position, step);
                (EditTransform::Rotate(next), Vec::new())
            }
        };
        let next = composite.merged(member).optimized();
        tracing::trace!(?mode, members = next.members().len(), "free transform updated");
        Ok(UpdateOutcome {
            transform: EditTransform::Composite(next),
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
        let ctx = context.as_free_transform()?;
        let composite = transform.as_composite(self.id())?;
        if composite.is_identity() {
            return Ok(None);
        }
        let Some(live) = live_elements(document, selection, &ctx.base) else {
            return Ok(None);
        };
        let resize = composite.resize_member().and_then(ResizeTransform::resolved);
        let shift = composite.move_member().copied().unwrap_or_default();
        let angle = composite.applied_rotation();
        let bounds = transformed_bounds(ctx, composite);
        let pivot = bounds.center();

        let updated: HashMap<_, _> = live
            .into_iter()
            .map(|(element, snapshot)| {
                let mut e = rebase(element, snapshot);
                if let Some(r) = resize {
                    e = ctx.resize.apply(&e, r);
                }
                if !shift.is_identity() {
                    e = e.translated(shift.dx, shift.dy);
                }
                (element.id, rotate_about(&e, pivot, angle))
            })
            .collect();
        let (multi_bounds, multi_rotation) = if ctx.base.is_multi() {
            (
                Some(bounds),
                Some(normalize_angle(ctx.resize.angle() + angle)),
            )
        } else {
            (None, None)
        };
        Ok(Some(finalize(
            env,
            document,
            &ctx.base,
            updated,
            multi_bounds,
            multi_rotation,
        )))
    }

    fn history_metadata(
        &self,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<HistoryMetadata> {
        let ctx = context.as_free_transform()?;
        transform.as_composite(self.id())?;
        let affected = affected_ids(&ctx.base);
        Ok(HistoryMetadata {
            description: format!("Transform {}", element_count_label(affected.len())),
            affected_element_ids: affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::EditModifiers;
    use crate::action::FreeTransformMode as Mode;
    use crate::binding::NoBindings;
    use crate::config::EditConfig;
    use crate::snap::{NoObjectSnap, RoundingGridSnapper};
    use crate::transform::MoveTransform;
    use canvas_core::{Element, ElementKind};
    use std::f64::consts::FRAC_PI_2;

    fn env(config: &EditConfig) -> EditEnv<'_> {
        EditEnv {
            config,
            grid: &RoundingGridSnapper,
            objects: &NoObjectSnap,
            bindings: &NoBindings,
        }
    }

    fn session(params: EditParams) -> (AppState, EditContext, Element) {
        let element = Element::new(ElementKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 50.0));
        let state = AppState::new(Document::from_elements([element.clone()]));
        let state = state.with_selection([element.id]);
        let ctx = FreeTransformOperation
            .create_context(&state, Point::new(100.0, 50.0), &params)
            .expect("context");
        (state, ctx, element)
    }

    fn drag(mode: Mode, x: f64, y: f64) -> PointerInput {
        PointerInput::at(Point::new(x, y)).with_mode(mode)
    }

    fn step(
        state: &AppState,
        ctx: &EditContext,
        t: &EditTransform,
        input: PointerInput,
    ) -> EditTransform {
        let config = EditConfig::default();
        FreeTransformOperation
            .update(&env(&config), &state.document, ctx, t, &input)
            .expect("update")
            .transform
    }

    #[test]
    fn test_mode_switch_keeps_one_member_per_kind() {
        let (state, ctx, _) = session(EditParams::default());
        let mut t = FreeTransformOperation.initial_transform(&ctx).expect("initial");
        t = step(&state, &ctx, &t, drag(Mode::Move, 110.0, 50.0));
        t = step(&state, &ctx, &t, drag(Mode::Resize, 150.0, 75.0));
        t = step(&state, &ctx, &t, drag(Mode::Move, 130.0, 60.0));

        let composite = t.as_composite(OperationId::FreeTransform).expect("composite");
        let kinds: Vec<_> = composite.members().iter().map(EditTransform::kind).collect();
        assert_eq!(kinds, vec![TransformKind::Move, TransformKind::Resize]);
        assert_eq!(composite.move_member(), Some(&MoveTransform::new(30.0, 10.0)));
    }

    #[test]
    fn test_resize_then_move_applies_in_order() {
        let (state, ctx, element) = session(EditParams::handle(ResizeHandle::SouthEast));
        let mut t = FreeTransformOperation.initial_transform(&ctx).expect("initial");
        t = step(&state, &ctx, &t, drag(Mode::Resize, 200.0, 100.0));
        t = step(&state, &ctx, &t, drag(Mode::Move, 110.0, 60.0));

        let config = EditConfig::default();
        let result = FreeTransformOperation
            .compute_result(&env(&config), &state.document, &state.selection, &ctx, &t)
            .expect("compute")
            .expect("changed");
        let e = &result.updated_elements[&element.id];
        assert!(e.bounds.approx_eq(&Rect::new(10.0, 10.0, 210.0, 110.0)));
    }

    #[test]
    fn test_rotate_about_moved_center() {
        let (state, ctx, element) = session(EditParams {
            mode: Some(FreeTransformMode::Rotate),
            ..EditParams::default()
        });
        let mut t = FreeTransformOperation.initial_transform(&ctx).expect("initial");
        // Start angle is atan2(25, 50) about (50, 25); swing to straight down.
        t = step(&state, &ctx, &t, PointerInput::at(Point::new(50.0, 60.0)));
        let composite = t.as_composite(OperationId::FreeTransform).expect("composite");
        let expected = FRAC_PI_2 - 25.0_f64.atan2(50.0);
        assert!((composite.applied_rotation() - expected).abs() < 1e-12);

        let config = EditConfig::default();
        let result = FreeTransformOperation
            .compute_result(&env(&config), &state.document, &state.selection, &ctx, &t)
            .expect("compute")
            .expect("changed");
        let e = &result.updated_elements[&element.id];
        assert!(e.center().approx_eq(Point::new(50.0, 25.0)));
        assert!((e.rotation - expected).abs() < 1e-12);
    }

    #[test]
    fn test_snapped_rotation_accumulates_below_step() {
        let (state, ctx, _) = session(EditParams {
            mode: Some(FreeTransformMode::Rotate),
            ..EditParams::default()
        });
        let start = 25.0_f64.atan2(50.0);
        let snap = EditModifiers {
            snap_angle: true,
            ..EditModifiers::default()
        };
        let at = |degrees: f64| {
            let a = start + degrees.to_radians();
            PointerInput::at(Point::new(50.0 + 40.0 * a.cos(), 25.0 + 40.0 * a.sin()))
                .with_modifiers(snap)
        };
        let mut t = FreeTransformOperation.initial_transform(&ctx).expect("initial");
        t = step(&state, &ctx, &t, at(5.0));
        let composite = t.as_composite(OperationId::FreeTransform).expect("composite");
        assert!(composite.members().is_empty());

        t = step(&state, &ctx, &t, at(10.0));
        let composite = t.as_composite(OperationId::FreeTransform).expect("composite");
        assert!((composite.applied_rotation() - 15.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_identity_composite_has_no_result() {
        let (state, ctx, _) = session(EditParams::default());
        let t = step(
            &state,
            &ctx,
            &FreeTransformOperation.initial_transform(&ctx).expect("initial"),
            PointerInput::at(Point::new(100.0, 50.0)),
        );
        let config = EditConfig::default();
        let result = FreeTransformOperation
            .compute_result(&env(&config), &state.document, &state.selection, &ctx, &t)
            .expect("compute");
        assert!(result.is_none());
    }
}
