//! Rotation about the selection center.
//!
//! The pointer angle is tracked incrementally: each update adds the
//! shortest signed delta from the previous raw angle, so crossing the ±π
//! boundary behind the pivot does not wrap the accumulated angle.

use std::collections::HashMap;

use canvas_core::{normalize_angle, shortest_angle_delta, Document, Point, Rect, Selection};

use super::apply::{rebase, rotate_about};
use super::{
    affected_ids, collect_base, finalize, live_elements, EditComputedResult, EditEnv,
    EditOperation, OperationId, UpdateOutcome,
};
use crate::action::{EditParams, PointerInput};
use crate::context::{EditContext, RotateContext};
use crate::error::EditResult;
use crate::history::{element_count_label, HistoryMetadata};
use crate::state::AppState;
use crate::transform::{EditTransform, RotateTransform};

/// Pivot and angles fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateSetup {
    /// World point rotated about.
    pub pivot: Point,
    /// Pointer angle at session start.
    pub start_angle: f64,
    /// Selection rotation before the session.
    pub base_rotation: f64,
}

impl RotateSetup {
    /// Setup for a rotation of `start_bounds` grabbed at `start_position`.
    #[must_use]
    pub fn new(start_bounds: &Rect, base_rotation: f64, start_position: Point) -> Self {
        let pivot = start_bounds.center();
        Self {
            pivot,
            start_angle: start_position.angle_from(pivot),
            base_rotation,
        }
    }

    /// Advance `previous` to a pointer at `position`, measured about `pivot`.
    ///
    /// With `step` set, the total rotation is rounded to a multiple of it.
    /// A pointer exactly on the pivot has no angle; the previous value is
    /// kept.
    #[must_use]
    pub fn advance(
        &self,
        previous: &RotateTransform,
        pivot: Point,
        position: Point,
        step: Option<f64>,
    ) -> RotateTransform {
        if position == pivot {
            return *previous;
        }
        let angle = position.angle_from(pivot);
        let delta = shortest_angle_delta(previous.last_raw_angle, angle);
        let raw = previous.raw_accumulated_angle + delta;
        let applied = match step {
            Some(step) => ((self.base_rotation + raw) / step).round() * step - self.base_rotation,
            None => raw,
        };
        RotateTransform {
            raw_accumulated_angle: raw,
            applied_angle: applied,
            last_raw_angle: angle,
        }
    }
}

/// Snap step requested by `input`, if the configuration allows one.
pub(crate) fn requested_step(env: &EditEnv<'_>, input: &PointerInput) -> Option<f64> {
    if input.modifiers.snap_angle {
        env.config.rotation_step()
    } else {
        None
    }
}

/// Rotates the selection about its start-bounds center.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotateOperation;

impl EditOperation for RotateOperation {
    fn id(&self) -> OperationId {
        OperationId::Rotate
    }

    fn create_context(
        &self,
        state: &AppState,
        start_position: Point,
        params: &EditParams,
    ) -> EditResult<EditContext> {
        let base = collect_base(state, start_position, params)?;
        let setup = RotateSetup::new(&base.start_bounds, base.selection_rotation, start_position);
        tracing::debug!(
            pivot = ?setup.pivot,
            base_rotation = setup.base_rotation,
            "rotate session started"
        );
        Ok(EditContext::Rotate(RotateContext { base, setup }))
    }

    fn initial_transform(&self, context: &EditContext) -> EditResult<EditTransform> {
        let ctx = context.as_rotate()?;
        Ok(EditTransform::Rotate(RotateTransform::starting_at(
            ctx.setup.start_angle,
        )))
    }

    fn update(
        &self,
        env: &EditEnv<'_>,
        _document: &Document,
        context: &EditContext,
        transform: &EditTransform,
        input: &PointerInput,
    ) -> EditResult<UpdateOutcome> {
        let ctx = context.as_rotate()?;
        let previous = transform.as_rotate(self.id())?;
        let next = ctx.setup.advance(
            previous,
            ctx.setup.pivot,
            input.position,
            requested_step(env, input),
        );
        tracing::trace!(applied = next.applied_angle, "rotate updated");
        Ok(UpdateOutcome::bare(EditTransform::Rotate(next)))
    }

    fn compute_result(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        selection: &Selection,
        context: &EditContext,
        transform: &EditTransform,
    ) -> EditResult<Option<EditComputedResult>> {
        let ctx = context.as_rotate()?;
        let rotate = transform.as_rotate(self.id())?;
        if rotate.is_identity() {
            return Ok(None);
        }
        let Some(live) = live_elements(document, selection, &ctx.base) else {
            return Ok(None);
        };
        let angle = rotate.applied_angle;
        let updated: HashMap<_, _> = live
            .into_iter()
            .map(|(element, snapshot)| {
                let rotated = rotate_about(&rebase(element, snapshot), ctx.setup.pivot, angle);
                (element.id, rotated)
            })
            .collect();
        let (bounds, rotation) = if ctx.base.is_multi() {
            (
                Some(ctx.base.start_bounds),
                Some(normalize_angle(ctx.setup.base_rotation + angle)),
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
        let ctx = context.as_rotate()?;
        let rotate = transform.as_rotate(self.id())?;
        let affected = affected_ids(&ctx.base);
        Ok(HistoryMetadata {
            description: format!(
                "Rotate {} by {:.0}°",
                element_count_label(affected.len()),
                rotate.applied_angle.to_degrees()
            ),
            affected_element_ids: affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn setup() -> RotateSetup {
        RotateSetup::new(&Rect::new(0.0, 0.0, 100.0, 100.0), 0.0, Point::new(100.0, 50.0))
    }

    #[test]
    fn test_start_angle_from_pivot() {
        let s = setup();
        assert_eq!(s.pivot, Point::new(50.0, 50.0));
        assert_eq!(s.start_angle, 0.0);
    }

    #[test]
    fn test_crossing_pi_boundary_accumulates() {
        let s = setup();
        let mut t = RotateTransform::starting_at(s.start_angle);
        // Walk counter-clockwise from 0 past -π to the left side.
        for deg in [-60.0_f64, -120.0, -170.0, -190.0, -200.0] {
            let a = deg.to_radians();
            let p = Point::new(50.0 + 50.0 * a.cos(), 50.0 + 50.0 * a.sin());
            t = s.advance(&t, s.pivot, p, None);
        }
        assert!((t.raw_accumulated_angle - (-200.0_f64).to_radians()).abs() < 1e-9);
        assert_eq!(t.applied_angle, t.raw_accumulated_angle);
    }

    #[test]
    fn test_snap_rounds_total_rotation() {
        let s = RotateSetup {
            base_rotation: 0.1,
            ..setup()
        };
        let a = 0.5_f64;
        let p = Point::new(50.0 + 50.0 * a.cos(), 50.0 + 50.0 * a.sin());
        let t = s.advance(&RotateTransform::starting_at(0.0), s.pivot, p, Some(PI / 12.0));
        let total = s.base_rotation + t.applied_angle;
        assert!((total - 2.0 * PI / 12.0).abs() < 1e-12);
        assert!((t.raw_accumulated_angle - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_on_pivot_keeps_previous() {
        let s = setup();
        let previous = RotateTransform {
            raw_accumulated_angle: FRAC_PI_2,
            applied_angle: FRAC_PI_2,
            last_raw_angle: FRAC_PI_2,
        };
        assert_eq!(s.advance(&previous, s.pivot, s.pivot, None), previous);
    }
}
