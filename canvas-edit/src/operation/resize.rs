//! Resize from one of eight handles.
//!
//! All math happens in the selection's unrotated frame, centered on the
//! start bounds. The anchor is the handle's opposite point (or the center
//! when resizing from center) and the pointer is corrected by the offset
//! between the grab point and the handle, so the handle does not jump to
//! the cursor on the first update.

use std::collections::HashMap;

use canvas_core::{
    Document, Element, ElementFrame, LocalPoint, LocalVector, OverlayFrame, Point, Rect,
    RotatedSpace, Selection, EPSILON,
};
use serde::{Deserialize, Serialize};

use super::apply::{rebase, resize_in};
use super::{
    collect_base, finalize, live_elements, EditComputedResult, EditEnv, EditOperation,
    OperationId, UpdateOutcome,
};
use crate::action::{EditParams, PointerInput};
use crate::context::{EditContext, ResizeContext, SessionBase};
use crate::error::{EditError, EditResult};
use crate::history::{element_count_label, HistoryMetadata};
use crate::snap::{reference_elements, SnapEdges, SnapGuide, SnapMode};
use crate::state::AppState;
use crate::transform::{EditTransform, ResizeTransform, ResolvedResize};

/// One of the eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    /// Top edge.
    North,
    /// Top-right corner.
    NorthEast,
    /// Right edge.
    East,
    /// Bottom-right corner.
    SouthEast,
    /// Bottom edge.
    South,
    /// Bottom-left corner.
    SouthWest,
    /// Left edge.
    West,
    /// Top-left corner.
    NorthWest,
}

impl ResizeHandle {
    /// Every handle, clockwise from the top edge.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Unit direction from the center toward the handle, per axis.
    #[must_use]
    pub const fn direction(self) -> (i8, i8) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// The handle across the center.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Whether the handle is a corner.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        let (x, y) = self.direction();
        x != 0 && y != 0
    }

    /// Position of the handle on `rect`.
    #[must_use]
    pub fn point_on(self, rect: &Rect) -> Point {
        let (x, y) = self.direction();
        let c = rect.center();
        Point::new(
            c.x + f64::from(x) * rect.width() / 2.0,
            c.y + f64::from(y) * rect.height() / 2.0,
        )
    }
}

/// Resize geometry fixed at session start, in a frame of kind `F`.
#[derive(Debug, Clone)]
pub struct ResizeSetup<F> {
    space: RotatedSpace<F>,
    local_bounds: Rect,
    handle: ResizeHandle,
    handle_offset: LocalVector<F>,
    opposite: LocalPoint<F>,
}

impl<F> ResizeSetup<F> {
    /// Fix the frame, anchor and grab offset for a drag of `handle` that
    /// started at `start_position`.
    #[must_use]
    pub fn new(
        start_bounds: Rect,
        rotation: f64,
        handle: ResizeHandle,
        start_position: Point,
    ) -> Self {
        let space = RotatedSpace::new(start_bounds.center(), rotation);
        let (width, height) = (start_bounds.width(), start_bounds.height());
        let local_bounds = Rect::from_center(Point::ZERO, width, height);
        let grab = handle.point_on(&local_bounds);
        let grab = LocalPoint::new(grab.x, grab.y);
        let far = handle.opposite().point_on(&local_bounds);
        Self {
            space,
            local_bounds,
            handle,
            handle_offset: grab.sub(space.to_local(start_position)),
            opposite: LocalPoint::new(far.x, far.y),
        }
    }

    /// The handle being dragged.
    #[must_use]
    pub const fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// The frame the resize happens in.
    #[must_use]
    pub const fn space(&self) -> &RotatedSpace<F> {
        &self.space
    }

    #[allow(clippy::too_many_lines)]
    fn resolve(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        base: &SessionBase,
        input: &PointerInput,
    ) -> (ResizeTransform, Vec<SnapGuide>) {
        let modifiers = input.modifiers;
        let (from_center, lock) = (modifiers.from_center, modifiers.lock_aspect_ratio);
        let (hx, hy) = self.handle.direction();
        let (moves_x, moves_y) = (hx != 0, hy != 0);
        let (w0, h0) = (self.local_bounds.width(), self.local_bounds.height());

        let zero_w = w0 <= EPSILON;
        let zero_h = h0 <= EPSILON;
        if (moves_x && zero_w) || (moves_y && zero_h) || (lock && (zero_w || zero_h)) {
            let incomplete = ResizeTransform::Incomplete {
                last_position: input.position,
            };
            return (incomplete, Vec::new());
        }

        let anchor = if from_center {
            LocalPoint::new(0.0, 0.0)
        } else {
            self.opposite
        };
        let pointer = self.space.to_local(input.position).offset(self.handle_offset);
        let delta = pointer.sub(anchor).raw();

        let flip_x = !from_center && moves_x && delta.x * f64::from(hx) < 0.0;
        let flip_y = !from_center && moves_y && delta.y * f64::from(hy) < 0.0;
        let factor = if from_center { 2.0 } else { 1.0 };

        let mut w = if moves_x { delta.x.abs() * factor } else { w0 };
        let mut h = if moves_y { delta.y.abs() * factor } else { h0 };
        if lock {
            let (rx, ry) = (w / w0, h / h0);
            match (moves_x, moves_y) {
                (true, true) => {
                    let r = rx.max(ry);
                    w = w0 * r;
                    h = h0 * r;
                }
                (true, false) => h = h0 * rx,
                (false, true) => w = w0 * ry,
                (false, false) => {}
            }
        }

        let a = anchor.raw();
        // Local span of one axis after the drag.
        let span = |moves: bool, dir: i8, flip: bool, at: f64, size: f64, lo: f64, hi: f64| {
            if from_center {
                (-size / 2.0, size / 2.0)
            } else if moves {
                let sign = if flip { -f64::from(dir) } else { f64::from(dir) };
                let far = at + sign * size;
                (at.min(far), at.max(far))
            } else if lock {
                (at - size / 2.0, at + size / 2.0)
            } else {
                (lo, hi)
            }
        };
        let lb = &self.local_bounds;
        let (min_x, max_x) = span(moves_x, hx, flip_x, a.x, w, lb.min_x, lb.max_x);
        let (min_y, max_y) = span(moves_y, hy, flip_y, a.y, h, lb.min_y, lb.max_y);
        let mut local = Rect::new(min_x, min_y, max_x, max_y);

        let mode = env.config.snap_mode.effective(modifiers.invert_snap);
        let mut guides = Vec::new();
        let snaps = self.space.is_axis_aligned()
            && !from_center
            && mode != SnapMode::Off
            && !(mode == SnapMode::Grid && lock);
        if snaps {
            // The dragged edge is the one away from the anchor.
            let drags_max_x = moves_x && (f64::from(hx) > 0.0) != flip_x;
            let drags_max_y = moves_y && (f64::from(hy) > 0.0) != flip_y;
            let edges = SnapEdges {
                min_x: moves_x && !drags_max_x,
                max_x: drags_max_x,
                min_y: moves_y && !drags_max_y,
                max_y: drags_max_y,
            };
            let origin = self.space.origin();
            let world = local.translate(origin.x, origin.y);
            let snapped = match mode {
                SnapMode::Grid => env.grid.snap_rect(world, env.config.grid_size, edges),
                SnapMode::Object => {
                    let references = reference_elements(document, &base.selected_ids);
                    let result = env.objects.snap_resize(
                        world,
                        &references,
                        env.config.object_snap_distance,
                        edges,
                    );
                    guides = result.guides;
                    let mut r = world;
                    if edges.min_x {
                        r.min_x += result.dx;
                    }
                    if edges.max_x {
                        r.max_x += result.dx;
                    }
                    if edges.min_y {
                        r.min_y += result.dy;
                    }
                    if edges.max_y {
                        r.max_y += result.dy;
                    }
                    r
                }
                SnapMode::Off => world,
            };
            let snapped = Rect::from_points(
                Point::new(snapped.min_x, snapped.min_y),
                Point::new(snapped.max_x, snapped.max_y),
            );
            local = snapped.translate(-origin.x, -origin.y);
            w = local.width();
            h = local.height();
        }

        let scale = |size: f64, original: f64, flip: bool| {
            let s = if original > EPSILON { size / original } else { 1.0 };
            if flip {
                -s
            } else {
                s
            }
        };
        let center = local.center();
        let resolved = ResolvedResize {
            new_bounds: Rect::from_center(
                self.space.to_world(LocalPoint::new(center.x, center.y)),
                w,
                h,
            ),
            scale_x: scale(w, w0, flip_x),
            scale_y: scale(h, h0, flip_y),
            anchor: self.space.to_world(anchor),
        };
        (ResizeTransform::Complete(resolved), guides)
    }

    fn apply(&self, element: &Element, resize: &ResolvedResize) -> Element {
        resize_in(element, &self.space, resize)
    }
}

/// Resize frame: a single element's own frame, or the multi-select
/// overlay's.
#[derive(Debug, Clone)]
pub enum ResizeFrame {
    /// One selected element.
    Element(ResizeSetup<ElementFrame>),
    /// Several selected elements under the overlay.
    Overlay(ResizeSetup<OverlayFrame>),
}

impl ResizeFrame {
    /// Pick the frame for `base`.
    #[must_use]
    pub fn for_session(base: &SessionBase, handle: ResizeHandle) -> Self {
        let (bounds, rotation) = (base.start_bounds, base.selection_rotation);
        let start = base.start_position;
        if base.is_multi() {
            Self::Overlay(ResizeSetup::new(bounds, rotation, handle, start))
        } else {
            Self::Element(ResizeSetup::new(bounds, rotation, handle, start))
        }
    }

    /// Rotation of the frame.
    #[must_use]
    pub fn angle(&self) -> f64 {
        match self {
            Self::Element(s) => s.space.angle(),
            Self::Overlay(s) => s.space.angle(),
        }
    }

    /// The handle being dragged.
    #[must_use]
    pub const fn handle(&self) -> ResizeHandle {
        match self {
            Self::Element(s) => s.handle,
            Self::Overlay(s) => s.handle,
        }
    }

    /// Resolve a pointer sample into a resize and its guides.
    pub(crate) fn update(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        base: &SessionBase,
        input: &PointerInput,
    ) -> (ResizeTransform, Vec<SnapGuide>) {
        match self {
            Self::Element(s) => s.resolve(env, document, base, input),
            Self::Overlay(s) => s.resolve(env, document, base, input),
        }
    }

    /// Scale one element.
    pub(crate) fn apply(&self, element: &Element, resize: &ResolvedResize) -> Element {
        match self {
            Self::Element(s) => s.apply(element, resize),
            Self::Overlay(s) => s.apply(element, resize),
        }
    }
}

/// Scales the selection from a handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResizeOperation;

impl EditOperation for ResizeOperation {
    fn id(&self) -> OperationId {
        OperationId::Resize
    }

    fn create_context(
        &self,
        state: &AppState,
        start_position: Point,
        params: &EditParams,
    ) -> EditResult<EditContext> {
        let handle = params.handle.ok_or(EditError::MissingParameter("handle"))?;
        let base = collect_base(state, start_position, params)?;
        let frame = ResizeFrame::for_session(&base, handle);
        tracing::debug!(?handle, elements = base.snapshots.len(), "resize session started");
        Ok(EditContext::Resize(ResizeContext { base, frame }))
    }

    fn initial_transform(&self, context: &EditContext) -> EditResult<EditTransform> {
        let ctx = context.as_resize()?;
        Ok(EditTransform::Resize(ResizeTransform::Incomplete {
            last_position: ctx.base.start_position,
        }))
    }

    fn update(
        &self,
        env: &EditEnv<'_>,
        document: &Document,
        context: &EditContext,
        transform: &EditTransform,
        input: &PointerInput,
    ) -> EditResult<UpdateOutcome> {
        let ctx = context.as_resize()?;
        transform.as_resize(self.id())?;
        let (resize, guides) = ctx.frame.update(env, document, &ctx.base, input);
        tracing::trace!(?resize, "resize updated");
        Ok(UpdateOutcome {
            transform: EditTransform::Resize(resize),
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
        let ctx = context.as_resize()?;
        let resize = transform.as_resize(self.id())?;
        if resize.is_identity_for(&ctx.base.start_bounds) {
            return Ok(None);
        }
        let Some(resolved) = resize.resolved() else {
            return Ok(None);
        };
        let Some(live) = live_elements(document, selection, &ctx.base) else {
            return Ok(None);
        };
        let updated: HashMap<_, _> = live
            .into_iter()
            .map(|(element, snapshot)| {
                let resized = ctx.frame.apply(&rebase(element, snapshot), resolved);
                (element.id, resized)
            })
            .collect();
        let (bounds, rotation) = if ctx.base.is_multi() {
            (Some(resolved.new_bounds), Some(ctx.frame.angle()))
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
        let ctx = context.as_resize()?;
        transform.as_resize(self.id())?;
        let affected = super::affected_ids(&ctx.base);
        Ok(HistoryMetadata {
            description: format!("Resize {}", element_count_label(affected.len())),
            affected_element_ids: affected,
        })
    }
}
