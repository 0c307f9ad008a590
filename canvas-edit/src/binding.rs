//! Bound-arrow propagation.
//!
//! When a shape moves, arrows bound to it must follow. Operations collect
//! their updated elements, then ask a [`BindingResolver`] for the extra
//! arrow updates so preview and commit see the same routing.

use std::collections::{BTreeSet, HashMap};

use canvas_core::{Document, Element, ElementId, Point};

use crate::context::ElementSnapshot;

/// The document with a set of pending element replacements laid over it.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    document: &'a Document,
    overrides: &'a HashMap<ElementId, Element>,
    snapshots: Option<&'a HashMap<ElementId, ElementSnapshot>>,
}

impl<'a> ElementView<'a> {
    /// Overlay `overrides` on `document`.
    #[must_use]
    pub const fn new(document: &'a Document, overrides: &'a HashMap<ElementId, Element>) -> Self {
        Self {
            document,
            overrides,
            snapshots: None,
        }
    }

    /// Take pre-change geometry from `snapshots` where one exists.
    #[must_use]
    pub const fn with_snapshots(self, snapshots: &'a HashMap<ElementId, ElementSnapshot>) -> Self {
        Self {
            snapshots: Some(snapshots),
            ..self
        }
    }

    /// The element as it will look after the pending replacements.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&'a Element> {
        self.overrides
            .get(&id)
            .or_else(|| self.document.get_element(id))
    }

    /// The element as currently committed.
    #[must_use]
    pub fn original(&self, id: ElementId) -> Option<&'a Element> {
        self.document.get_element(id)
    }

    /// Geometry of the element before the pending replacements: its
    /// snapshot when one was taken, else the committed element.
    #[must_use]
    pub fn original_geometry(&self, id: ElementId) -> Option<ElementSnapshot> {
        self.snapshots
            .and_then(|snapshots| snapshots.get(&id).copied())
            .or_else(|| self.original(id).map(ElementSnapshot::from))
    }

    /// Whether the element has a pending replacement.
    #[must_use]
    pub fn is_overridden(&self, id: ElementId) -> bool {
        self.overrides.contains_key(&id)
    }
}

/// Re-routes arrows bound to changed elements.
pub trait BindingResolver {
    /// Replacement arrows for everything bound to `changed`.
    fn resolve_bound_arrows(
        &self,
        view: &ElementView<'_>,
        changed: &[ElementId],
    ) -> HashMap<ElementId, Element>;
}

/// Leaves bound arrows untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl BindingResolver for NoBindings {
    fn resolve_bound_arrows(
        &self,
        _: &ElementView<'_>,
        _: &[ElementId],
    ) -> HashMap<ElementId, Element> {
        HashMap::new()
    }
}

/// Keeps bound endpoints at the same relative spot on their target.
///
/// An endpoint is mapped into the target's old unrotated frame, normalized
/// against the old bounds, then placed at the same fraction of the new
/// bounds and rotated by the new rotation. Elbow arrows are re-routed from
/// their new endpoints. Arrows that are themselves being changed are left
/// to the operation that changes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowBindingResolver;

fn remap(point: Point, old: &ElementSnapshot, new: &Element) -> Point {
    let local = point.rotate_around(old.center, -old.rotation);
    let (ob, nb) = (old.bounds, new.bounds);
    let fraction = |v: f64, min: f64, size: f64| if size > 0.0 { (v - min) / size } else { 0.5 };
    let u = fraction(local.x, ob.min_x, ob.width());
    let v = fraction(local.y, ob.min_y, ob.height());
    let placed = Point::new(nb.min_x + u * nb.width(), nb.min_y + v * nb.height());
    placed.rotate_around(new.center(), new.rotation)
}

impl BindingResolver for ArrowBindingResolver {
    fn resolve_bound_arrows(
        &self,
        view: &ElementView<'_>,
        changed: &[ElementId],
    ) -> HashMap<ElementId, Element> {
        let arrow_ids: BTreeSet<ElementId> = changed
            .iter()
            .filter_map(|id| view.original(*id))
            .flat_map(|e| e.bound_arrows.iter().copied())
            .filter(|id| !view.is_overridden(*id))
            .collect();

        let mut updates = HashMap::new();
        for arrow_id in arrow_ids {
            let Some(arrow_element) = view.get(arrow_id) else {
                continue;
            };
            let Some(arrow) = arrow_element.as_arrow() else {
                continue;
            };
            let (Some(start), Some(end)) = (arrow.start(), arrow.end()) else {
                continue;
            };
            let pivot = arrow_element.center();
            let to_world = |p: Point| p.rotate_around(pivot, arrow_element.rotation);
            let follow = |p: Point, binding: Option<ElementId>| {
                binding
                    .filter(|target| view.is_overridden(*target))
                    .and_then(|target| Some((view.original_geometry(target)?, view.get(target)?)))
                    .map_or(p, |(old, new)| remap(p, &old, new))
            };
            let new_start = follow(to_world(start), arrow.start_binding);
            let new_end = follow(to_world(end), arrow.end_binding);
            // Endpoints are world points; re-route in the arrow's own frame.
            let back = |p: Point| p.rotate_around(pivot, -arrow_element.rotation);
            let routed = arrow_element.with_arrow_endpoints(back(new_start), back(new_end));
            tracing::trace!(%arrow_id, "re-routed bound arrow");
            updates.insert(arrow_id, routed);
        }
        updates
    }
}
