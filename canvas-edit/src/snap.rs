//! Snap service contracts and default implementations.
//!
//! Move and resize ask a [`GridSnapper`] or an [`ObjectSnapper`] for an
//! adjustment and fold it back into their transform. The snap algorithms
//! are replaceable; the engine only depends on the traits.

use canvas_core::{Document, Element, ElementId, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which snapping is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// No snapping.
    #[default]
    Off,
    /// Align edges to the grid.
    Grid,
    /// Align to other elements.
    Object,
}

impl SnapMode {
    /// The mode with grid and object swapped.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Off => Self::Off,
            Self::Grid => Self::Object,
            Self::Object => Self::Grid,
        }
    }

    /// Mode in effect given the live override key.
    #[must_use]
    pub const fn effective(self, invert: bool) -> Self {
        if invert {
            self.inverted()
        } else {
            self
        }
    }
}

/// Edges of a rectangle that may move while snapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SnapEdges {
    /// Left edge.
    pub min_x: bool,
    /// Right edge.
    pub max_x: bool,
    /// Top edge.
    pub min_y: bool,
    /// Bottom edge.
    pub max_y: bool,
}

impl SnapEdges {
    /// The top-left edges, used to align a translated box.
    pub const MIN: Self = Self {
        min_x: true,
        max_x: false,
        min_y: true,
        max_y: false,
    };

    /// Whether no edge is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.min_x || self.max_x || self.min_y || self.max_y)
    }
}

/// Axis a guide is aligned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A vertical guide at a fixed x.
    X,
    /// A horizontal guide at a fixed y.
    Y,
}

/// Kind of visual guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapGuideKind {
    /// Edge or center alignment.
    Point,
    /// Equal spacing between elements.
    Gap,
}

/// On-canvas feedback for an applied snap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    /// Guide kind.
    pub kind: SnapGuideKind,
    /// Alignment axis.
    pub axis: Axis,
    /// Start of the guide line.
    pub start: Point,
    /// End of the guide line.
    pub end: Point,
    /// Points to highlight along the guide.
    pub markers: Vec<Point>,
    /// Optional label, e.g. a gap distance.
    pub label: Option<String>,
}

/// Outcome of an object snap request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSnapResult {
    /// Whether any axis snapped.
    pub has_snap: bool,
    /// Horizontal adjustment.
    pub dx: f64,
    /// Vertical adjustment.
    pub dy: f64,
    /// Guides to draw.
    pub guides: Vec<SnapGuide>,
}

/// Aligns rectangles to a grid.
pub trait GridSnapper {
    /// Snap the selected `edges` of `rect` to a grid of `grid_size`.
    fn snap_rect(&self, rect: Rect, grid_size: f64, edges: SnapEdges) -> Rect;
}

/// Aligns rectangles to other elements.
pub trait ObjectSnapper {
    /// Adjustment that aligns a translated box to `references`.
    fn snap_move(
        &self,
        target: Rect,
        references: &[&Element],
        snap_distance: f64,
    ) -> ObjectSnapResult;

    /// Adjustment for the dragged `edges` of a resized box.
    fn snap_resize(
        &self,
        target: Rect,
        references: &[&Element],
        snap_distance: f64,
        edges: SnapEdges,
    ) -> ObjectSnapResult;
}

/// Unselected, visible elements that snapping may align against.
#[must_use]
pub fn reference_elements<'a>(
    document: &'a Document,
    selected: &BTreeSet<ElementId>,
) -> Vec<&'a Element> {
    document
        .elements()
        .filter(|e| !selected.contains(&e.id) && e.is_visible())
        .collect()
}

/// Rounds edges to the nearest grid line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundingGridSnapper;

impl GridSnapper for RoundingGridSnapper {
    fn snap_rect(&self, rect: Rect, grid_size: f64, edges: SnapEdges) -> Rect {
        if grid_size <= 0.0 {
            return rect;
        }
        let snap = |v: f64, on: bool| if on { (v / grid_size).round() * grid_size } else { v };
        Rect::new(
            snap(rect.min_x, edges.min_x),
            snap(rect.min_y, edges.min_y),
            snap(rect.max_x, edges.max_x),
            snap(rect.max_y, edges.max_y),
        )
    }
}

/// Never snaps to objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObjectSnap;

impl ObjectSnapper for NoObjectSnap {
    fn snap_move(&self, _: Rect, _: &[&Element], _: f64) -> ObjectSnapResult {
        ObjectSnapResult::default()
    }

    fn snap_resize(&self, _: Rect, _: &[&Element], _: f64, _: SnapEdges) -> ObjectSnapResult {
        ObjectSnapResult::default()
    }
}

/// Aligns min, center and max lines to the nearest reference within range.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeObjectSnapper;

#[derive(Debug, Clone, Copy)]
struct Alignment {
    offset: f64,
    line: f64,
    reference: Rect,
}

fn best_alignment(
    targets: &[f64],
    references: &[&Element],
    snap_distance: f64,
    lines: impl Fn(&Rect) -> [f64; 3],
) -> Option<Alignment> {
    let mut best: Option<Alignment> = None;
    for element in references {
        let reference = element.rotated_aabb();
        for line in lines(&reference) {
            for target in targets {
                let offset = line - target;
                let better = best.map_or(true, |b| offset.abs() < b.offset.abs());
                if offset.abs() <= snap_distance && better {
                    best = Some(Alignment {
                        offset,
                        line,
                        reference,
                    });
                }
            }
        }
    }
    best
}

fn x_lines(r: &Rect) -> [f64; 3] {
    [r.min_x, r.center().x, r.max_x]
}

fn y_lines(r: &Rect) -> [f64; 3] {
    [r.min_y, r.center().y, r.max_y]
}

fn guide(axis: Axis, a: Alignment, target: &Rect) -> SnapGuide {
    let (start, end) = match axis {
        Axis::X => (
            Point::new(a.line, target.min_y.min(a.reference.min_y)),
            Point::new(a.line, target.max_y.max(a.reference.max_y)),
        ),
        Axis::Y => (
            Point::new(target.min_x.min(a.reference.min_x), a.line),
            Point::new(target.max_x.max(a.reference.max_x), a.line),
        ),
    };
    SnapGuide {
        kind: SnapGuideKind::Point,
        axis,
        start,
        end,
        markers: vec![start, end],
        label: None,
    }
}

fn assemble(target: Rect, x: Option<Alignment>, y: Option<Alignment>) -> ObjectSnapResult {
    let dx = x.map_or(0.0, |a| a.offset);
    let dy = y.map_or(0.0, |a| a.offset);
    let snapped = target.translate(dx, dy);
    let guides = x
        .map(|a| guide(Axis::X, a, &snapped))
        .into_iter()
        .chain(y.map(|a| guide(Axis::Y, a, &snapped)))
        .collect();
    ObjectSnapResult {
        has_snap: x.is_some() || y.is_some(),
        dx,
        dy,
        guides,
    }
}

impl ObjectSnapper for EdgeObjectSnapper {
    fn snap_move(
        &self,
        target: Rect,
        references: &[&Element],
        snap_distance: f64,
    ) -> ObjectSnapResult {
        let x = best_alignment(&x_lines(&target), references, snap_distance, x_lines);
        let y = best_alignment(&y_lines(&target), references, snap_distance, y_lines);
        assemble(target, x, y)
    }

    fn snap_resize(
        &self,
        target: Rect,
        references: &[&Element],
        snap_distance: f64,
        edges: SnapEdges,
    ) -> ObjectSnapResult {
        let xs: Vec<f64> = [(edges.min_x, target.min_x), (edges.max_x, target.max_x)]
            .into_iter()
            .filter_map(|(on, v)| on.then_some(v))
            .collect();
        let ys: Vec<f64> = [(edges.min_y, target.min_y), (edges.max_y, target.max_y)]
            .into_iter()
            .filter_map(|(on, v)| on.then_some(v))
            .collect();
        let x = best_alignment(&xs, references, snap_distance, x_lines);
        let y = best_alignment(&ys, references, snap_distance, y_lines);
        assemble(target, x, y)
    }
}
