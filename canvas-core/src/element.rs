//! Canvas elements - the building blocks of documents.
//!
//! Elements are immutable value snapshots: every geometry change produces a
//! new [`Element`] that replaces the old one wholesale.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an arrow is routed between its endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowRouting {
    /// Free polyline between the endpoints.
    #[default]
    Straight,
    /// Orthogonal route recomputed whenever an endpoint moves.
    Elbow,
}

/// Arrow payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowData {
    /// Polyline points, in the element's unrotated world frame.
    pub points: Vec<Point>,
    /// Element the first point is bound to.
    pub start_binding: Option<ElementId>,
    /// Element the last point is bound to.
    pub end_binding: Option<ElementId>,
    /// Routing style.
    pub routing: ArrowRouting,
}

impl ArrowData {
    /// First point of the arrow.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last point of the arrow.
    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Orthogonal route from `start` to `end` with a vertical segment at mid-x.
    #[must_use]
    pub fn elbow_route(start: Point, end: Point) -> Vec<Point> {
        if start.x == end.x || start.y == end.y {
            return vec![start, end];
        }
        let mid_x = (start.x + end.x) / 2.0;
        vec![
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        ]
    }

    /// Replace the endpoints, keeping interior points for straight arrows
    /// and re-routing elbow arrows.
    #[must_use]
    pub fn with_endpoints(&self, start: Point, end: Point) -> Self {
        let points = match self.routing {
            ArrowRouting::Elbow => Self::elbow_route(start, end),
            ArrowRouting::Straight => {
                let mut points = self.points.clone();
                if points.len() < 2 {
                    points = vec![start, end];
                } else {
                    let last = points.len() - 1;
                    points[0] = start;
                    points[last] = end;
                }
                points
            }
        };
        Self {
            points,
            ..self.clone()
        }
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ElementKind {
    /// A rectangle.
    Rectangle,

    /// An ellipse inscribed in the bounds.
    Ellipse,

    /// A diamond inscribed in the bounds.
    Diamond,

    /// A text label.
    Text {
        /// Text content.
        content: String,
        /// Font size in world units.
        font_size: f64,
    },

    /// A freeform polyline.
    Line {
        /// Points in the element's unrotated world frame.
        points: Vec<Point>,
    },

    /// An arrow, optionally bound to other elements at either end.
    Arrow(ArrowData),
}

impl ElementKind {
    fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            Self::Line { points } => Self::Line {
                points: points.iter().copied().map(f).collect(),
            },
            Self::Arrow(arrow) => Self::Arrow(ArrowData {
                points: arrow.points.iter().copied().map(f).collect(),
                ..arrow.clone()
            }),
            other => other.clone(),
        }
    }
}

/// A canvas element with content and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Unrotated world-space bounds.
    pub bounds: Rect,
    /// Rotation in radians about the bounds center.
    pub rotation: f64,
    /// Opacity (0.0 = fully transparent).
    pub opacity: f64,
    /// Z-index for layering.
    pub z_index: i32,
    /// Arrows whose endpoints are bound to this element.
    #[serde(default)]
    pub bound_arrows: Vec<ElementId>,
}

impl Element {
    /// Create a new element with the given kind and bounds.
    #[must_use]
    pub fn new(kind: ElementKind, bounds: Rect) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            bounds,
            rotation: 0.0,
            opacity: 1.0,
            z_index: 0,
            bound_arrows: Vec::new(),
        }
    }

    /// Create an arrow through `points`; bounds are derived from the points.
    #[must_use]
    pub fn arrow(points: Vec<Point>, routing: ArrowRouting) -> Self {
        let bounds = Rect::bounding(points.iter().copied()).unwrap_or_default();
        Self::new(
            ElementKind::Arrow(ArrowData {
                points,
                start_binding: None,
                end_binding: None,
                routing,
            }),
            bounds,
        )
    }

    /// Set the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Center of the bounds (the rotation pivot).
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// World-space axis-aligned bounds of the rotated element.
    #[must_use]
    pub fn rotated_aabb(&self) -> Rect {
        self.bounds.rotated_bounds(self.rotation)
    }

    /// Whether the element is drawn at all.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// The arrow payload, if this element is an arrow.
    #[must_use]
    pub fn as_arrow(&self) -> Option<&ArrowData> {
        match &self.kind {
            ElementKind::Arrow(arrow) => Some(arrow),
            _ => None,
        }
    }

    /// Whether this element is an elbow-routed arrow.
    #[must_use]
    pub fn is_elbow_arrow(&self) -> bool {
        self.as_arrow().is_some_and(|a| a.routing == ArrowRouting::Elbow)
    }

    /// A copy translated by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        self.with_geometry(self.bounds.translate(dx, dy), self.rotation, |p| {
            Point::new(p.x + dx, p.y + dy)
        })
    }

    /// A copy with new bounds and rotation; payload points are carried
    /// through `map`.
    #[must_use]
    pub fn with_geometry(&self, bounds: Rect, rotation: f64, map: impl Fn(Point) -> Point) -> Self {
        Self {
            kind: self.kind.map_points(map),
            bounds,
            rotation,
            ..self.clone()
        }
    }

    /// A copy of an arrow with replaced endpoints; bounds follow the new
    /// route. Non-arrows are returned unchanged.
    #[must_use]
    pub fn with_arrow_endpoints(&self, start: Point, end: Point) -> Self {
        let Some(arrow) = self.as_arrow() else {
            return self.clone();
        };
        let arrow = arrow.with_endpoints(start, end);
        let bounds = Rect::bounding(arrow.points.iter().copied()).unwrap_or(self.bounds);
        Self {
            kind: ElementKind::Arrow(arrow),
            bounds,
            ..self.clone()
        }
    }
}
