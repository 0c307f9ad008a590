//! Geometry primitives - points, vectors, rectangles and rotation math.
//!
//! All coordinates are world units (`f64`). Angles are radians, positive
//! angles rotate clockwise in a y-down canvas.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing geometry for identity.
pub const EPSILON: f64 = 1e-9;

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// A displacement in 2D space (no position).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `other` to `self`.
    #[must_use]
    pub fn sub(self, other: Self) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Translate by a vector.
    #[must_use]
    pub fn offset(self, v: Vector) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }

    /// Rotate this point around `pivot` by `angle` radians.
    #[must_use]
    pub fn rotate_around(self, pivot: Self, angle: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        pivot.offset(self.sub(pivot).rotate(angle))
    }

    /// Scale this point away from `anchor` by independent factors.
    #[must_use]
    pub fn scale_from(self, anchor: Self, sx: f64, sy: f64) -> Self {
        Self::new(
            anchor.x + (self.x - anchor.x) * sx,
            anchor.y + (self.y - anchor.y) * sy,
        )
    }

    /// Angle of the vector from `pivot` to this point.
    #[must_use]
    pub fn angle_from(self, pivot: Self) -> f64 {
        (self.y - pivot.y).atan2(self.x - pivot.x)
    }

    /// Approximate equality within [`EPSILON`].
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component-wise sum.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Negated vector.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// Rotate this vector by `angle` radians (no translation).
    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// An axis-aligned rectangle stored as min/max edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Rect {
    /// Create a rectangle from its edges.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Rectangle of the given size centered on `center`.
    #[must_use]
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    /// Smallest rectangle containing every point, or `None` when empty.
    #[must_use]
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(iter.fold(init, |r, p| {
            Self::new(r.min_x.min(p.x), r.min_y.min(p.y), r.max_x.max(p.x), r.max_y.max(p.y))
        }))
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Whether the rectangle encloses no area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width() <= EPSILON || self.height() <= EPSILON
    }

    /// Corners in clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Axis-aligned bounds of this rectangle rotated by `angle` around its center.
    #[must_use]
    pub fn rotated_bounds(&self, angle: f64) -> Self {
        if angle == 0.0 {
            return *self;
        }
        let center = self.center();
        Self::bounding(self.corners().map(|c| c.rotate_around(center, angle))).unwrap_or(*self)
    }

    /// Approximate equality within [`EPSILON`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.min_x - other.min_x).abs() <= EPSILON
            && (self.min_y - other.min_y).abs() <= EPSILON
            && (self.max_x - other.max_x).abs() <= EPSILON
            && (self.max_y - other.max_y).abs() <= EPSILON
    }
}

/// Normalize an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if (TAU - a).abs() <= EPSILON {
        0.0
    } else {
        a
    }
}

/// Signed shortest delta from `from` to `to`, in `(-π, π]`.
#[must_use]
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let mut delta = (to - from).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_around_quarter_turn() {
        let p = Point::new(10.0, 0.0).rotate_around(Point::ZERO, FRAC_PI_2);
        assert!(p.approx_eq(Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_rotate_zero_is_exact() {
        let p = Point::new(0.1, 0.2);
        assert_eq!(p.rotate_around(Point::new(5.0, 5.0), 0.0), p);
    }

    #[test]
    fn test_scale_from_anchor() {
        let p = Point::new(10.0, 10.0).scale_from(Point::ZERO, 1.5, 0.5);
        assert!(p.approx_eq(Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_rect_translate_and_center() {
        let r = Rect::new(0.0, 0.0, 20.0, 20.0).translate(10.0, -5.0);
        assert_eq!(r, Rect::new(10.0, -5.0, 30.0, 15.0));
        assert!(r.center().approx_eq(Point::new(20.0, 5.0)));
    }

    #[test]
    fn test_rotated_bounds_quarter_turn_swaps_extent() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0).rotated_bounds(FRAC_PI_2);
        assert!((r.width() - 50.0).abs() < 1e-6);
        assert!((r.height() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_shortest_delta_crosses_pi() {
        let from = PI - 0.1;
        let to = -PI + 0.1;
        assert!((shortest_angle_delta(from, to) - 0.2).abs() < 1e-9);
        assert!((shortest_angle_delta(to, from) + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-9);
        assert_eq!(normalize_angle(TAU), 0.0);
    }

    #[test]
    fn test_degenerate_rect() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }
}
