//! Rotated local coordinate frames.
//!
//! A [`RotatedSpace`] maps world points into an unrotated frame centered on
//! a pivot, so resize and rotate math can ignore rotation. The frame kind
//! is a type parameter: an offset taken in an element's frame cannot be fed
//! to the multi-select overlay's frame without an explicit conversion.
//!
//! ```text
//! world ──to_local──▶ R(-θ)·(p - origin)
//! local ──to_world──▶ R(θ)·l + origin
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::geometry::{Point, Vector};

/// Frame anchored to a single element (pivot = element center).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFrame {}

/// Frame anchored to the multi-select overlay (pivot = overlay center).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayFrame {}

/// A point expressed in a local frame of kind `F`.
pub struct LocalPoint<F> {
    point: Point,
    frame: PhantomData<F>,
}

/// A vector expressed in a local frame of kind `F`.
pub struct LocalVector<F> {
    vector: Vector,
    frame: PhantomData<F>,
}

// Manual impls so the phantom frame marker needs no bounds.
impl<F> Clone for LocalPoint<F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<F> Copy for LocalPoint<F> {}
impl<F> PartialEq for LocalPoint<F> {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}
impl<F> fmt::Debug for LocalPoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalPoint({}, {})", self.point.x, self.point.y)
    }
}
impl<F> Clone for LocalVector<F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<F> Copy for LocalVector<F> {}
impl<F> PartialEq for LocalVector<F> {
    fn eq(&self, other: &Self) -> bool {
        self.vector == other.vector
    }
}
impl<F> fmt::Debug for LocalVector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalVector({}, {})", self.vector.x, self.vector.y)
    }
}

impl<F> LocalPoint<F> {
    /// Wrap raw local coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            frame: PhantomData,
        }
    }

    /// Raw coordinates in the local frame.
    #[must_use]
    pub const fn raw(self) -> Point {
        self.point
    }

    /// Vector from `other` to `self`, in the same frame.
    #[must_use]
    pub fn sub(self, other: Self) -> LocalVector<F> {
        LocalVector::from_raw(self.point.sub(other.point))
    }

    /// Translate by a local vector.
    #[must_use]
    pub fn offset(self, v: LocalVector<F>) -> Self {
        Self::new(self.point.x + v.vector.x, self.point.y + v.vector.y)
    }
}

impl<F> LocalVector<F> {
    /// Wrap a raw local vector.
    #[must_use]
    pub const fn from_raw(vector: Vector) -> Self {
        Self {
            vector,
            frame: PhantomData,
        }
    }

    /// Raw components in the local frame.
    #[must_use]
    pub const fn raw(self) -> Vector {
        self.vector
    }
}

/// A rotation of angle `θ` about an origin, as a world⇄local mapping.
pub struct RotatedSpace<F> {
    origin: Point,
    angle: f64,
    cos: f64,
    sin: f64,
    frame: PhantomData<F>,
}

/// Coordinate space of a single element.
pub type ElementSpace = RotatedSpace<ElementFrame>;

/// Coordinate space of the multi-select overlay.
pub type OverlaySpace = RotatedSpace<OverlayFrame>;

impl<F> Clone for RotatedSpace<F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<F> Copy for RotatedSpace<F> {}
impl<F> fmt::Debug for RotatedSpace<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatedSpace")
            .field("origin", &self.origin)
            .field("angle", &self.angle)
            .finish()
    }
}

impl<F> RotatedSpace<F> {
    /// Build a space rotated by `angle` radians around `origin`.
    #[must_use]
    pub fn new(origin: Point, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            origin,
            angle,
            cos,
            sin,
            frame: PhantomData,
        }
    }

    /// The pivot of this space.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// The rotation angle of this space.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Whether the space carries no rotation.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        self.angle == 0.0
    }

    /// Map a world point into the local frame.
    #[must_use]
    pub fn to_local(&self, world: Point) -> LocalPoint<F> {
        let d = world.sub(self.origin);
        let v = self.unrotate(d);
        LocalPoint::new(v.x, v.y)
    }

    /// Map a local point back to world space.
    #[must_use]
    pub fn to_world(&self, local: LocalPoint<F>) -> Point {
        let p = local.raw();
        self.origin.offset(self.rotate(Vector::new(p.x, p.y)))
    }

    /// Rotate a world vector into the local frame.
    #[must_use]
    pub fn vector_to_local(&self, world: Vector) -> LocalVector<F> {
        LocalVector::from_raw(self.unrotate(world))
    }

    /// Rotate a local vector into world space.
    #[must_use]
    pub fn vector_to_world(&self, local: LocalVector<F>) -> Vector {
        self.rotate(local.raw())
    }

    fn rotate(&self, v: Vector) -> Vector {
        if self.angle == 0.0 {
            return v;
        }
        Vector::new(v.x * self.cos - v.y * self.sin, v.x * self.sin + v.y * self.cos)
    }

    // Inverse rotation is the transpose of the rotation matrix.
    fn unrotate(&self, v: Vector) -> Vector {
        if self.angle == 0.0 {
            return v;
        }
        Vector::new(v.x * self.cos + v.y * self.sin, -v.x * self.sin + v.y * self.cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_zero_rotation_is_pure_translation() {
        let space = ElementSpace::new(Point::new(50.0, 25.0), 0.0);
        let local = space.to_local(Point::new(60.0, 20.0));
        assert_eq!(local.raw(), Point::new(10.0, -5.0));
        assert_eq!(space.to_world(local), Point::new(60.0, 20.0));
        let v = Vector::new(0.1, 0.7);
        assert_eq!(space.vector_to_local(v).raw(), v);
    }

    #[test]
    fn test_round_trip_rotated() {
        let space = OverlaySpace::new(Point::new(10.0, 20.0), 0.7);
        let world = Point::new(-3.0, 42.0);
        assert!(space.to_world(space.to_local(world)).approx_eq(world));
    }

    #[test]
    fn test_quarter_turn_local_axis() {
        // A point "right" of the pivot in local space is "below" it in world space.
        let space = ElementSpace::new(Point::ZERO, FRAC_PI_2);
        let world = space.to_world(LocalPoint::new(10.0, 0.0));
        assert!(world.approx_eq(Point::new(0.0, 10.0)));
        let v = space.vector_to_local(Vector::new(0.0, 10.0)).raw();
        assert!((v.x - 10.0).abs() < 1e-9 && v.y.abs() < 1e-9);
    }
}
