//! Per-update transform values.
//!
//! A transform expresses the delta from the session's start snapshot, not
//! absolute geometry. Transforms are replaced on every update, never
//! mutated in place.

use std::fmt;

use canvas_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::operation::OperationId;

/// Translation delta of a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTransform {
    /// Horizontal displacement.
    pub dx: f64,
    /// Vertical displacement.
    pub dy: f64,
}

impl MoveTransform {
    /// A move by `(dx, dy)`.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Whether the move displaces nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// A resolved resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedResize {
    /// New selection bounds, in the selection's unrotated frame.
    pub new_bounds: Rect,
    /// Horizontal scale in the selection frame; negative when flipped.
    pub scale_x: f64,
    /// Vertical scale in the selection frame; negative when flipped.
    pub scale_y: f64,
    /// World point that stays fixed.
    pub anchor: Point,
}

/// Resize delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResizeTransform {
    /// No usable anchor yet.
    Incomplete {
        /// Last pointer position seen.
        last_position: Point,
    },
    /// A resolved scale about an anchor.
    Complete(ResolvedResize),
}

impl ResizeTransform {
    /// Whether the resize has no visible effect for `start_bounds`.
    #[must_use]
    pub fn is_identity_for(&self, start_bounds: &Rect) -> bool {
        match self {
            Self::Incomplete { .. } => true,
            Self::Complete(r) => {
                r.scale_x == 1.0 && r.scale_y == 1.0 && r.new_bounds.approx_eq(start_bounds)
            }
        }
    }

    /// The resolved resize, if any.
    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedResize> {
        match self {
            Self::Incomplete { .. } => None,
            Self::Complete(r) => Some(r),
        }
    }
}

/// Rotation delta with continuous accumulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotateTransform {
    /// Unsnapped angle accumulated from per-update shortest deltas.
    pub raw_accumulated_angle: f64,
    /// Angle actually applied, after discrete snapping.
    pub applied_angle: f64,
    /// Raw pointer angle at the previous update.
    pub last_raw_angle: f64,
}

impl RotateTransform {
    /// A fresh rotation starting at pointer angle `start_angle`.
    #[must_use]
    pub const fn starting_at(start_angle: f64) -> Self {
        Self {
            raw_accumulated_angle: 0.0,
            applied_angle: 0.0,
            last_raw_angle: start_angle,
        }
    }

    /// Whether no rotation is applied.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.applied_angle == 0.0
    }
}

/// Ordered list of at most one transform per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeTransform {
    members: Vec<EditTransform>,
    /// Kind of the most recently merged member.
    #[serde(default)]
    active: Option<TransformKind>,
    /// Latest rotate member merged, kept when optimization drops it.
    #[serde(default)]
    last_rotation: Option<RotateTransform>,
}

impl CompositeTransform {
    /// An empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[EditTransform] {
        &self.members
    }

    /// Kind of the most recently merged member, kept even if that member
    /// was later dropped as identity.
    #[must_use]
    pub const fn active(&self) -> Option<TransformKind> {
        self.active
    }

    /// The latest rotate member merged, including one since dropped as
    /// identity. Carries the raw angle a snapped rotation accumulates.
    #[must_use]
    pub const fn last_rotation(&self) -> Option<RotateTransform> {
        self.last_rotation
    }

    /// Replace the member of the same kind, or append a new kind.
    /// Nested composites are flattened member by member.
    #[must_use]
    pub fn merged(&self, member: EditTransform) -> Self {
        let mut next = self.clone();
        next.merge_in_place(member);
        next
    }

    fn merge_in_place(&mut self, member: EditTransform) {
        if let EditTransform::Composite(inner) = member {
            for m in inner.members {
                self.merge_in_place(m);
            }
            return;
        }
        let kind = member.kind();
        self.active = Some(kind);
        if let EditTransform::Rotate(r) = &member {
            self.last_rotation = Some(*r);
        }
        match self.members.iter_mut().find(|m| m.kind() == kind) {
            Some(slot) => *slot = member,
            None => self.members.push(member),
        }
    }

    /// Drop identity members.
    #[must_use]
    pub fn optimized(&self) -> Self {
        Self {
            members: self
                .members
                .iter()
                .filter(|m| !m.is_structural_identity())
                .cloned()
                .collect(),
            active: self.active,
            last_rotation: self.last_rotation,
        }
    }

    /// The move member, if present.
    #[must_use]
    pub fn move_member(&self) -> Option<&MoveTransform> {
        self.members.iter().find_map(|m| match m {
            EditTransform::Move(t) => Some(t),
            _ => None,
        })
    }

    /// The resize member, if present.
    #[must_use]
    pub fn resize_member(&self) -> Option<&ResizeTransform> {
        self.members.iter().find_map(|m| match m {
            EditTransform::Resize(t) => Some(t),
            _ => None,
        })
    }

    /// The rotate member, if present.
    #[must_use]
    pub fn rotate_member(&self) -> Option<&RotateTransform> {
        self.members.iter().find_map(|m| match m {
            EditTransform::Rotate(t) => Some(t),
            _ => None,
        })
    }

    /// Total applied rotation across members.
    #[must_use]
    pub fn applied_rotation(&self) -> f64 {
        self.members
            .iter()
            .map(|m| match m {
                EditTransform::Rotate(t) => t.applied_angle,
                EditTransform::Composite(c) => c.applied_rotation(),
                _ => 0.0,
            })
            .sum()
    }

    /// Whether no member has an effect.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.members.iter().all(EditTransform::is_structural_identity)
    }
}

/// Discriminant of [`EditTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// [`MoveTransform`].
    Move,
    /// [`ResizeTransform`].
    Resize,
    /// [`RotateTransform`].
    Rotate,
    /// [`CompositeTransform`].
    Composite,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Rotate => "rotate",
            Self::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// The current delta of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EditTransform {
    /// Translation.
    Move(MoveTransform),
    /// Scale about an anchor.
    Resize(ResizeTransform),
    /// Rotation about the selection pivot.
    Rotate(RotateTransform),
    /// Combination used by free transform.
    Composite(CompositeTransform),
}

impl EditTransform {
    /// The transform's kind.
    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        match self {
            Self::Move(_) => TransformKind::Move,
            Self::Resize(_) => TransformKind::Resize,
            Self::Rotate(_) => TransformKind::Rotate,
            Self::Composite(_) => TransformKind::Composite,
        }
    }

    // Identity without reference to start bounds: a complete resize with
    // unit scale is treated as a no-op, an incomplete one always is.
    fn is_structural_identity(&self) -> bool {
        match self {
            Self::Move(t) => t.is_identity(),
            Self::Resize(ResizeTransform::Incomplete { .. }) => true,
            Self::Resize(ResizeTransform::Complete(r)) => r.scale_x == 1.0 && r.scale_y == 1.0,
            Self::Rotate(t) => t.is_identity(),
            Self::Composite(c) => c.is_identity(),
        }
    }

    fn mismatch(&self, operation: OperationId) -> EditError {
        EditError::TransformMismatch {
            operation,
            found: self.kind(),
        }
    }

    /// Downcast for `operation`, which expects a move.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::TransformMismatch`] for any other variant.
    pub fn as_move(&self, operation: OperationId) -> EditResult<&MoveTransform> {
        match self {
            Self::Move(t) => Ok(t),
            other => Err(other.mismatch(operation)),
        }
    }

    /// Downcast for `operation`, which expects a resize.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::TransformMismatch`] for any other variant.
    pub fn as_resize(&self, operation: OperationId) -> EditResult<&ResizeTransform> {
        match self {
            Self::Resize(t) => Ok(t),
            other => Err(other.mismatch(operation)),
        }
    }

    /// Downcast for `operation`, which expects a rotation.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::TransformMismatch`] for any other variant.
    pub fn as_rotate(&self, operation: OperationId) -> EditResult<&RotateTransform> {
        match self {
            Self::Rotate(t) => Ok(t),
            other => Err(other.mismatch(operation)),
        }
    }

    /// Downcast for `operation`, which expects a composite.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::TransformMismatch`] for any other variant.
    pub fn as_composite(&self, operation: OperationId) -> EditResult<&CompositeTransform> {
        match self {
            Self::Composite(t) => Ok(t),
            other => Err(other.mismatch(operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resize(scale: f64) -> EditTransform {
        EditTransform::Resize(ResizeTransform::Complete(ResolvedResize {
            new_bounds: Rect::new(0.0, 0.0, 10.0 * scale, 10.0 * scale),
            scale_x: scale,
            scale_y: scale,
            anchor: Point::ZERO,
        }))
    }

    #[test]
    fn test_merge_replaces_same_kind_in_place() {
        let composite = CompositeTransform::new()
            .merged(EditTransform::Move(MoveTransform::new(1.0, 1.0)))
            .merged(resize(2.0))
            .merged(EditTransform::Move(MoveTransform::new(5.0, 0.0)));

        assert_eq!(composite.members().len(), 2);
        assert_eq!(composite.members()[0].kind(), TransformKind::Move);
        assert_eq!(composite.move_member(), Some(&MoveTransform::new(5.0, 0.0)));
        assert_eq!(composite.active(), Some(TransformKind::Move));
    }

    #[test]
    fn test_merge_flattens_nested_composite() {
        let inner = CompositeTransform::new()
            .merged(EditTransform::Move(MoveTransform::new(1.0, 0.0)))
            .merged(EditTransform::Rotate(RotateTransform {
                raw_accumulated_angle: 0.5,
                applied_angle: 0.5,
                last_raw_angle: 0.5,
            }));
        let outer = CompositeTransform::new()
            .merged(EditTransform::Move(MoveTransform::new(9.0, 9.0)))
            .merged(EditTransform::Composite(inner));

        assert_eq!(outer.members().len(), 2);
        assert_eq!(outer.move_member(), Some(&MoveTransform::new(1.0, 0.0)));
        assert!((outer.applied_rotation() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_optimize_drops_identity_members() {
        let composite = CompositeTransform::new()
            .merged(EditTransform::Move(MoveTransform::default()))
            .merged(resize(1.0))
            .merged(EditTransform::Rotate(RotateTransform::starting_at(1.0)))
            .optimized();
        assert!(composite.members().is_empty());
        assert!(composite.is_identity());
        assert_eq!(composite.active(), Some(TransformKind::Rotate));
        assert_eq!(composite.last_rotation(), Some(RotateTransform::starting_at(1.0)));
    }

    #[test]
    fn test_downcast_mismatch_is_error() {
        let t = EditTransform::Move(MoveTransform::new(1.0, 0.0));
        let err = t.as_rotate(OperationId::Rotate).expect_err("must not coerce");
        assert!(matches!(
            err,
            EditError::TransformMismatch {
                found: TransformKind::Move,
                ..
            }
        ));
    }
}
