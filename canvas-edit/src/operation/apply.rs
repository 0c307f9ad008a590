//! Element geometry shared by the operations.
//!
//! Every function takes an element whose geometry already equals its
//! session snapshot and returns a replacement; nothing is mutated.

use canvas_core::{normalize_angle, Element, LocalPoint, Point, Rect, RotatedSpace};

use crate::context::ElementSnapshot;
use crate::transform::ResolvedResize;

/// The element with its snapshot geometry restored.
///
/// The document may have moved on since the session started; all deltas
/// are applied to the snapshot, never to the live geometry.
pub(crate) fn rebase(element: &Element, snapshot: &ElementSnapshot) -> Element {
    if element.bounds == snapshot.bounds && element.rotation == snapshot.rotation {
        return element.clone();
    }
    let shift = snapshot.center.sub(element.center());
    element.with_geometry(snapshot.bounds, snapshot.rotation, |p| p.offset(shift))
}

/// Rotate `element` about `pivot` by `angle`.
///
/// Elbow arrows keep their rotation: their endpoints are rotated and the
/// route is recomputed.
pub(crate) fn rotate_about(element: &Element, pivot: Point, angle: f64) -> Element {
    if angle == 0.0 {
        return element.clone();
    }
    let center = element.center();
    if let Some(arrow) = element.as_arrow().filter(|_| element.is_elbow_arrow()) {
        let (Some(start), Some(end)) = (arrow.start(), arrow.end()) else {
            return element.clone();
        };
        let turn = |p: Point| {
            p.rotate_around(center, element.rotation)
                .rotate_around(pivot, angle)
                .rotate_around(center, -element.rotation)
        };
        return element.with_arrow_endpoints(turn(start), turn(end));
    }
    let shift = center.rotate_around(pivot, angle).sub(center);
    element.with_geometry(
        element.bounds.translate(shift.x, shift.y),
        normalize_angle(element.rotation + angle),
        |p| p.offset(shift),
    )
}

/// Scale `element` inside `space` about the resolved anchor.
pub(crate) fn resize_in<F>(
    element: &Element,
    space: &RotatedSpace<F>,
    resize: &ResolvedResize,
) -> Element {
    let (sx, sy) = (resize.scale_x, resize.scale_y);
    let anchor = space.to_local(resize.anchor).raw();
    let old_center = element.center();
    let scale = |world: Point| {
        let local = space.to_local(world).raw().scale_from(anchor, sx, sy);
        space.to_world(LocalPoint::new(local.x, local.y))
    };
    let new_center = scale(old_center);

    let relative = element.rotation - space.angle();
    let (ax, ay) = (sx.abs(), sy.abs());
    // Nearer a quarter turn, the element's width lies along the frame's y axis.
    let (wx, hy) = if relative.sin().abs() > relative.cos().abs() {
        (ay, ax)
    } else {
        (ax, ay)
    };
    let bounds = Rect::from_center(
        new_center,
        element.bounds.width() * wx,
        element.bounds.height() * hy,
    );
    let rotation = if (sx < 0.0) != (sy < 0.0) {
        normalize_angle(space.angle() - relative)
    } else {
        element.rotation
    };

    let resized = element.with_geometry(bounds, rotation, |p| {
        scale(p.rotate_around(old_center, element.rotation)).rotate_around(new_center, -rotation)
    });
    match resized.as_arrow() {
        Some(arrow) if resized.is_elbow_arrow() => match (arrow.start(), arrow.end()) {
            (Some(start), Some(end)) => resized.with_arrow_endpoints(start, end),
            _ => resized,
        },
        _ => resized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{ArrowRouting, ElementKind, ElementSpace};
    use std::f64::consts::FRAC_PI_2;

    fn rect(bounds: Rect) -> Element {
        Element::new(ElementKind::Rectangle, bounds)
    }

    #[test]
    fn test_rebase_restores_snapshot() {
        let original = rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let snapshot = ElementSnapshot::from(&original);
        let drifted = original.translated(7.0, 7.0).with_rotation(0.4);
        assert_eq!(rebase(&drifted, &snapshot), original.with_rotation(0.0));
    }

    #[test]
    fn test_rotate_about_moves_center_and_adds_rotation() {
        let e = rect(Rect::new(90.0, 40.0, 110.0, 60.0));
        let rotated = rotate_about(&e, Point::new(50.0, 50.0), FRAC_PI_2);
        assert!(rotated.center().approx_eq(Point::new(50.0, 100.0)));
        assert!((rotated.rotation - FRAC_PI_2).abs() < 1e-12);
        assert!((rotated.bounds.width() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_about_reroutes_elbow_arrow() {
        let arrow = Element::arrow(
            vec![Point::new(60.0, 50.0), Point::new(100.0, 50.0)],
            ArrowRouting::Elbow,
        );
        let rotated = rotate_about(&arrow, Point::new(50.0, 50.0), FRAC_PI_2);
        assert_eq!(rotated.rotation, 0.0);
        let data = rotated.as_arrow().expect("arrow");
        assert!(data.start().expect("start").approx_eq(Point::new(50.0, 60.0)));
        assert!(data.end().expect("end").approx_eq(Point::new(50.0, 100.0)));
    }

    #[test]
    fn test_resize_in_axis_aligned_space() {
        let e = rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        let space = ElementSpace::new(e.center(), 0.0);
        let resize = ResolvedResize {
            new_bounds: Rect::new(0.0, 0.0, 150.0, 50.0),
            scale_x: 1.5,
            scale_y: 1.0,
            anchor: Point::new(0.0, 0.0),
        };
        let resized = resize_in(&e, &space, &resize);
        assert!(resized.bounds.approx_eq(&Rect::new(0.0, 0.0, 150.0, 50.0)));
    }

    #[test]
    fn test_resize_in_single_flip_mirrors_rotation() {
        let e = rect(Rect::new(0.0, 0.0, 10.0, 10.0)).with_rotation(0.3);
        let space = ElementSpace::new(Point::new(50.0, 50.0), 0.0);
        let resize = ResolvedResize {
            new_bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            scale_x: -1.0,
            scale_y: 1.0,
            anchor: Point::new(50.0, 50.0),
        };
        let resized = resize_in(&e, &space, &resize);
        assert!((resized.rotation - normalize_angle(-0.3)).abs() < 1e-12);
        assert!(resized.center().approx_eq(Point::new(95.0, 5.0)));
    }
}
