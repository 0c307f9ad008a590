//! Rotation Accumulation Properties
//!
//! A pointer that circles the pivot once, in any number of steps smaller
//! than half a turn, must accumulate exactly one full turn.

use canvas_core::{Document, Element, ElementKind, Point, Rect};
use canvas_edit::{
    AppState, EditAction, EditEngine, EditParams, EditTransform, OperationId, PointerInput,
};
use proptest::prelude::*;
use std::f64::consts::TAU;

const PIVOT: Point = Point::new(50.0, 50.0);
const RADIUS: f64 = 50.0;

fn on_circle(angle: f64) -> Point {
    Point::new(PIVOT.x + RADIUS * angle.cos(), PIVOT.y + RADIUS * angle.sin())
}

/// Step sizes summing to one full turn; each is below half a turn.
fn arb_turn() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..1.0, 16..64).prop_map(|weights| {
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total * TAU).collect()
    })
}

/// Rotate a square about its center through `steps`, returning the final
/// transform and the committed element rotation.
fn rotate_through(start_angle: f64, direction: f64, steps: &[f64]) -> (EditTransform, f64) {
    let element = Element::new(ElementKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
    let id = element.id;
    let state = AppState::new(Document::from_elements([element])).with_selection([id]);
    let mut engine = EditEngine::new();

    let mut state = engine
        .dispatch(
            &state,
            EditAction::StartEdit {
                operation: OperationId::Rotate,
                position: on_circle(start_angle),
                params: EditParams::default(),
            },
        )
        .expect("start");
    let mut angle = start_angle;
    for step in steps {
        angle += direction * step;
        state = engine
            .dispatch(&state, EditAction::UpdateEdit(PointerInput::at(on_circle(angle))))
            .expect("update");
    }
    let transform = state.session().expect("editing").transform.clone();
    let state = engine.dispatch(&state, EditAction::FinishEdit).expect("finish");
    let rotation = state.document.get_element(id).map_or(f64::NAN, |e| e.rotation);
    (transform, rotation)
}

proptest! {
    #[test]
    fn prop_full_circle_accumulates_one_turn(
        steps in arb_turn(),
        start_angle in -3.0f64..3.0,
        clockwise in any::<bool>(),
    ) {
        let direction = if clockwise { 1.0 } else { -1.0 };
        let (transform, rotation) = rotate_through(start_angle, direction, &steps);

        let EditTransform::Rotate(rotate) = transform else {
            panic!("rotate session must hold a rotate transform");
        };
        prop_assert!(
            (rotate.raw_accumulated_angle - direction * TAU).abs() < 1e-9,
            "accumulated {} after {} steps",
            rotate.raw_accumulated_angle,
            steps.len()
        );
        prop_assert_eq!(rotate.applied_angle, rotate.raw_accumulated_angle);

        // A full turn leaves the committed element where it started.
        prop_assert!(rotation.sin().abs() < 1e-9 && rotation.cos() > 0.0);
    }

    #[test]
    fn prop_partial_sweep_matches_pointer(
        steps in prop::collection::vec(0.01f64..0.5, 1..12),
        start_angle in -3.0f64..3.0,
    ) {
        let (transform, _) = rotate_through(start_angle, 1.0, &steps);
        let EditTransform::Rotate(rotate) = transform else {
            panic!("rotate session must hold a rotate transform");
        };
        let swept: f64 = steps.iter().sum();
        prop_assert!((rotate.raw_accumulated_angle - swept).abs() < 1e-9);
    }
}
