//! Drag session behaviour: anchors, rotation snapping, notifications and
//! mode changes mid-drag.

use proptest::prelude::*;
use shapekit_core::{shared, Bounds, Point, SharedVec};
use shapekit_shape::{DrawableShape, GeometryChange, OperationMode, PartCode};
use std::f64::consts::FRAC_PI_4;

fn recorder(shape: &DrawableShape) -> SharedVec<GeometryChange> {
    let log: SharedVec<GeometryChange> = shared(Vec::new());
    let sink = log.clone();
    shape.subscribe(move |change| sink.borrow_mut().push(change.clone()));
    log
}

#[test]
fn test_drag_notifies_once_at_end() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 50.0));
    let log = recorder(&shape);
    let before = shape.snapshot();

    for i in 1..=20 {
        let p = Point::new(100.0 + i as f64, 50.0 + i as f64);
        shape.move_knob(PartCode::TOP_RIGHT, p, false, false).unwrap();
    }
    assert!(log.borrow().is_empty());

    let change = shape.end_drag().unwrap();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(change.action, "Resize");
    assert_eq!(change.before, before);
    assert_eq!(change.after, shape.snapshot());
    assert_eq!(change.shape, shape.id());
}

#[test]
fn test_restore_undoes_drag() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 50.0));
    shape
        .move_knob(PartCode::BOTTOM, Point::new(50.0, -40.0), false, false)
        .unwrap();
    let change = shape.end_drag().unwrap();
    shape.restore(&change.before);
    assert_eq!(shape.snapshot(), change.before);
    shape.restore(&change.after);
    assert_eq!(shape.snapshot(), change.after);
}

#[test]
fn test_mode_change_cancels_drag() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 50.0));
    let log = recorder(&shape);
    let original = *shape.state();

    shape
        .move_knob(PartCode::RIGHT, Point::new(300.0, 25.0), false, false)
        .unwrap();
    shape.set_operation_mode(OperationMode::FreeDistort);

    assert!(!shape.is_dragging());
    assert_eq!(shape.scale(), original.scale);
    assert_eq!(shape.location(), original.location);
    assert_eq!(shape.operation_mode(), OperationMode::FreeDistort);
    let actions: Vec<String> = log.borrow().iter().map(|c| c.action.clone()).collect();
    assert_eq!(actions, vec!["Change Mode".to_string()]);
}

#[test]
fn test_rotation_drag_about_location() {
    let mut shape = DrawableShape::from_rect(Bounds::new(-10.0, -10.0, 10.0, 10.0));
    shape.rotate_using_reference_point(Point::new(-50.0, 0.0), false).unwrap();
    assert!((shape.rotation_angle() - 2.0 * FRAC_PI_4).abs() < 1e-9);
    assert_eq!(shape.location(), Point::ORIGIN);
    assert_eq!(shape.end_drag().unwrap().action, "Rotate");
}

#[test]
fn test_rotation_step_follows_setting() {
    let mut shape = DrawableShape::from_rect(Bounds::new(-10.0, -10.0, 10.0, 10.0));
    shape.set_angular_constraint_angle(std::f64::consts::FRAC_PI_6);
    // knob straight up; drag to 100 degrees from +x, a 10 degree turn
    let a = 100f64.to_radians();
    shape
        .rotate_using_reference_point(Point::new(a.cos() * 40.0, a.sin() * 40.0), true)
        .unwrap();
    assert_eq!(shape.rotation_angle(), 0.0);
    let a = 110f64.to_radians();
    shape
        .rotate_using_reference_point(Point::new(a.cos() * 40.0, a.sin() * 40.0), true)
        .unwrap();
    assert!((shape.rotation_angle() - std::f64::consts::FRAC_PI_6).abs() < 1e-12);
}

#[test]
fn test_hit_test_ignores_size_knobs_while_rotating() {
    let mut shape = DrawableShape::from_rect(Bounds::new(-10.0, -10.0, 10.0, 10.0));
    assert_eq!(
        shape.hit_part(Point::new(10.0, 10.0)).unwrap(),
        PartCode::TOP_RIGHT
    );
    shape
        .begin_drag(PartCode::ROTATION, shape.rotation_knob_point())
        .unwrap();
    assert_eq!(shape.hit_part(Point::new(10.0, 10.0)).unwrap(), PartCode::NONE);
    assert_eq!(
        shape.hit_part(shape.rotation_knob_point()).unwrap(),
        PartCode::ROTATION
    );
    shape.end_drag();
    assert_eq!(
        shape.hit_part(Point::new(10.0, 10.0)).unwrap(),
        PartCode::TOP_RIGHT
    );
}

const CORNERS: [PartCode; 4] = [
    PartCode::TOP_LEFT,
    PartCode::TOP_RIGHT,
    PartCode::BOTTOM_RIGHT,
    PartCode::BOTTOM_LEFT,
];

fn opposite(pc: PartCode) -> PartCode {
    match pc {
        PartCode::TOP_LEFT => PartCode::BOTTOM_RIGHT,
        PartCode::TOP_RIGHT => PartCode::BOTTOM_LEFT,
        PartCode::BOTTOM_RIGHT => PartCode::TOP_LEFT,
        _ => PartCode::TOP_RIGHT,
    }
}

proptest! {
    #[test]
    fn prop_corner_resize_keeps_opposite_corner(
        corner in 0usize..4,
        angle in 0.0f64..std::f64::consts::TAU,
        moves in prop::collection::vec((-300.0f64..300.0, -300.0f64..300.0), 1..12),
        constrain in any::<bool>(),
    ) {
        let mut shape = DrawableShape::from_rect(Bounds::new(-40.0, -25.0, 60.0, 35.0));
        shape.rotate_to(angle);
        let pc = CORNERS[corner];
        let fixed = shape.knob_point(opposite(pc)).unwrap();

        for (x, y) in moves {
            shape.move_knob(pc, Point::new(x, y), false, constrain).unwrap();
            let now = shape.knob_point(opposite(pc)).unwrap();
            prop_assert!(now.approx_eq(&fixed, 1e-6), "{} moved to {}", fixed, now);
        }
        shape.end_drag();
        let now = shape.knob_point(opposite(pc)).unwrap();
        prop_assert!(now.approx_eq(&fixed, 1e-6));
    }

    #[test]
    fn prop_constrained_rotation_snaps_to_45(raw_degrees in 22.6f64..67.4) {
        let mut shape = DrawableShape::from_rect(Bounds::new(-10.0, -10.0, 10.0, 10.0));
        let knob = shape.rotation_knob_point();
        let baseline = shape.location().angle_to(&knob);
        let a = baseline + raw_degrees.to_radians();
        let rp = Point::new(a.cos() * 30.0, a.sin() * 30.0);
        shape.rotate_using_reference_point(rp, true).unwrap();
        prop_assert!((shape.rotation_angle() - FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn prop_flip_twice_restores(
        sx in -100.0f64..100.0,
        sy in -100.0f64..100.0,
        ox in -1.0f64..1.0,
        oy in -1.0f64..1.0,
    ) {
        let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
        shape.set_size(shapekit_core::Size::new(sx, sy));
        shape.set_offset(Point::new(ox, oy));
        let before = *shape.state();
        shape.flip_horizontally();
        shape.flip_horizontally();
        prop_assert_eq!(*shape.state(), before);
        shape.flip_vertically();
        shape.flip_vertically();
        prop_assert_eq!(*shape.state(), before);
    }
}
