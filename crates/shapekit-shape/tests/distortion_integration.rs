//! Distort modes: corner drags, warped output and baking back to Standard.

use shapekit_core::{Bounds, Point, ShapeError};
use shapekit_shape::{
    CanonicalPath, DrawableShape, OperationMode, PartCode, Quad, ShapeFactory,
};

fn distorted_square(mode: OperationMode) -> DrawableShape {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
    shape.set_operation_mode(mode);
    shape
}

#[test]
fn test_distort_knob_rejected_in_standard_mode() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
    let err = shape
        .move_knob(PartCode::TOP_RIGHT_DISTORT, Point::new(120.0, 120.0), false, false)
        .unwrap_err();
    assert!(matches!(err, ShapeError::UnsupportedOperationMode { .. }));
}

#[test]
fn test_free_distort_moves_one_corner() {
    let mut shape = distorted_square(OperationMode::FreeDistort);
    assert_eq!(
        shape.knob_point(PartCode::TOP_RIGHT_DISTORT).unwrap(),
        Point::new(100.0, 100.0)
    );

    shape
        .move_knob(PartCode::TOP_RIGHT_DISTORT, Point::new(150.0, 130.0), false, false)
        .unwrap();
    assert!(shape
        .knob_point(PartCode::TOP_RIGHT_DISTORT)
        .unwrap()
        .approx_eq(&Point::new(150.0, 130.0), 1e-9));
    assert_eq!(
        shape.knob_point(PartCode::BOTTOM_LEFT_DISTORT).unwrap(),
        Point::new(0.0, 0.0)
    );
    assert_eq!(shape.end_drag().unwrap().action, "Distort");

    let b = shape.bounds();
    assert!(b.approx_eq(&Bounds::new(0.0, 0.0, 150.0, 130.0), 1e-3), "{}", b);
}

#[test]
fn test_distortion_never_touches_shared_path() {
    let mut factory = ShapeFactory::new();
    let template = factory.rect();
    let mut a = factory.make_shape(&template, Bounds::new(0.0, 0.0, 10.0, 10.0));
    let b = factory.make_shape(&template, Bounds::new(0.0, 0.0, 10.0, 10.0));
    let events_before: Vec<_> = template.path().iter().collect();

    a.set_operation_mode(OperationMode::Perspective);
    a.move_knob(PartCode::TOP_LEFT_DISTORT, Point::new(3.0, 10.0), false, false)
        .unwrap();
    a.end_drag();

    assert!(a.path().ptr_eq(&template));
    assert!(b.path().ptr_eq(&template));
    let events_after: Vec<_> = template.path().iter().collect();
    assert_eq!(events_before, events_after);
    assert_eq!(b.distortion(), None);
}

#[test]
fn test_perspective_makes_trapezoid() {
    let mut shape = distorted_square(OperationMode::Perspective);
    shape
        .move_knob(PartCode::TOP_LEFT_DISTORT, Point::new(20.0, 300.0), false, false)
        .unwrap();
    let tl = shape.knob_point(PartCode::TOP_LEFT_DISTORT).unwrap();
    let tr = shape.knob_point(PartCode::TOP_RIGHT_DISTORT).unwrap();
    assert!(tl.approx_eq(&Point::new(20.0, 100.0), 1e-9));
    assert!(tr.approx_eq(&Point::new(80.0, 100.0), 1e-9));
}

#[test]
fn test_shear_modes_constrain_axes() {
    let mut shape = distorted_square(OperationMode::HorizontalShear);
    shape
        .move_knob(PartCode::BOTTOM_RIGHT_DISTORT, Point::new(130.0, -50.0), false, false)
        .unwrap();
    shape.end_drag();
    let quad = *shape.distortion().unwrap();
    assert!(quad.bottom_left.approx_eq(&Point::new(-0.2, -0.5), 1e-9));
    assert!(quad.bottom_right.approx_eq(&Point::new(0.8, -0.5), 1e-9));
    assert_eq!(quad.top_left, Quad::unit().top_left);

    shape.set_operation_mode(OperationMode::VerticalShear);
    assert_eq!(shape.distortion(), Some(&quad));
}

#[test]
fn test_convex_hull_of_distorted_shape() {
    let mut shape = distorted_square(OperationMode::FreeDistort);
    let mut quad = Quad::unit();
    quad.top_right = Point::new(1.0, 1.0);
    shape.set_distortion(quad).unwrap();
    let hull = shape.convex_hull();
    assert_eq!(hull.len(), 4);
    assert!(hull.iter().any(|p| p.approx_eq(&Point::new(150.0, 150.0), 1e-3)));
}

#[test]
fn test_reset_bounding_box_bakes_distortion() {
    let mut shape = distorted_square(OperationMode::FreeDistort);
    let mut quad = Quad::unit();
    quad.top_right = Point::new(1.0, 1.0);
    shape.set_distortion(quad).unwrap();
    let drawn = shape.bounds();
    let original_path: CanonicalPath = shape.path().clone();

    shape.reset_bounding_box().unwrap();
    assert_eq!(shape.operation_mode(), OperationMode::Standard);
    assert!(!shape.path().ptr_eq(&original_path));
    assert!(shape.bounds().approx_eq(&drawn, 1e-3));
    assert!(shape
        .path()
        .bounds()
        .approx_eq(&DrawableShape::unit_rect_at_origin(), 1e-6));
}

#[test]
fn test_hit_part_in_distort_mode() {
    let shape = distorted_square(OperationMode::FreeDistort);
    assert_eq!(
        shape.hit_part(Point::new(100.0, 0.0)).unwrap(),
        PartCode::BOTTOM_RIGHT_DISTORT
    );
    assert_eq!(
        shape.hit_part(Point::new(50.0, 50.0)).unwrap(),
        PartCode::ENTIRE_OBJECT
    );
    assert_eq!(
        shape.hit_part(Point::new(50.0, 99.0)).unwrap(),
        PartCode::SNAP_TO_PATH_EDGE
    );
}
