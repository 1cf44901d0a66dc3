//! Pasting outlines, splitting compound shapes and baking to plain paths.

use shapekit_core::{shared, Bounds, Point, SharedVec};
use shapekit_shape::{
    parse_path_data, DrawableShape, GeometryChange, OperationMode, PartCode, TextPasteboard,
};

const TWO_SQUARES: &str = "M 0 0 L 10 0 L 10 10 L 0 10 Z M 20 0 L 30 0 L 30 5 L 20 5 Z";

#[test]
fn test_paste_compound_then_break_apart() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0))
        .with_style("stroke:red");
    let log: SharedVec<GeometryChange> = shared(Vec::new());
    let sink = log.clone();
    shape.subscribe(move |c| sink.borrow_mut().push(c.clone()));

    let pb = TextPasteboard::with_contents(TWO_SQUARES);
    assert!(shape.can_paste_path(&pb));
    shape.paste_path(&pb).unwrap();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].action, "Adopt Path");
    assert!(shape.bounds().approx_eq(&Bounds::new(0.0, 0.0, 30.0, 10.0), 1e-3));

    let pieces = shape.break_apart().unwrap();
    assert_eq!(pieces.len(), 2);
    assert!(pieces[0]
        .bounds()
        .approx_eq(&Bounds::new(0.0, 0.0, 10.0, 10.0), 1e-3));
    assert!(pieces[1]
        .bounds()
        .approx_eq(&Bounds::new(20.0, 0.0, 30.0, 5.0), 1e-3));
    for piece in &pieces {
        assert_eq!(piece.style(), Some("stroke:red"));
        assert_ne!(piece.id(), shape.id());
    }
}

#[test]
fn test_make_path_draws_like_distorted_shape() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
    shape.set_operation_mode(OperationMode::FreeDistort);
    shape
        .move_knob(PartCode::TOP_LEFT_DISTORT, Point::new(-20.0, 110.0), false, false)
        .unwrap();
    shape.end_drag();

    let plain = shape.make_path();
    assert!(plain.bounds().approx_eq(&shape.bounds(), 1e-3));

    let reparsed = parse_path_data(&plain.to_svg_path_data()).unwrap();
    let again = DrawableShape::from_path(&reparsed).unwrap();
    assert!(again.bounds().approx_eq(&shape.bounds(), 1e-2));
}

#[test]
fn test_paste_rejects_degenerate_payload() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
    let before = shape.snapshot();
    let pb = TextPasteboard::with_contents("M 5 5 L 5 5");
    assert!(!shape.can_paste_path(&pb));
    assert!(shape.paste_path(&pb).is_err());
    assert_eq!(shape.snapshot(), before);
}

#[test]
fn test_paste_rejects_out_of_range_numbers() {
    let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
    let before = shape.snapshot();
    for data in [
        "M 0 0 L 1e39 0 L 0 1 Z",
        "M 0 0 L inf 0 L 0 1 Z",
        "M 3e38 0 l 3e38 0 l 0 1 z",
    ] {
        let pb = TextPasteboard::with_contents(data);
        assert!(!shape.can_paste_path(&pb), "accepted {}", data);
        assert!(shape.paste_path(&pb).is_err());
    }
    assert_eq!(shape.snapshot(), before);
}
