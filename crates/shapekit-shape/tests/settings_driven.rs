//! Settings loaded from disk drive every shape a factory hands out.

use shapekit_core::{shared, Bounds, Point};
use shapekit_settings::ShapeSettings;
use shapekit_shape::{KnobMask, PartCode, ShapeFactory};
use tempfile::TempDir;

const SETTINGS: &str = r#"
[constraints]
angular_step_degrees = 15.0

[knobs]
rotation_knob_clearance = 20.0
hit_tolerance = 2.0
"#;

fn factory_from_file() -> ShapeFactory {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, SETTINGS).unwrap();
    let settings = ShapeSettings::load_or_default(&path).unwrap();
    ShapeFactory::with_settings(shared(settings))
}

#[test]
fn test_loaded_angular_step_constrains_rotation() {
    let mut factory = factory_from_file();
    let template = factory.rect();
    let mut shape = factory.make_shape(&template, Bounds::new(-10.0, -10.0, 10.0, 10.0));
    assert!((shape.angular_constraint_angle() - 15f64.to_radians()).abs() < 1e-12);

    let a = 110f64.to_radians();
    shape
        .rotate_using_reference_point(Point::new(a.cos() * 40.0, a.sin() * 40.0), true)
        .unwrap();
    assert!((shape.rotation_angle() - 15f64.to_radians()).abs() < 1e-9);
    assert_eq!(shape.end_drag().unwrap().action, "Rotate");
}

#[test]
fn test_knob_mask_is_shared_by_factory_shapes() {
    let mut factory = factory_from_file();
    let template = factory.rect();
    let mut first = factory.make_shape(&template, Bounds::new(0.0, 0.0, 10.0, 10.0));
    let second = factory.make_shape(&template, Bounds::new(50.0, 0.0, 60.0, 10.0));

    let knob = second.rotation_knob_point();
    assert_eq!(second.hit_part(knob).unwrap(), PartCode::ROTATION);

    first.set_knob_mask(KnobMask::ALL_SIZE);
    assert!(!second.knob_parts().contains(&PartCode::ROTATION));
    assert_eq!(second.hit_part(knob).unwrap(), PartCode::NONE);
    assert_eq!(
        second.hit_part(Point::new(60.0, 10.0)).unwrap(),
        PartCode::TOP_RIGHT
    );
}

#[test]
fn test_size_knob_rotation_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[knobs]\nsize_knobs_rotate = true\n").unwrap();
    let settings = ShapeSettings::load_or_default(&path).unwrap();
    let mut factory = ShapeFactory::with_settings(shared(settings));
    let template = factory.rect();
    let mut shape = factory.make_shape(&template, Bounds::new(-10.0, -10.0, 10.0, 10.0));
    assert!(shape.allow_size_knobs_to_rotate_shape());

    shape
        .move_knob(PartCode::TOP_RIGHT, Point::new(-10.0, 10.0), true, false)
        .unwrap();
    assert!((shape.rotation_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    assert_eq!(shape.end_drag().unwrap().action, "Rotate");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = ShapeSettings::load_or_default(&dir.path().join("none.toml")).unwrap();
    assert_eq!(settings, ShapeSettings::default());
    assert!((settings.angular_step_radians() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}
