use anyhow::Context;
use shapekit::{
    init_logging, shared, Bounds, DrawableShape, OperationMode, PartCode, Point, ShapeFactory,
    ShapeSettings, SquareGrid, VERSION,
};
use tracing::info;

fn load_settings() -> anyhow::Result<ShapeSettings> {
    match ShapeSettings::default_config_path() {
        Some(path) => ShapeSettings::load_or_default(&path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(ShapeSettings::default()),
    }
}

fn print_shape(label: &str, shape: &DrawableShape) -> anyhow::Result<()> {
    println!("{} bounds {}", label, shape.bounds());
    println!("{}", shape.make_path().to_svg_path_data());
    println!("{}", serde_json::to_string_pretty(shape.state())?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("ShapeKit {}", VERSION);

    let mut factory = ShapeFactory::with_settings(shared(load_settings()?));
    let star = factory.star(5, 0.45)?;
    let mut shape = factory.make_shape(&star, Bounds::new(75.0, 75.0, 125.0, 125.0));
    shape.subscribe(|change| info!("{} on {}", change.action, change.shape));

    shape.move_knob(PartCode::TOP_RIGHT, Point::new(160.0, 140.0), false, true)?;
    shape.end_drag();
    shape.rotate_using_reference_point(Point::new(60.0, 150.0), true)?;
    shape.end_drag();
    shape.adjust_to_fit_grid(&SquareGrid::new(5.0));
    print_shape("resized", &shape)?;

    shape.set_operation_mode(OperationMode::Perspective);
    let corner = shape.knob_point(PartCode::TOP_LEFT_DISTORT)?;
    shape.move_knob(
        PartCode::TOP_LEFT_DISTORT,
        Point::new(corner.x + 10.0, corner.y),
        false,
        false,
    )?;
    shape.end_drag();
    shape.reset_bounding_box()?;
    print_shape("perspective", &shape)?;

    Ok(())
}
