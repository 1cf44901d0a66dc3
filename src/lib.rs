//! # ShapeKit
//!
//! Drawable shapes for vector editors. A shape keeps its outline once, in a
//! canonical unit square, and draws it through a location, scale, rotation
//! and optional quad distortion. Handles ("knobs") resize, rotate, move and
//! distort the shape, and listeners hear once per completed operation.
//!
//! ## Architecture
//!
//! 1. **shapekit-core** - Points, sizes, bounds, errors and sharing aliases
//! 2. **shapekit-settings** - Angular step, knob geometry, flattening tolerance
//! 3. **shapekit-shape** - Canonical paths, transforms, part codes, drags,
//!    distortion, conversion, grid and pasteboard collaborators
//! 4. **shapekit** - This crate: re-exports and the demo binary

pub use shapekit_core::{
    shared, Bounds, Listener, Point, Shared, SharedVec, ShapeError, ShapeResult, Size,
};

pub use shapekit_settings::{
    ConstraintSettings, KnobSettings, RenderingSettings, SettingsError, SettingsResult,
    ShapeSettings,
};

pub use shapekit_shape::{
    compose, compose_inverse, convex_hull, parse_path_data, to_path_data, undo_action_name, Affine,
    CanonicalPath, Corner, CursorHint, Deformation, DistortMode, DrawablePath, DrawableShape,
    EventDispatcher, GeometryChange, Grid, HSide, KnobMask, KnobParts, OperationMode, Part,
    PartCode, Pasteboard, Path, Quad, ShapeFactory, ShapeId, ShapeSnapshot, ShapeState,
    SizeHandle, SquareGrid, SubscriptionId, TextPasteboard, VSide,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
