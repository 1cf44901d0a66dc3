//! # ShapeKit Shape
//!
//! The drawable shape engine: a path stored once in canonical unit space and
//! rendered into a drawing through location, scale, rotation and an optional
//! quad distortion.
//!
//! ## Components
//!
//! - **Canonical path**: origin-centred unit path, shared between shapes made
//!   from the same template and replaced (never edited) on change
//! - **Transform**: `translate · rotate · scale · translate(-offset)` and its
//!   exact inverse
//! - **Distortion**: free, shear and perspective quad warps
//! - **Part codes**: knob identifiers, knob masks and cursor hints
//! - **Operations**: resize, rotate, move and distort drag sessions that
//!   notify once on completion
//! - **Conversion**: baking a shape into a plain path, splitting compound
//!   shapes
//! - **Collaborators**: grid fitting and pasteboard path adoption
//!
//! ## Coordinates
//!
//! ```text
//!            TOP (0, 0.5)
//!      +---------+---------+
//!      |                   |
//! LEFT +      (0, 0)       + RIGHT
//!      |                   |
//!      +---------+---------+
//!          BOTTOM (0, -0.5)
//! ```
//!
//! Drawing space is Y-up and angles are counter-clockwise radians.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shapekit_shape::{DrawableShape, PartCode};
//! use shapekit_core::{Bounds, Point};
//!
//! let mut shape = DrawableShape::from_rect(Bounds::new(75.0, 75.0, 125.0, 125.0));
//! shape.subscribe(|change| println!("{}", change.action));
//! shape.move_knob(PartCode::RIGHT, Point::new(150.0, 100.0), false, false)?;
//! shape.end_drag(); // prints "Resize"
//! ```

pub mod canonical;
pub mod conversion;
pub mod distortion;
pub mod events;
pub mod factory;
pub mod grid;
pub mod operation;
pub mod partcode;
pub mod pasteboard;
pub mod shape;
pub mod state;
pub mod svg_path;
pub mod transform;

pub use canonical::CanonicalPath;
pub use conversion::DrawablePath;
pub use distortion::{convex_hull, Deformation, DistortMode, OperationMode, Quad};
pub use events::{EventDispatcher, GeometryChange, ShapeId, SubscriptionId};
pub use factory::ShapeFactory;
pub use grid::{Grid, SquareGrid};
pub use partcode::{
    undo_action_name, Corner, CursorHint, HSide, KnobMask, Part, PartCode, SizeHandle, VSide,
};
pub use pasteboard::{Pasteboard, TextPasteboard};
pub use shape::{DrawableShape, KnobParts};
pub use state::{ShapeSnapshot, ShapeState};
pub use svg_path::{parse_path_data, to_path_data};
pub use transform::{compose, compose_inverse, Affine};

pub use lyon::path::Path;
