//! Per-shape geometric state.

use serde::{Deserialize, Serialize};
use shapekit_core::{Point, ShapeResult, Size};

use crate::canonical::CanonicalPath;
use crate::distortion::{Deformation, OperationMode};
use crate::transform::{compose, compose_inverse, Affine};

/// Everything that places a canonical path in the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    /// Drawing-space position of the logical centre.
    pub location: Point,
    /// Rotation about `location`, radians in `[0, 2π)`.
    pub rotation_angle: f64,
    /// Size of the shape; a negative component mirrors that axis.
    pub scale: Size,
    /// Logical centre in canonical units.
    pub offset: Point,
    pub deformation: Deformation,
}

impl ShapeState {
    pub fn new(location: Point, scale: Size) -> Self {
        Self {
            location,
            rotation_angle: 0.0,
            scale,
            offset: Point::ORIGIN,
            deformation: Deformation::Standard,
        }
    }

    pub fn transform(&self) -> Affine {
        compose(self.location, self.rotation_angle, self.scale, self.offset)
    }

    pub fn inverse_transform(&self) -> ShapeResult<Affine> {
        compose_inverse(self.location, self.rotation_angle, self.scale, self.offset)
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.deformation.operation_mode()
    }

    /// Canonical point to drawing space, warp included.
    pub fn canonical_to_drawing(&self, p: Point) -> Point {
        self.transform().apply(self.deformation.apply(p))
    }
}

impl Default for ShapeState {
    fn default() -> Self {
        Self::new(Point::ORIGIN, Size::default())
    }
}

/// A shape's state together with the path it applies to.
///
/// The path handle is shared, so snapshots are cheap to take on every
/// completed operation.
#[derive(Debug, Clone)]
pub struct ShapeSnapshot {
    pub state: ShapeState,
    pub path: CanonicalPath,
}

impl PartialEq for ShapeSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state && self.path.ptr_eq(&other.path)
    }
}
