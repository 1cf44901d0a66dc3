//! Conversion of shapes into plain paths and into per-subpath shapes.

use lyon::path::Path;
use shapekit_core::{Bounds, ShapeResult};
use tracing::debug;

use crate::canonical::{path_bounds, segment_count, split_subpaths};
use crate::events::ShapeId;
use crate::shape::DrawableShape;
use crate::svg_path::to_path_data;

/// A path-only drawable: the geometry is baked into drawing space and no
/// longer parametrised by location, scale or rotation.
#[derive(Debug, Clone)]
pub struct DrawablePath {
    id: ShapeId,
    path: Path,
    style: Option<String>,
}

impl DrawablePath {
    pub fn new(path: Path) -> Self {
        Self {
            id: ShapeId::new(),
            path,
            style: None,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> Path {
        self.path
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn bounds(&self) -> Bounds {
        path_bounds(&self.path)
    }

    pub fn to_svg_path_data(&self) -> String {
        to_path_data(&self.path)
    }
}

impl DrawableShape {
    /// The shape as a path-only object that renders identically.
    pub fn make_path(&self) -> DrawablePath {
        DrawablePath {
            id: ShapeId::new(),
            path: self.transformed_path(),
            style: self.style().map(str::to_string),
        }
    }

    /// Splits a compound shape into one shape per subpath.
    ///
    /// Each piece keeps this shape's rotation, style and settings, so the
    /// pieces together draw exactly what this shape draws. Subpaths with no
    /// segments are dropped. A single-subpath shape yields one duplicate.
    pub fn break_apart(&self) -> ShapeResult<Vec<DrawableShape>> {
        let drawn = self.transformed_path();
        let subpaths = split_subpaths(&drawn);
        if subpaths.len() <= 1 {
            return Ok(vec![self.duplicate()]);
        }

        let mut pieces = Vec::with_capacity(subpaths.len());
        for sub in &subpaths {
            if segment_count(sub) == 0 {
                debug!("Dropping empty subpath while breaking apart {}", self.id());
                continue;
            }
            let mut piece = DrawableShape::from_path_rotated(sub, self.rotation_angle())?
                .with_settings(self.settings());
            piece.set_style(self.style().map(str::to_string));
            pieces.push(piece);
        }
        debug!("Broke shape {} into {} pieces", self.id(), pieces.len());
        Ok(pieces)
    }
}
