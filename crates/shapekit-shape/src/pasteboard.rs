//! Pasting a path onto an existing shape.

use lyon::path::Path;
use shapekit_core::{ShapeError, ShapeResult};
use tracing::debug;

use crate::canonical::CanonicalPath;
use crate::shape::DrawableShape;
use crate::svg_path::parse_path_data;

/// Source of a path-bearing payload, as SVG path data.
pub trait Pasteboard {
    fn path_data(&self) -> Option<String>;
}

/// In-memory pasteboard holding a text payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPasteboard {
    contents: Option<String>,
}

impl TextPasteboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }

    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.contents = Some(contents.into());
    }

    pub fn clear(&mut self) {
        self.contents = None;
    }
}

impl Pasteboard for TextPasteboard {
    fn path_data(&self) -> Option<String> {
        self.contents.clone()
    }
}

/// Reads the pasteboard and checks the payload is a usable outline.
fn read_path(pb: &dyn Pasteboard) -> ShapeResult<Path> {
    let data = pb.path_data().ok_or_else(|| ShapeError::PathParse {
        reason: "pasteboard holds no path data".to_string(),
    })?;
    let path = parse_path_data(&data)?;
    CanonicalPath::normalize(&path)?;
    Ok(path)
}

impl DrawableShape {
    /// True if the pasteboard holds a path this shape could adopt.
    pub fn can_paste_path(&self, pb: &dyn Pasteboard) -> bool {
        match read_path(pb) {
            Ok(_) => true,
            Err(e) => {
                debug!("Pasteboard path rejected: {}", e);
                false
            }
        }
    }

    /// Replaces this shape's outline with the pasteboard's path, keeping
    /// the current rotation.
    pub fn paste_path(&mut self, pb: &dyn Pasteboard) -> ShapeResult<()> {
        let path = read_path(pb)?;
        self.adopt_path(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapekit_core::{Bounds, Point};

    #[test]
    fn test_can_paste_only_usable_paths() {
        let shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
        assert!(!shape.can_paste_path(&TextPasteboard::new()));
        assert!(!shape.can_paste_path(&TextPasteboard::with_contents("hello")));
        assert!(!shape.can_paste_path(&TextPasteboard::with_contents("M 1 1")));
        assert!(shape.can_paste_path(&TextPasteboard::with_contents("M 0 0 L 4 0 L 4 2 Z")));
    }

    #[test]
    fn test_paste_replaces_outline() {
        let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
        shape
            .paste_path(&TextPasteboard::with_contents("M 0 0 L 4 0 L 4 2 Z"))
            .unwrap();
        assert!(shape.bounds().approx_eq(&Bounds::new(0.0, 0.0, 4.0, 2.0), 1e-4));
        assert!(shape.location().approx_eq(&Point::new(2.0, 1.0), 1e-6));
    }

    #[test]
    fn test_paste_empty_path_is_invalid() {
        let mut shape = DrawableShape::from_rect(Bounds::new(0.0, 0.0, 10.0, 10.0));
        let err = shape
            .paste_path(&TextPasteboard::with_contents("M 3 3"))
            .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidPath { .. }));
    }
}
