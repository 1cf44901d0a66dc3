//! Canonical path store.
//!
//! A shape keeps its outline in unit space: origin-centred with nominal
//! bounds `[-0.5, -0.5]..[0.5, 0.5]`. The path is never edited in place. It
//! is held behind an `Rc` so shapes cloned from one factory template share a
//! single allocation; replacing a shape's path swaps its handle and leaves
//! every other holder untouched.

use std::rc::Rc;

use lyon::algorithms::aabb::bounding_box;
use lyon::math::{point, vector, Angle, Box2D};
use lyon::path::iterator::PathIterator;
use lyon::path::{Event, Path, PathEvent, Winding};
use shapekit_core::{Bounds, Point, ShapeError, ShapeResult};

/// The unit-space outline of a shape.
#[derive(Debug, Clone)]
pub struct CanonicalPath {
    path: Rc<Path>,
}

impl CanonicalPath {
    /// Wraps a path that is already in unit space.
    ///
    /// Fails with [`ShapeError::InvalidPath`] when the path has no segments.
    pub fn new(path: Path) -> ShapeResult<Self> {
        if segment_count(&path) == 0 {
            return Err(ShapeError::invalid_path("path has no segments"));
        }
        Ok(Self {
            path: Rc::new(path),
        })
    }

    /// Wraps a path built in unit space by this crate.
    pub(crate) fn from_built(path: Path) -> Self {
        Self {
            path: Rc::new(path),
        }
    }

    /// Maps an arbitrary path into unit space.
    ///
    /// Returns the canonical path together with the bounds the source path
    /// occupied, which callers turn into location and scale. An axis with no
    /// extent (a horizontal or vertical line) is centred but not stretched.
    pub fn normalize(path: &Path) -> ShapeResult<(Self, Bounds)> {
        if segment_count(path) == 0 {
            return Err(ShapeError::invalid_path("path has no segments"));
        }
        let bounds = path_bounds(path);
        if ![bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ShapeError::invalid_path("path bounds are not finite"));
        }
        if bounds.width() <= 0.0 && bounds.height() <= 0.0 {
            return Err(ShapeError::invalid_path("path has no extent"));
        }

        let center = bounds.center();
        let (ex, ey) = normalizing_extents(&bounds);
        let normalized = map_path(path, |p| {
            Point::new((p.x - center.x) / ex, (p.y - center.y) / ey)
        });
        Ok((Self::from_built(normalized), bounds))
    }

    /// Unit square centred on the origin.
    pub fn unit_rect() -> Self {
        let mut builder = Path::builder();
        builder.add_rectangle(
            &Box2D::new(point(-0.5, -0.5), point(0.5, 0.5)),
            Winding::Positive,
        );
        Self::from_built(builder.build())
    }

    /// Unit-diameter ellipse centred on the origin.
    pub fn unit_oval() -> Self {
        let mut builder = Path::builder();
        builder.add_ellipse(
            point(0.0, 0.0),
            vector(0.5, 0.5),
            Angle::radians(0.0),
            Winding::Positive,
        );
        Self::from_built(builder.build())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tight bounds of the stored path (nominally the unit square).
    pub fn bounds(&self) -> Bounds {
        path_bounds(&self.path)
    }

    pub fn segment_count(&self) -> usize {
        segment_count(&self.path)
    }

    /// Splits the path at every `Begin`, one path per subpath.
    pub fn subpaths(&self) -> Vec<Path> {
        split_subpaths(&self.path)
    }

    /// True while another shape holds the same path allocation.
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.path) > 1
    }

    pub fn ptr_eq(&self, other: &CanonicalPath) -> bool {
        Rc::ptr_eq(&self.path, &other.path)
    }
}

/// Extents used to scale a path into unit space; 1.0 for a flat axis.
pub(crate) fn normalizing_extents(bounds: &Bounds) -> (f64, f64) {
    let ex = if bounds.width() > 0.0 { bounds.width() } else { 1.0 };
    let ey = if bounds.height() > 0.0 { bounds.height() } else { 1.0 };
    (ex, ey)
}

pub(crate) fn to_point(p: lyon::math::Point) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

pub(crate) fn to_lyon(p: Point) -> lyon::math::Point {
    point(p.x as f32, p.y as f32)
}

/// Number of drawing segments (lines and curves, including implicit closes).
pub fn segment_count(path: &Path) -> usize {
    path.iter()
        .filter(|event| match event {
            Event::Line { .. } | Event::Quadratic { .. } | Event::Cubic { .. } => true,
            Event::End {
                last, first, close, ..
            } => *close && last != first,
            Event::Begin { .. } => false,
        })
        .count()
}

/// Tight axis-aligned bounds of a path.
pub fn path_bounds(path: &Path) -> Bounds {
    let bb = bounding_box(path.iter());
    Bounds::new(
        bb.min.x as f64,
        bb.min.y as f64,
        bb.max.x as f64,
        bb.max.y as f64,
    )
}

/// Maps every endpoint and control point through `f`.
///
/// Exact for affine maps: Bézier curves are affine-invariant.
pub fn map_path<F: Fn(Point) -> Point>(path: &Path, f: F) -> Path {
    let mut builder = Path::builder();
    for event in path.iter() {
        match event {
            Event::Begin { at } => {
                builder.begin(to_lyon(f(to_point(at))));
            }
            Event::Line { to, .. } => {
                builder.line_to(to_lyon(f(to_point(to))));
            }
            Event::Quadratic { ctrl, to, .. } => {
                builder.quadratic_bezier_to(to_lyon(f(to_point(ctrl))), to_lyon(f(to_point(to))));
            }
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                builder.cubic_bezier_to(
                    to_lyon(f(to_point(ctrl1))),
                    to_lyon(f(to_point(ctrl2))),
                    to_lyon(f(to_point(to))),
                );
            }
            Event::End { close, .. } => builder.end(close),
        }
    }
    builder.build()
}

/// Flattens curves to line segments, then maps every vertex through `f`.
///
/// Used for non-affine maps, where control points cannot be mapped directly.
pub fn flatten_and_map<F: Fn(Point) -> Point>(path: &Path, tolerance: f64, f: F) -> Path {
    let mut builder = Path::builder();
    for event in path.iter().flattened(tolerance as f32) {
        match event {
            Event::Begin { at } => {
                builder.begin(to_lyon(f(to_point(at))));
            }
            Event::Line { to, .. } => {
                builder.line_to(to_lyon(f(to_point(to))));
            }
            Event::End { close, .. } => builder.end(close),
            // flattened() only yields lines
            Event::Quadratic { .. } | Event::Cubic { .. } => {}
        }
    }
    builder.build()
}

/// Vertices of the flattened path, in order, one entry per vertex.
pub fn flattened_points(path: &Path, tolerance: f64) -> Vec<Point> {
    let mut points = Vec::new();
    for event in path.iter().flattened(tolerance as f32) {
        match event {
            Event::Begin { at } => points.push(to_point(at)),
            Event::Line { to, .. } => points.push(to_point(to)),
            _ => {}
        }
    }
    points
}

fn outline_segments(path: &Path, tolerance: f64) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    for event in path.iter().flattened(tolerance as f32) {
        match event {
            Event::Line { from, to } => segments.push((to_point(from), to_point(to))),
            Event::End {
                last, first, close, ..
            } if close && last != first => {
                segments.push((to_point(last), to_point(first)));
            }
            _ => {}
        }
    }
    segments
}

fn closest_on_segment(p: Point, a: Point, b: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy)
}

/// Closest point on the (flattened) outline of `path` to `p`.
pub fn nearest_point_on_outline(path: &Path, p: Point, tolerance: f64) -> Option<Point> {
    outline_segments(path, tolerance)
        .into_iter()
        .map(|(a, b)| closest_on_segment(p, a, b))
        .min_by(|a, b| a.distance_to(&p).total_cmp(&b.distance_to(&p)))
}

/// Splits a path into one path per subpath.
pub fn split_subpaths(path: &Path) -> Vec<Path> {
    let mut subpaths = Vec::new();
    let mut builder: Option<lyon::path::path::Builder> = None;
    for event in path.iter() {
        match event {
            Event::Begin { at } => {
                let mut b = Path::builder();
                b.begin(at);
                builder = Some(b);
            }
            Event::Line { to, .. } => {
                if let Some(b) = builder.as_mut() {
                    b.line_to(to);
                }
            }
            Event::Quadratic { ctrl, to, .. } => {
                if let Some(b) = builder.as_mut() {
                    b.quadratic_bezier_to(ctrl, to);
                }
            }
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                if let Some(b) = builder.as_mut() {
                    b.cubic_bezier_to(ctrl1, ctrl2, to);
                }
            }
            Event::End { close, .. } => {
                if let Some(mut b) = builder.take() {
                    b.end(close);
                    subpaths.push(b.build());
                }
            }
        }
    }
    subpaths
}

/// Collects the events of a path for point-by-point comparison.
pub fn path_events(path: &Path) -> Vec<PathEvent> {
    path.iter().collect()
}
