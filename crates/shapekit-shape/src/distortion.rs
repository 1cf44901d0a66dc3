//! Quad-based distortion layered under the affine shape transform.
//!
//! The quad lives in canonical space: it says where each corner of the unit
//! square goes before location, scale and rotation are applied. Moving a
//! corner only edits this per-shape quad, never the shared canonical path.

use std::fmt;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use shapekit_core::Point;

use crate::partcode::Corner;

/// Drag operation mode of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationMode {
    #[default]
    Standard,
    FreeDistort,
    HorizontalShear,
    VerticalShear,
    Perspective,
}

impl OperationMode {
    pub fn distort_mode(self) -> Option<DistortMode> {
        match self {
            OperationMode::Standard => None,
            OperationMode::FreeDistort => Some(DistortMode::Free),
            OperationMode::HorizontalShear => Some(DistortMode::HorizontalShear),
            OperationMode::VerticalShear => Some(DistortMode::VerticalShear),
            OperationMode::Perspective => Some(DistortMode::Perspective),
        }
    }

    pub fn is_distorted(self) -> bool {
        self != OperationMode::Standard
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationMode::Standard => "Standard",
            OperationMode::FreeDistort => "Free Distort",
            OperationMode::HorizontalShear => "Horizontal Shear",
            OperationMode::VerticalShear => "Vertical Shear",
            OperationMode::Perspective => "Perspective",
        };
        f.write_str(name)
    }
}

/// The distorting modes, each with its own corner constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistortMode {
    Free,
    HorizontalShear,
    VerticalShear,
    Perspective,
}

impl From<DistortMode> for OperationMode {
    fn from(mode: DistortMode) -> Self {
        match mode {
            DistortMode::Free => OperationMode::FreeDistort,
            DistortMode::HorizontalShear => OperationMode::HorizontalShear,
            DistortMode::VerticalShear => OperationMode::VerticalShear,
            DistortMode::Perspective => OperationMode::Perspective,
        }
    }
}

/// Image of the canonical unit square's corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// The undistorted quad: the unit square itself.
    pub fn unit() -> Self {
        Self {
            top_left: Point::new(-0.5, 0.5),
            top_right: Point::new(0.5, 0.5),
            bottom_right: Point::new(0.5, -0.5),
            bottom_left: Point::new(-0.5, -0.5),
        }
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    pub fn set_corner(&mut self, corner: Corner, p: Point) {
        match corner {
            Corner::TopLeft => self.top_left = p,
            Corner::TopRight => self.top_right = p,
            Corner::BottomRight => self.bottom_right = p,
            Corner::BottomLeft => self.bottom_left = p,
        }
    }

    /// Moves `corner` towards `to` within the freedom `mode` allows.
    ///
    /// * free: the corner goes exactly to `to`
    /// * horizontal shear: the corner's horizontal edge slides along x
    /// * vertical shear: the corner's vertical edge slides along y
    /// * perspective: the corner moves along x and its horizontal partner
    ///   mirrors the displacement, keeping the quad a symmetric trapezoid
    pub fn move_corner(&mut self, mode: DistortMode, corner: Corner, to: Point) {
        let from = self.corner(corner);
        match mode {
            DistortMode::Free => self.set_corner(corner, to),
            DistortMode::HorizontalShear => {
                let dx = to.x - from.x;
                for c in [corner, corner.horizontal_partner()] {
                    let p = self.corner(c);
                    self.set_corner(c, Point::new(p.x + dx, p.y));
                }
            }
            DistortMode::VerticalShear => {
                let dy = to.y - from.y;
                for c in [corner, corner.vertical_partner()] {
                    let p = self.corner(c);
                    self.set_corner(c, Point::new(p.x, p.y + dy));
                }
            }
            DistortMode::Perspective => {
                let dx = to.x - from.x;
                self.set_corner(corner, Point::new(to.x, from.y));
                let partner = corner.horizontal_partner();
                let p = self.corner(partner);
                self.set_corner(partner, Point::new(p.x - dx, p.y));
            }
        }
    }

    /// Maps a canonical point through the warp selected by `mode`.
    pub fn warp(&self, mode: DistortMode, p: Point) -> Point {
        match mode {
            DistortMode::Perspective => self.projective(p).unwrap_or_else(|| self.bilinear(p)),
            _ => self.bilinear(p),
        }
    }

    /// Bilinear interpolation between the four corners.
    pub fn bilinear(&self, p: Point) -> Point {
        let u = p.x + 0.5;
        let v = p.y + 0.5;
        let bottom = self.bottom_left.lerp(&self.bottom_right, u);
        let top = self.top_left.lerp(&self.top_right, u);
        bottom.lerp(&top, v)
    }

    /// Projective map taking the unit square onto the quad, or `None` when
    /// the quad is degenerate or folds `p` behind the projection.
    pub fn projective(&self, p: Point) -> Option<Point> {
        let h = self.homography()?;
        let r = h * Vector3::new(p.x + 0.5, p.y + 0.5, 1.0);
        if !(r.z > f64::EPSILON) {
            return None;
        }
        Some(Point::new(r.x / r.z, r.y / r.z))
    }

    /// Square-to-quad homography over `(u, v)` in `[0, 1]²`.
    fn homography(&self) -> Option<Matrix3<f64>> {
        let [p0, p1, p2, p3] = [
            self.bottom_left,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ];
        let sx = p0.x - p1.x + p2.x - p3.x;
        let sy = p0.y - p1.y + p2.y - p3.y;

        if sx.abs() < 1e-12 && sy.abs() < 1e-12 {
            return Some(Matrix3::new(
                p1.x - p0.x,
                p2.x - p1.x,
                p0.x, //
                p1.y - p0.y,
                p2.y - p1.y,
                p0.y, //
                0.0,
                0.0,
                1.0,
            ));
        }

        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < 1e-12 {
            return None;
        }
        let g = (sx * dy2 - dx2 * sy) / den;
        let h = (dx1 * sy - sx * dy1) / den;
        Some(Matrix3::new(
            p1.x - p0.x + g * p1.x,
            p3.x - p0.x + h * p3.x,
            p0.x, //
            p1.y - p0.y + g * p1.y,
            p3.y - p0.y + h * p3.y,
            p0.y, //
            g,
            h,
            1.0,
        ))
    }
}

impl Default for Quad {
    fn default() -> Self {
        Self::unit()
    }
}

/// Either the plain affine mapping or an affine mapping over a quad warp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Deformation {
    #[default]
    Standard,
    Distorted { mode: DistortMode, quad: Quad },
}

impl Deformation {
    pub fn operation_mode(&self) -> OperationMode {
        match self {
            Deformation::Standard => OperationMode::Standard,
            Deformation::Distorted { mode, .. } => (*mode).into(),
        }
    }

    pub fn quad(&self) -> Option<&Quad> {
        match self {
            Deformation::Standard => None,
            Deformation::Distorted { quad, .. } => Some(quad),
        }
    }

    /// Canonical point after the warp (identity when undistorted).
    pub fn apply(&self, p: Point) -> Point {
        match self {
            Deformation::Standard => p,
            Deformation::Distorted { mode, quad } => quad.warp(*mode, p),
        }
    }
}

/// Convex hull of `points` in counter-clockwise order (Andrew's monotone
/// chain). Collinear points on the hull are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.approx_eq(b, 1e-12));
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
