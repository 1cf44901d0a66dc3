//! Affine transform composition.
//!
//! A shape maps its canonical (unit, origin-centred) path into the drawing with
//!
//! ```text
//! T = translate(location) · rotate(angle) · scale(sx, sy) · translate(-offset)
//! ```
//!
//! applied right-to-left to points. The inverse is built from the inverted
//! factors in reverse order rather than by numerically inverting `T`, so it is
//! exact up to the rounding of each factor.

use nalgebra::{Matrix3, Vector3};
use shapekit_core::{Point, ShapeError, ShapeResult, Size};

/// Determinants at or below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// 2D affine transform stored as a homogeneous 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine(Matrix3<f64>);

impl Affine {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self(Matrix3::new(
            1.0, 0.0, dx, //
            0.0, 1.0, dy, //
            0.0, 0.0, 1.0,
        ))
    }

    pub fn rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self(Matrix3::new(
            c, -s, 0.0, //
            s, c, 0.0, //
            0.0, 0.0, 1.0,
        ))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(Matrix3::new(
            sx, 0.0, 0.0, //
            0.0, sy, 0.0, //
            0.0, 0.0, 1.0,
        ))
    }

    /// Returns the transform that applies `self` first, then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        Affine(next.0 * self.0)
    }

    pub fn apply(&self, p: Point) -> Point {
        let v = self.0 * Vector3::new(p.x, p.y, 1.0);
        Point::new(v.x, v.y)
    }

    /// Applies the linear part only (no translation).
    pub fn apply_vector(&self, v: Point) -> Point {
        let r = self.0 * Vector3::new(v.x, v.y, 0.0);
        Point::new(r.x, r.y)
    }

    pub fn determinant(&self) -> f64 {
        self.0[(0, 0)] * self.0[(1, 1)] - self.0[(0, 1)] * self.0[(1, 0)]
    }

    pub fn is_singular(&self) -> bool {
        let det = self.determinant();
        !det.is_finite() || det.abs() <= SINGULAR_EPSILON
    }

    /// Numeric inverse, for transforms that are not built from shape factors
    /// (parent transforms supplied by a container).
    pub fn try_inverse(&self) -> ShapeResult<Affine> {
        if self.is_singular() {
            return Err(ShapeError::SingularTransform {
                determinant: self.determinant(),
            });
        }
        self.0
            .try_inverse()
            .map(Affine)
            .ok_or(ShapeError::SingularTransform {
                determinant: self.determinant(),
            })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

/// Builds `translate(location) · rotate(angle) · scale · translate(-offset)`.
pub fn compose(location: Point, angle: f64, scale: Size, offset: Point) -> Affine {
    Affine::translation(-offset.x, -offset.y)
        .then(&Affine::scale(scale.width, scale.height))
        .then(&Affine::rotation(angle))
        .then(&Affine::translation(location.x, location.y))
}

/// Exact inverse of [`compose`] for the same factors.
///
/// A zero scale component has no inverse and yields
/// [`ShapeError::SingularTransform`].
pub fn compose_inverse(location: Point, angle: f64, scale: Size, offset: Point) -> ShapeResult<Affine> {
    let (inv_x, inv_y) = (1.0 / scale.width, 1.0 / scale.height);
    // Subnormal factors pass a zero test but their reciprocals overflow.
    if scale.is_degenerate()
        || !scale.width.is_finite()
        || !scale.height.is_finite()
        || !inv_x.is_finite()
        || !inv_y.is_finite()
    {
        return Err(ShapeError::SingularTransform {
            determinant: scale.width * scale.height,
        });
    }
    Ok(Affine::translation(-location.x, -location.y)
        .then(&Affine::rotation(-angle))
        .then(&Affine::scale(inv_x, inv_y))
        .then(&Affine::translation(offset.x, offset.y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_then_applies_left_first() {
        let t = Affine::translation(10.0, 0.0).then(&Affine::scale(2.0, 2.0));
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
    }

    #[test]
    fn test_compose_unit_square_corner() {
        let t = compose(Point::new(100.0, 100.0), 0.0, Size::new(50.0, 50.0), Point::ORIGIN);
        assert_eq!(t.apply(Point::new(-0.5, 0.5)), Point::new(75.0, 125.0));
    }

    #[test]
    fn test_compose_rotation_quarter_turn() {
        let t = compose(Point::new(100.0, 100.0), FRAC_PI_2, Size::new(50.0, 50.0), Point::ORIGIN);
        let p = t.apply(Point::new(-0.5, 0.0));
        assert!(p.approx_eq(&Point::new(100.0, 75.0), 1e-9), "got {}", p);
    }

    #[test]
    fn test_compose_inverse_round_trip() {
        let loc = Point::new(12.0, -7.0);
        let scale = Size::new(3.0, -0.5);
        let offset = Point::new(0.1, 0.2);
        let t = compose(loc, 0.7, scale, offset);
        let inv = compose_inverse(loc, 0.7, scale, offset).unwrap();
        let p = Point::new(0.3, -0.4);
        assert!(inv.apply(t.apply(p)).approx_eq(&p, 1e-12));
    }

    #[test]
    fn test_compose_inverse_singular() {
        let err = compose_inverse(Point::ORIGIN, 0.0, Size::new(0.0, 4.0), Point::ORIGIN)
            .unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_compose_inverse_rejects_subnormal_scale() {
        let err = compose_inverse(Point::ORIGIN, 0.0, Size::new(1e-310, 1.0), Point::ORIGIN)
            .unwrap_err();
        assert!(err.is_singular());

        let err = compose_inverse(Point::ORIGIN, 0.4, Size::new(2.0, -1e-320), Point::ORIGIN)
            .unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_try_inverse_matches_exact_inverse() {
        let t = compose(Point::new(1.0, 2.0), 0.3, Size::new(2.0, 5.0), Point::ORIGIN);
        let exact = compose_inverse(Point::new(1.0, 2.0), 0.3, Size::new(2.0, 5.0), Point::ORIGIN)
            .unwrap();
        let numeric = t.try_inverse().unwrap();
        let p = Point::new(-4.0, 9.0);
        assert!(exact.apply(p).approx_eq(&numeric.apply(p), 1e-9));
    }

    #[test]
    fn test_apply_vector_ignores_translation() {
        let t = Affine::translation(5.0, 5.0).then(&Affine::scale(2.0, 3.0));
        assert_eq!(t.apply_vector(Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
    }
}
