//! Grid snapping contract.

use std::f64::consts::FRAC_PI_2;

use shapekit_core::{Point, Size};
use tracing::debug;

use crate::events::GeometryChange;
use crate::shape::DrawableShape;

/// What a shape needs from a grid to align itself to it.
pub trait Grid {
    /// Closest grid intersection to `p`.
    fn nearest_snap_point(&self, p: Point) -> Point;

    /// Spacing between grid lines along each axis.
    fn cell_size(&self) -> Size;
}

/// Uniform square grid anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareGrid {
    pub origin: Point,
    pub spacing: f64,
}

impl SquareGrid {
    pub fn new(spacing: f64) -> Self {
        Self {
            origin: Point::ORIGIN,
            spacing,
        }
    }
}

impl Grid for SquareGrid {
    fn nearest_snap_point(&self, p: Point) -> Point {
        if !(self.spacing > 0.0) {
            return p;
        }
        let snap = |v: f64, o: f64| o + ((v - o) / self.spacing).round() * self.spacing;
        Point::new(snap(p.x, self.origin.x), snap(p.y, self.origin.y))
    }

    fn cell_size(&self) -> Size {
        Size::new(self.spacing, self.spacing)
    }
}

/// Number of quarter turns in `angle` when it is axis-aligned.
fn quarter_turns(angle: f64) -> Option<i64> {
    let turns = angle / FRAC_PI_2;
    let rounded = turns.round();
    ((turns - rounded).abs() < 1e-9).then_some(rounded as i64)
}

impl DrawableShape {
    /// Aligns the shape's bounds to `grid`.
    ///
    /// An axis-aligned, undistorted shape has its bounds corners snapped to
    /// the grid, keeping at least one cell along any axis that had extent.
    /// Any other shape only has its location snapped. Notifies once if
    /// anything moved.
    pub fn adjust_to_fit_grid(&mut self, grid: &dyn Grid) -> Option<GeometryChange> {
        let before = self.snapshot();
        let mut state = *self.state();

        match quarter_turns(state.rotation_angle) {
            Some(turns) if !state.operation_mode().is_distorted() => {
                let bounds = self.bounds();
                let cell = grid.cell_size();
                let min = grid.nearest_snap_point(Point::new(bounds.min_x, bounds.min_y));
                let mut max = grid.nearest_snap_point(Point::new(bounds.max_x, bounds.max_y));
                if bounds.width() > 0.0 && max.x - min.x < cell.width {
                    max.x = min.x + cell.width;
                }
                if bounds.height() > 0.0 && max.y - min.y < cell.height {
                    max.y = min.y + cell.height;
                }

                let kx = if bounds.width() > 0.0 {
                    (max.x - min.x) / bounds.width()
                } else {
                    1.0
                };
                let ky = if bounds.height() > 0.0 {
                    (max.y - min.y) / bounds.height()
                } else {
                    1.0
                };
                // odd quarter turns put the shape's width along y
                let (kw, kh) = if turns.rem_euclid(2) == 1 { (ky, kx) } else { (kx, ky) };
                state.scale = Size::new(state.scale.width * kw, state.scale.height * kh);

                // scaling is about location; translate the rescaled bounds back onto the grid
                let scaled_min = Point::new(
                    state.location.x + (bounds.min_x - state.location.x) * kx,
                    state.location.y + (bounds.min_y - state.location.y) * ky,
                );
                state.location = Point::new(
                    state.location.x + min.x - scaled_min.x,
                    state.location.y + min.y - scaled_min.y,
                );
            }
            _ => {
                state.location = grid.nearest_snap_point(state.location);
            }
        }

        debug!("Shape {} fitted to grid at {}", self.id(), state.location);
        self.replace_state(state);
        self.notify("Snap to Grid", before)
    }
}
