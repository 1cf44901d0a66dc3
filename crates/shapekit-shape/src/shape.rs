//! The drawable shape.
//!
//! A [`DrawableShape`] pairs a shared [`CanonicalPath`] with a per-instance
//! [`ShapeState`]. Rendering, hit testing and knob placement all go through
//! the transform built from that state; the canonical path itself is never
//! edited, only replaced.

use std::cell::Cell;
use std::f64::consts::TAU;

use lyon::algorithms::hit_test::hit_test_path;
use lyon::path::{FillRule, Path};
use shapekit_core::{shared, Bounds, Point, Shared, ShapeError, ShapeResult, Size};
use shapekit_settings::ShapeSettings;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::canonical::{
    flatten_and_map, flattened_points, map_path, nearest_point_on_outline, normalizing_extents,
    path_bounds, to_lyon, CanonicalPath,
};
use crate::distortion::{convex_hull, Deformation, OperationMode, Quad};
use crate::events::{EventDispatcher, GeometryChange, ShapeId, SubscriptionId};
use crate::operation::DragSession;
use crate::partcode::{undo_action_name, CursorHint, KnobMask, Part, PartCode};
use crate::state::{ShapeSnapshot, ShapeState};
use crate::transform::Affine;

const STANDARD_KNOBS: [PartCode; 11] = [
    PartCode::ROTATION,
    PartCode::TOP_LEFT,
    PartCode::TOP_RIGHT,
    PartCode::BOTTOM_RIGHT,
    PartCode::BOTTOM_LEFT,
    PartCode::LEFT,
    PartCode::TOP,
    PartCode::RIGHT,
    PartCode::BOTTOM,
    PartCode::ORIGIN_TARGET,
    PartCode::OBJECT_CENTRE,
];

const DISTORT_KNOBS: [PartCode; 4] = [
    PartCode::TOP_LEFT_DISTORT,
    PartCode::TOP_RIGHT_DISTORT,
    PartCode::BOTTOM_RIGHT_DISTORT,
    PartCode::BOTTOM_LEFT_DISTORT,
];

/// Knob list returned by [`DrawableShape::knob_parts`].
pub type KnobParts = SmallVec<[PartCode; 12]>;

/// Normalises an angle into `[0, 2π)`.
pub(crate) fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// A shape drawn by mapping a unit-space path into the drawing.
#[derive(Debug)]
pub struct DrawableShape {
    id: ShapeId,
    path: CanonicalPath,
    state: ShapeState,
    parent_transform: Option<Affine>,
    settings: Shared<ShapeSettings>,
    style: Option<String>,
    pub(crate) session: Option<DragSession>,
    pub(crate) pending_anchor: Option<PartCode>,
    /// Bounds keyed on the flatten tolerance they were computed with, since
    /// the settings may change through another holder.
    bounds_cache: Cell<Option<(f64, Bounds)>>,
    events: EventDispatcher,
}

impl DrawableShape {
    /// Creates a shape from a path already in unit space, placed at the
    /// origin with a 1x1 scale.
    pub fn from_canonical_path(path: CanonicalPath) -> Self {
        Self::with_state(path, ShapeState::default())
    }

    pub(crate) fn with_state(path: CanonicalPath, state: ShapeState) -> Self {
        Self {
            id: ShapeId::new(),
            path,
            state,
            parent_transform: None,
            settings: shared(ShapeSettings::default()),
            style: None,
            session: None,
            pending_anchor: None,
            bounds_cache: Cell::new(None),
            events: EventDispatcher::new(),
        }
    }

    /// Rectangle filling `bounds`.
    pub fn from_rect(bounds: Bounds) -> Self {
        Self::with_state(
            CanonicalPath::unit_rect(),
            ShapeState::new(bounds.center(), bounds.size()),
        )
    }

    /// Ellipse inscribed in `bounds`.
    pub fn from_oval(bounds: Bounds) -> Self {
        Self::with_state(
            CanonicalPath::unit_oval(),
            ShapeState::new(bounds.center(), bounds.size()),
        )
    }

    /// Creates a shape from a canonical template stretched over `bounds`.
    pub fn from_template(path: &CanonicalPath, bounds: Bounds) -> Self {
        Self::with_state(path.clone(), ShapeState::new(bounds.center(), bounds.size()))
    }

    /// Creates an unrotated shape from a drawing-space path.
    pub fn from_path(path: &Path) -> ShapeResult<Self> {
        Self::from_path_rotated(path, 0.0)
    }

    /// Creates a shape from a drawing-space path that is drawn rotated by
    /// `angle`. The path is unrotated about its centre before being
    /// normalised, so the shape's box hugs it in its own frame.
    pub fn from_path_rotated(path: &Path, angle: f64) -> ShapeResult<Self> {
        let (canonical, state) = place_rotated_path(path, angle)?;
        Ok(Self::with_state(canonical, state))
    }

    /// Shares `settings` with this shape. Changing them through any holder
    /// affects every shape holding the same handle.
    pub fn with_settings(mut self, settings: Shared<ShapeSettings>) -> Self {
        self.settings = settings;
        self.invalidate();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// A copy with a fresh identity and no listeners. The canonical path
    /// and settings handles are shared with `self`.
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::with_state(self.path.clone(), self.state);
        copy.settings = self.settings.clone();
        copy.style = self.style.clone();
        copy.parent_transform = self.parent_transform;
        copy
    }

    /// Canonical bounds every shape's path is normalised to.
    pub fn unit_rect_at_origin() -> Bounds {
        Bounds::new(-0.5, -0.5, 0.5, 0.5)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    pub fn state(&self) -> &ShapeState {
        &self.state
    }

    pub fn location(&self) -> Point {
        self.state.location
    }

    pub fn rotation_angle(&self) -> f64 {
        self.state.rotation_angle
    }

    pub fn scale(&self) -> Size {
        self.state.scale
    }

    pub fn offset(&self) -> Point {
        self.state.offset
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.state.operation_mode()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    pub fn settings(&self) -> Shared<ShapeSettings> {
        self.settings.clone()
    }

    pub fn snapshot(&self) -> ShapeSnapshot {
        ShapeSnapshot {
            state: self.state,
            path: self.path.clone(),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&GeometryChange) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // --- transforms -------------------------------------------------------

    /// Canonical space to drawing space (affine part only).
    pub fn transform(&self) -> Affine {
        self.state.transform()
    }

    /// Exact inverse of [`transform`](Self::transform).
    ///
    /// Fails with [`ShapeError::SingularTransform`] when either scale
    /// component is zero.
    pub fn inverse_transform(&self) -> ShapeResult<Affine> {
        self.state.inverse_transform()
    }

    /// Transform of the enclosing container, if any. Applied after the
    /// shape's own transform.
    pub fn set_parent_transform(&mut self, parent: Option<Affine>) {
        self.parent_transform = parent;
    }

    pub fn transform_including_parent(&self) -> Affine {
        let own = self.transform();
        match &self.parent_transform {
            Some(parent) => own.then(parent),
            None => own,
        }
    }

    pub fn inverse_transform_including_parent(&self) -> ShapeResult<Affine> {
        let own = self.inverse_transform()?;
        match &self.parent_transform {
            Some(parent) => Ok(parent.try_inverse()?.then(&own)),
            None => Ok(own),
        }
    }

    /// Drawing-space image of the canonical origin.
    pub fn location_ignoring_offset(&self) -> Point {
        self.transform().apply(Point::ORIGIN)
    }

    /// Maps a relative position inside the canonical box (`(0,0)` bottom
    /// left, `(1,1)` top right) into the drawing, warp included.
    pub fn convert_point_from_relative_location(&self, rloc: Point) -> Point {
        self.state
            .canonical_to_drawing(Point::new(rloc.x - 0.5, rloc.y - 0.5))
    }

    /// Flattening tolerance expressed in canonical units.
    fn canonical_tolerance(&self) -> f64 {
        let tol = self.settings.borrow().rendering.flatten_tolerance;
        let s = self.state.scale.width.abs().max(self.state.scale.height.abs());
        if s > f64::EPSILON {
            tol / s
        } else {
            tol
        }
    }

    fn flatten_tolerance(&self) -> f64 {
        self.settings.borrow().rendering.flatten_tolerance
    }

    /// The canonical path mapped into the drawing.
    ///
    /// Curves survive an undistorted transform. Distorted shapes are
    /// flattened first, since the warp is not affine.
    pub fn transformed_path(&self) -> Path {
        match self.state.deformation {
            Deformation::Standard => {
                let t = self.transform();
                map_path(self.path.path(), |c| t.apply(c))
            }
            Deformation::Distorted { .. } => {
                let state = self.state;
                flatten_and_map(self.path.path(), self.canonical_tolerance(), |c| {
                    state.canonical_to_drawing(c)
                })
            }
        }
    }

    /// Drawing-space bounds of the transformed path.
    pub fn bounds(&self) -> Bounds {
        let tolerance = self.flatten_tolerance();
        if let Some((cached_tolerance, bounds)) = self.bounds_cache.get() {
            if cached_tolerance == tolerance {
                return bounds;
            }
        }
        let bounds = path_bounds(&self.transformed_path());
        self.bounds_cache.set(Some((tolerance, bounds)));
        bounds
    }

    /// Convex hull of the transformed outline, counter-clockwise.
    pub fn convex_hull(&self) -> Vec<Point> {
        convex_hull(&flattened_points(
            &self.transformed_path(),
            self.flatten_tolerance(),
        ))
    }

    // --- knobs --------------------------------------------------------------

    pub fn knob_mask(&self) -> KnobMask {
        KnobMask(self.settings.borrow().knobs.knob_mask)
    }

    pub fn set_knob_mask(&mut self, mask: KnobMask) {
        self.settings.borrow_mut().knobs.knob_mask = mask.0;
    }

    /// Knobs exposed in the current mode, in hit-test priority order.
    pub fn knob_parts(&self) -> KnobParts {
        let mask = self.knob_mask();
        let candidates: &[PartCode] = if self.operation_mode().is_distorted() {
            &DISTORT_KNOBS
        } else {
            &STANDARD_KNOBS
        };
        candidates
            .iter()
            .copied()
            .filter(|pc| mask.contains(*pc))
            .collect()
    }

    /// Drawing-space position of a knob.
    pub fn knob_point(&self, pc: PartCode) -> ShapeResult<Point> {
        match pc.decode()? {
            Part::Size(handle) => Ok(self.transform().apply(handle.canonical_point())),
            Part::ObjectCentre => Ok(self.transform().apply(self.state.offset)),
            Part::OriginTarget | Part::EntireObject => Ok(self.state.location),
            Part::Rotation => Ok(self.rotation_knob_point()),
            Part::Distort(corner) => match self.state.deformation.quad() {
                Some(quad) => Ok(self.transform().apply(quad.corner(corner))),
                None => Err(ShapeError::unsupported_mode(
                    "distort knob point",
                    self.operation_mode(),
                )),
            },
            Part::None | Part::PathEdge => Err(ShapeError::UnknownPartCode(pc.raw())),
        }
    }

    /// The rotation knob: outward from the middle of the top edge by the
    /// configured clearance, in drawing units regardless of scale.
    pub fn rotation_knob_point(&self) -> Point {
        let clearance = self.settings.borrow().knobs.rotation_knob_clearance;
        let top = self.transform().apply(Point::new(0.0, 0.5));
        let up = if self.state.scale.height < 0.0 { -1.0 } else { 1.0 };
        let dir = Affine::rotation(self.state.rotation_angle).apply_vector(Point::new(0.0, up));
        Point::new(top.x + dir.x * clearance, top.y + dir.y * clearance)
    }

    pub fn cursor_for_part(&self, pc: PartCode) -> CursorHint {
        CursorHint::for_part(pc)
    }

    pub fn undo_action_name_for_part(&self, pc: PartCode) -> &'static str {
        undo_action_name(pc)
    }

    /// Which part of the shape lies under `p`.
    ///
    /// Knobs win, then the outline ([`PartCode::SNAP_TO_PATH_EDGE`]), then
    /// the fill ([`PartCode::ENTIRE_OBJECT`]). While a rotation drag is in
    /// progress only the rotation knob is considered.
    pub fn hit_part(&self, p: Point) -> ShapeResult<PartCode> {
        let tolerance = self.settings.borrow().knobs.hit_tolerance;

        if self.in_rotate_op() {
            let knob = self.rotation_knob_point();
            return Ok(if knob.distance_to(&p) <= tolerance {
                PartCode::ROTATION
            } else {
                PartCode::NONE
            });
        }

        for pc in self.knob_parts() {
            if self.knob_point(pc)?.distance_to(&p) <= tolerance {
                return Ok(pc);
            }
        }

        let canonical = match self.state.deformation {
            Deformation::Standard => Some(self.inverse_transform()?.apply(p)),
            Deformation::Distorted { .. } => None,
        };

        let drawn = self.transformed_path();
        if let Some(nearest) = nearest_point_on_outline(&drawn, p, self.flatten_tolerance()) {
            if nearest.distance_to(&p) <= tolerance {
                return Ok(PartCode::SNAP_TO_PATH_EDGE);
            }
        }

        let inside = match canonical {
            Some(c) => hit_test_path(
                &to_lyon(c),
                self.path.path().iter(),
                FillRule::NonZero,
                self.canonical_tolerance() as f32,
            ),
            None => hit_test_path(
                &to_lyon(p),
                drawn.iter(),
                FillRule::NonZero,
                self.flatten_tolerance() as f32,
            ),
        };
        Ok(if inside {
            PartCode::ENTIRE_OBJECT
        } else {
            PartCode::NONE
        })
    }

    // --- state changes --------------------------------------------------------

    pub(crate) fn invalidate(&self) {
        self.bounds_cache.set(None);
    }

    pub(crate) fn replace_state(&mut self, state: ShapeState) {
        self.state = state;
        self.invalidate();
    }

    /// Publishes a change from `before` to the current snapshot, unless
    /// nothing changed.
    pub(crate) fn notify(&self, action: &str, before: ShapeSnapshot) -> Option<GeometryChange> {
        let after = self.snapshot();
        if before == after {
            return None;
        }
        let change = GeometryChange {
            shape: self.id,
            action: action.to_string(),
            before,
            after,
        };
        self.events.emit(&change);
        Some(change)
    }

    fn update_state<F: FnOnce(&mut ShapeState)>(&mut self, action: &str, f: F) {
        let before = self.snapshot();
        let mut state = self.state;
        f(&mut state);
        self.replace_state(state);
        self.notify(action, before);
    }

    pub fn set_location(&mut self, location: Point) {
        self.update_state("Move", |s| s.location = location);
    }

    pub fn offset_location(&mut self, dx: f64, dy: f64) {
        self.update_state("Move", |s| {
            s.location = Point::new(s.location.x + dx, s.location.y + dy)
        });
    }

    /// Sets the scale. Zero components are allowed (a flat shape) but make
    /// the inverse transform unavailable until restored.
    pub fn set_size(&mut self, size: Size) {
        self.update_state("Resize", |s| s.scale = size);
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.update_state("Set Offset", |s| s.offset = offset);
    }

    /// Rotates about `location` to an absolute angle.
    pub fn rotate_to(&mut self, angle: f64) {
        self.update_state("Rotate", |s| s.rotation_angle = normalize_angle(angle));
    }

    pub fn unrotate(&mut self) {
        self.update_state("Unrotate", |s| s.rotation_angle = 0.0);
    }

    /// Mirrors the shape about the vertical axis through `location`.
    pub fn flip_horizontally(&mut self) {
        self.update_state("Flip Horizontally", |s| {
            s.scale.width = -s.scale.width;
            s.offset.x = -s.offset.x;
        });
    }

    /// Mirrors the shape about the horizontal axis through `location`.
    pub fn flip_vertically(&mut self) {
        self.update_state("Flip Vertically", |s| {
            s.scale.height = -s.scale.height;
            s.offset.y = -s.offset.y;
        });
    }

    /// Sets the rotation snap step shared by every shape using these
    /// settings. Steps outside (0, π] are ignored, matching what settings
    /// validation accepts.
    pub fn set_angular_constraint_angle(&mut self, radians: f64) {
        let degrees = radians.to_degrees();
        if !(degrees > 0.0 && degrees <= 180.0) {
            warn!("Ignoring angular constraint {} outside (0, 180] degrees", degrees);
            return;
        }
        self.settings.borrow_mut().constraints.angular_step_degrees = degrees;
    }

    pub fn angular_constraint_angle(&self) -> f64 {
        self.settings.borrow().angular_step_radians()
    }

    /// Whether size knobs rotate the shape when a drag allows rotation.
    /// Shared through the settings like the angular step.
    pub fn allow_size_knobs_to_rotate_shape(&self) -> bool {
        self.settings.borrow().knobs.size_knobs_rotate
    }

    pub fn set_allow_size_knobs_to_rotate_shape(&mut self, allow: bool) {
        self.settings.borrow_mut().knobs.size_knobs_rotate = allow;
    }

    /// Switches operation mode, cancelling any drag in progress.
    ///
    /// Entering a distort mode from Standard starts from the undistorted
    /// quad; moving between distort modes keeps the current quad; returning
    /// to Standard drops it.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        if self.session.is_some() {
            debug!("Operation mode change to {} cancels active drag", mode);
            self.cancel_drag();
        }
        if mode == self.operation_mode() {
            return;
        }
        let deformation = match (mode.distort_mode(), self.state.deformation) {
            (None, _) => Deformation::Standard,
            (Some(m), Deformation::Distorted { quad, .. }) => Deformation::Distorted { mode: m, quad },
            (Some(m), Deformation::Standard) => Deformation::Distorted {
                mode: m,
                quad: Quad::unit(),
            },
        };
        debug!("Shape {} operation mode -> {}", self.id, mode);
        self.update_state("Change Mode", |s| s.deformation = deformation);
    }

    pub fn distortion(&self) -> Option<&Quad> {
        self.state.deformation.quad()
    }

    /// Replaces the distortion quad; only valid in a distort mode.
    pub fn set_distortion(&mut self, quad: Quad) -> ShapeResult<()> {
        let mode = match self.state.deformation {
            Deformation::Distorted { mode, .. } => mode,
            Deformation::Standard => {
                return Err(ShapeError::unsupported_mode(
                    "set distortion",
                    OperationMode::Standard,
                ))
            }
        };
        self.update_state("Distort", |s| s.deformation = Deformation::Distorted { mode, quad });
        Ok(())
    }

    /// Replaces the canonical path. The new path must already be in unit
    /// space; the state is kept.
    pub fn set_path(&mut self, path: CanonicalPath) {
        let before = self.snapshot();
        self.path = path;
        self.invalidate();
        debug!("Shape {} path replaced ({} segments)", self.id, self.path.segment_count());
        self.notify("Change Path", before);
    }

    /// Takes a drawing-space path as the new outline.
    ///
    /// The path is read as drawn at the shape's current rotation: rotation
    /// is kept, while location and scale are refitted to the path and any
    /// offset or distortion is cleared.
    pub fn adopt_path(&mut self, path: &Path) -> ShapeResult<()> {
        let (canonical, state) = place_rotated_path(path, self.state.rotation_angle)?;
        let before = self.snapshot();
        self.path = canonical;
        self.replace_state(state);
        debug!("Shape {} adopted path at {}", self.id, self.state.location);
        self.notify("Adopt Path", before);
        Ok(())
    }

    /// Re-applies a snapshot, typically for undo or redo. Cancels any drag
    /// and does not notify.
    pub fn restore(&mut self, snapshot: &ShapeSnapshot) {
        self.session = None;
        self.path = snapshot.path.clone();
        self.replace_state(snapshot.state);
    }

    /// Renormalises the canonical path so its bounds are exactly the unit
    /// square, compensating scale and offset so nothing moves on screen.
    ///
    /// A distorted shape has its warp baked into the path and returns to
    /// Standard mode.
    pub fn reset_bounding_box(&mut self) -> ShapeResult<()> {
        let before = self.snapshot();
        let (source, mut state) = match self.state.deformation {
            Deformation::Standard => (self.path.path().clone(), self.state),
            Deformation::Distorted { mode, quad } => {
                let warped = flatten_and_map(self.path.path(), self.canonical_tolerance(), |c| {
                    quad.warp(mode, c)
                });
                let mut state = self.state;
                state.deformation = Deformation::Standard;
                (warped, state)
            }
        };

        let bounds = path_bounds(&source);
        let unit = Self::unit_rect_at_origin();
        if bounds.approx_eq(&unit, 1e-9) && state == self.state {
            return Ok(());
        }

        let (canonical, bounds) = CanonicalPath::normalize(&source)?;
        let (ex, ey) = normalizing_extents(&bounds);
        let center = bounds.center();
        state.scale = Size::new(state.scale.width * ex, state.scale.height * ey);
        state.offset = Point::new(
            (state.offset.x - center.x) / ex,
            (state.offset.y - center.y) / ey,
        );

        self.path = canonical;
        self.replace_state(state);
        self.notify("Reset Bounding Box", before);
        Ok(())
    }

    /// Bakes rotation (and any distortion) into the canonical path, leaving
    /// an unrotated shape that looks identical. `location` stays put.
    pub fn reset_bounding_box_and_rotation(&mut self) -> ShapeResult<()> {
        let before = self.snapshot();
        let s = self.state;
        let linear = Affine::translation(-s.offset.x, -s.offset.y)
            .then(&Affine::scale(s.scale.width, s.scale.height))
            .then(&Affine::rotation(s.rotation_angle));

        // drawing-space outline relative to location
        let relative = match s.deformation {
            Deformation::Standard => map_path(self.path.path(), |c| linear.apply(c)),
            Deformation::Distorted { mode, quad } => {
                flatten_and_map(self.path.path(), self.canonical_tolerance(), |c| {
                    linear.apply(quad.warp(mode, c))
                })
            }
        };

        let (canonical, bounds) = CanonicalPath::normalize(&relative)?;
        let (ex, ey) = normalizing_extents(&bounds);
        let center = bounds.center();
        let state = ShapeState {
            location: s.location,
            rotation_angle: 0.0,
            scale: Size::new(ex, ey),
            offset: Point::new(-center.x / ex, -center.y / ey),
            deformation: Deformation::Standard,
        };

        self.path = canonical;
        self.replace_state(state);
        self.notify("Reset Bounding Box", before);
        Ok(())
    }
}

/// Unrotates a drawing-space path about its centre and normalises it.
fn place_rotated_path(path: &Path, angle: f64) -> ShapeResult<(CanonicalPath, ShapeState)> {
    let pivot = path_bounds(path).center();
    let unrotate = Affine::translation(-pivot.x, -pivot.y)
        .then(&Affine::rotation(-angle))
        .then(&Affine::translation(pivot.x, pivot.y));
    let upright = map_path(path, |p| unrotate.apply(p));

    let (canonical, bounds) = CanonicalPath::normalize(&upright)?;
    let (ex, ey) = normalizing_extents(&bounds);
    let center = bounds.center();
    let rel = Affine::rotation(angle).apply_vector(Point::new(center.x - pivot.x, center.y - pivot.y));

    let mut state = ShapeState::new(Point::new(pivot.x + rel.x, pivot.y + rel.y), Size::new(ex, ey));
    state.rotation_angle = normalize_angle(angle);
    Ok((canonical, state))
}
