//! Interactive drag operations: resize, rotate, move, move-origin, distort.
//!
//! A drag is an explicit [`DragSession`] that exists only between
//! `begin_drag` and `end_drag`/`cancel_drag`. Every move recomputes the state
//! from the pre-drag snapshot using the pre-drag inverse transform, so scale
//! updates never feed back into their own conversion. Listeners hear about
//! the drag once, when it ends.

use shapekit_core::{Point, ShapeError, ShapeResult, Size};
use tracing::{debug, trace, warn};

use crate::distortion::{Deformation, DistortMode};
use crate::events::GeometryChange;
use crate::partcode::{undo_action_name, Corner, Part, PartCode, SizeHandle};
use crate::shape::{normalize_angle, DrawableShape};
use crate::state::{ShapeSnapshot, ShapeState};
use crate::transform::Affine;

/// Ratios below this are treated as a zero-length handle arm.
const ARM_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
enum DragKind {
    Resize {
        handle: SizeHandle,
        /// Fixed point, canonical coordinates.
        anchor: Point,
        start_inverse: Affine,
    },
    Rotate {
        /// Rotation angle when the drag started.
        baseline: f64,
        /// Angle from location to the drag start point.
        reference: f64,
    },
    Move,
    MoveOrigin {
        start_inverse: Affine,
    },
    Distort {
        mode: DistortMode,
        corner: Corner,
        start_inverse: Affine,
    },
}

/// State of a drag in progress.
#[derive(Debug, Clone)]
pub(crate) struct DragSession {
    part: PartCode,
    kind: DragKind,
    before: ShapeSnapshot,
    start_point: Point,
}

impl DragSession {
    fn start_state(&self) -> &ShapeState {
        &self.before.state
    }

    /// Size knobs that rotate the shape are undone as a rotation.
    fn action_name(&self) -> &'static str {
        match self.kind {
            DragKind::Rotate { .. } => undo_action_name(PartCode::ROTATION),
            _ => undo_action_name(self.part),
        }
    }
}

impl DrawableShape {
    /// Starts dragging `pc` from drawing-space point `at`.
    ///
    /// Any drag already in progress is ended (and notified) first. Fails with
    /// [`ShapeError::SingularTransform`] when the drag needs to convert
    /// points into canonical space and the shape is degenerate.
    pub fn begin_drag(&mut self, pc: PartCode, at: Point) -> ShapeResult<()> {
        if self.session.is_some() {
            self.end_drag();
        }

        let state = *self.state();
        let kind = match pc.decode()? {
            Part::Size(handle) => {
                let anchor = self.take_anchor(handle);
                DragKind::Resize {
                    handle,
                    anchor,
                    start_inverse: state.inverse_transform()?,
                }
            }
            Part::Rotation => DragKind::Rotate {
                baseline: state.rotation_angle,
                reference: state.location.angle_to(&at),
            },
            Part::EntireObject | Part::ObjectCentre => DragKind::Move,
            Part::OriginTarget => DragKind::MoveOrigin {
                start_inverse: state.inverse_transform()?,
            },
            Part::Distort(corner) => match state.deformation {
                Deformation::Distorted { mode, .. } => DragKind::Distort {
                    mode,
                    corner,
                    start_inverse: state.inverse_transform()?,
                },
                Deformation::Standard => {
                    return Err(ShapeError::unsupported_mode(
                        "drag distort knob",
                        state.operation_mode(),
                    ))
                }
            },
            Part::None | Part::PathEdge => return Err(ShapeError::UnknownPartCode(pc.raw())),
        };
        self.start_session(pc, kind, at);
        Ok(())
    }

    /// Starts a rotation drag held by size knob `pc`.
    fn begin_size_knob_rotation(&mut self, pc: PartCode, at: Point) {
        if self.session.is_some() {
            self.end_drag();
        }
        let state = *self.state();
        let kind = DragKind::Rotate {
            baseline: state.rotation_angle,
            reference: state.location.angle_to(&at),
        };
        self.start_session(pc, kind, at);
    }

    fn start_session(&mut self, pc: PartCode, kind: DragKind, at: Point) {
        debug!("Shape {} begin drag of {} at {}", self.id(), pc, at);
        self.session = Some(DragSession {
            part: pc,
            kind,
            before: self.snapshot(),
            start_point: at,
        });
    }

    /// Drags knob `pc` to drawing-space point `p`.
    ///
    /// Starts a drag from the knob's current position if none is active.
    /// With `allow_rotate` false the rotation knob does not move. With
    /// `allow_rotate` true and [`DrawableShape::allow_size_knobs_to_rotate_shape`]
    /// set, a size knob starts a rotation instead of a resize. `constrain`
    /// snaps rotation to the angular step and locks the aspect ratio of
    /// corner resizes.
    pub fn move_knob(
        &mut self,
        pc: PartCode,
        p: Point,
        allow_rotate: bool,
        constrain: bool,
    ) -> ShapeResult<()> {
        if pc == PartCode::ROTATION && !allow_rotate {
            trace!("Rotation knob drag ignored, rotation not allowed");
            return Ok(());
        }

        match &self.session {
            Some(session) if session.part == pc => {}
            _ => {
                let start = self.knob_point(pc)?;
                let size_knob = matches!(pc.decode()?, Part::Size(_));
                if size_knob && allow_rotate && self.allow_size_knobs_to_rotate_shape() {
                    self.begin_size_knob_rotation(pc, start);
                } else {
                    self.begin_drag(pc, start)?;
                }
            }
        }

        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        let state = self.drag_state(&session, p, constrain);
        trace!("Drag {} to {}", pc, p);
        self.replace_state(state);
        Ok(())
    }

    /// Rotates the shape so the reference point follows `rp`, starting a
    /// rotation drag from the rotation knob if none is active.
    pub fn rotate_using_reference_point(&mut self, rp: Point, constrain: bool) -> ShapeResult<()> {
        self.move_knob(PartCode::ROTATION, rp, true, constrain)
    }

    /// Finishes the active drag and publishes a single change, if the drag
    /// changed anything.
    pub fn end_drag(&mut self) -> Option<GeometryChange> {
        let session = self.session.take()?;
        debug!("Shape {} end drag of {}", self.id(), session.part);
        self.notify(session.action_name(), session.before)
    }

    /// Abandons the active drag, restoring the pre-drag state silently.
    pub fn cancel_drag(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Shape {} cancel drag of {}", self.id(), session.part);
            self.replace_state(session.before.state);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Part being dragged, if any.
    pub fn active_part(&self) -> Option<PartCode> {
        self.session.as_ref().map(|s| s.part)
    }

    /// True while a rotation drag is in progress.
    pub fn in_rotate_op(&self) -> bool {
        matches!(
            self.session,
            Some(DragSession {
                kind: DragKind::Rotate { .. },
                ..
            })
        )
    }

    /// Selects the part held fixed by the next resize drag. By default the
    /// opposite handle is fixed. [`PartCode::NONE`] restores the default.
    pub fn set_drag_anchor_to_part(&mut self, pc: PartCode) -> ShapeResult<()> {
        match pc.decode()? {
            Part::None => self.pending_anchor = None,
            Part::Size(_) | Part::ObjectCentre | Part::OriginTarget => {
                self.pending_anchor = Some(pc)
            }
            other => warn!("{:?} cannot anchor a resize, ignored", other),
        }
        Ok(())
    }

    fn take_anchor(&mut self, handle: SizeHandle) -> Point {
        match self.pending_anchor.take().map(PartCode::decode) {
            Some(Ok(Part::Size(h))) => h.canonical_point(),
            Some(Ok(Part::ObjectCentre | Part::OriginTarget)) => self.offset(),
            _ => handle.opposite().canonical_point(),
        }
    }

    /// State for the drag point `p`, derived from the pre-drag state.
    fn drag_state(&self, session: &DragSession, p: Point, constrain: bool) -> ShapeState {
        let start = *session.start_state();
        let mut state = start;
        match session.kind {
            DragKind::Resize {
                handle,
                anchor,
                start_inverse,
            } => {
                let c = start_inverse.apply(p);
                let h = handle.canonical_point();
                let mut rx = axis_ratio(handle.h.is_some(), c.x, anchor.x, h.x);
                let mut ry = axis_ratio(handle.v.is_some(), c.y, anchor.y, h.y);
                if constrain
                    && handle.is_corner()
                    && self.settings().borrow().constraints.lock_aspect_on_constrain
                {
                    let m = rx.abs().max(ry.abs());
                    rx = m.copysign(rx);
                    ry = m.copysign(ry);
                }
                state.scale = Size::new(start.scale.width * rx, start.scale.height * ry);

                // keep the anchor's drawing-space image fixed
                let fixed = start.transform().apply(anchor);
                let arm = Affine::rotation(start.rotation_angle).apply_vector(Point::new(
                    state.scale.width * (anchor.x - start.offset.x),
                    state.scale.height * (anchor.y - start.offset.y),
                ));
                state.location = Point::new(fixed.x - arm.x, fixed.y - arm.y);
            }
            DragKind::Rotate {
                baseline,
                reference,
            } => {
                let mut delta = start.location.angle_to(&p) - reference;
                if constrain {
                    let step = self.angular_constraint_angle();
                    delta = (delta / step).round() * step;
                }
                state.rotation_angle = normalize_angle(baseline + delta);
            }
            DragKind::Move => {
                state.location = Point::new(
                    start.location.x + p.x - session.start_point.x,
                    start.location.y + p.y - session.start_point.y,
                );
            }
            DragKind::MoveOrigin { start_inverse } => {
                state.offset = start_inverse.apply(p);
                state.location = p;
            }
            DragKind::Distort {
                mode,
                corner,
                start_inverse,
            } => {
                if let Deformation::Distorted { quad, .. } = start.deformation {
                    let mut quad = quad;
                    quad.move_corner(mode, corner, start_inverse.apply(p));
                    state.deformation = Deformation::Distorted { mode, quad };
                }
            }
        }
        state
    }
}

/// Scale ratio along one axis for a handle at `handle` dragged to `c`,
/// with `anchor` fixed. Axes the handle does not control keep ratio 1.
fn axis_ratio(active: bool, c: f64, anchor: f64, handle: f64) -> f64 {
    let arm = handle - anchor;
    if !active || arm.abs() < ARM_EPSILON {
        return 1.0;
    }
    (c - anchor) / arm
}
