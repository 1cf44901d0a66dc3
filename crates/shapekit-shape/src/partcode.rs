//! Part codes, knob masks and cursor hints.
//!
//! Edge handles are single bits and corners are the OR of two edges, so
//! `PartCode::TOP | PartCode::LEFT == PartCode::TOP_LEFT`. Non-handle hits use
//! non-positive sentinels. Every code is decoded through an explicit table:
//! values outside it are rejected rather than interpreted arithmetically.

use std::fmt;
use std::ops::BitOr;

use shapekit_core::{Point, ShapeError, ShapeResult};

/// Integer tag identifying a handle or hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartCode(i32);

impl PartCode {
    pub const NONE: PartCode = PartCode(0);
    pub const ENTIRE_OBJECT: PartCode = PartCode(-1);
    pub const SNAP_TO_PATH_EDGE: PartCode = PartCode(-98);

    pub const LEFT: PartCode = PartCode(1 << 0);
    pub const TOP: PartCode = PartCode(1 << 1);
    pub const RIGHT: PartCode = PartCode(1 << 2);
    pub const BOTTOM: PartCode = PartCode(1 << 3);

    pub const TOP_LEFT: PartCode = PartCode((1 << 1) | (1 << 0));
    pub const TOP_RIGHT: PartCode = PartCode((1 << 1) | (1 << 2));
    pub const BOTTOM_LEFT: PartCode = PartCode((1 << 3) | (1 << 0));
    pub const BOTTOM_RIGHT: PartCode = PartCode((1 << 3) | (1 << 2));

    pub const OBJECT_CENTRE: PartCode = PartCode(1 << 8);
    pub const ORIGIN_TARGET: PartCode = PartCode(1 << 9);
    pub const ROTATION: PartCode = PartCode(1 << 10);

    pub const TOP_LEFT_DISTORT: PartCode = PartCode(1 << 11);
    pub const TOP_RIGHT_DISTORT: PartCode = PartCode(1 << 12);
    pub const BOTTOM_RIGHT_DISTORT: PartCode = PartCode(1 << 13);
    pub const BOTTOM_LEFT_DISTORT: PartCode = PartCode(1 << 14);

    pub const fn from_raw(raw: i32) -> Self {
        PartCode(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Decodes the code into a [`Part`].
    pub fn decode(self) -> ShapeResult<Part> {
        use HSide::{Left, Right};
        use VSide::{Bottom, Top};

        let size = |h, v| Ok(Part::Size(SizeHandle { h, v }));
        match self {
            PartCode::NONE => Ok(Part::None),
            PartCode::ENTIRE_OBJECT => Ok(Part::EntireObject),
            PartCode::SNAP_TO_PATH_EDGE => Ok(Part::PathEdge),
            PartCode::LEFT => size(Some(Left), None),
            PartCode::RIGHT => size(Some(Right), None),
            PartCode::TOP => size(None, Some(Top)),
            PartCode::BOTTOM => size(None, Some(Bottom)),
            PartCode::TOP_LEFT => size(Some(Left), Some(Top)),
            PartCode::TOP_RIGHT => size(Some(Right), Some(Top)),
            PartCode::BOTTOM_LEFT => size(Some(Left), Some(Bottom)),
            PartCode::BOTTOM_RIGHT => size(Some(Right), Some(Bottom)),
            PartCode::OBJECT_CENTRE => Ok(Part::ObjectCentre),
            PartCode::ORIGIN_TARGET => Ok(Part::OriginTarget),
            PartCode::ROTATION => Ok(Part::Rotation),
            PartCode::TOP_LEFT_DISTORT => Ok(Part::Distort(Corner::TopLeft)),
            PartCode::TOP_RIGHT_DISTORT => Ok(Part::Distort(Corner::TopRight)),
            PartCode::BOTTOM_RIGHT_DISTORT => Ok(Part::Distort(Corner::BottomRight)),
            PartCode::BOTTOM_LEFT_DISTORT => Ok(Part::Distort(Corner::BottomLeft)),
            PartCode(raw) => Err(ShapeError::UnknownPartCode(raw)),
        }
    }

    /// True for codes that name a draggable knob rather than a hit region.
    pub fn is_knob(self) -> bool {
        self.mask_bit().is_some()
    }

    /// Bit of this knob in a [`KnobMask`]. Corners have their own bits there,
    /// separate from the two edges they are composed of.
    pub fn mask_bit(self) -> Option<u32> {
        let bit = match self {
            PartCode::LEFT => 0,
            PartCode::TOP => 1,
            PartCode::RIGHT => 2,
            PartCode::BOTTOM => 3,
            PartCode::TOP_LEFT => 4,
            PartCode::TOP_RIGHT => 5,
            PartCode::BOTTOM_LEFT => 6,
            PartCode::BOTTOM_RIGHT => 7,
            PartCode::OBJECT_CENTRE => 8,
            PartCode::ORIGIN_TARGET => 9,
            PartCode::ROTATION => 10,
            PartCode::TOP_LEFT_DISTORT => 11,
            PartCode::TOP_RIGHT_DISTORT => 12,
            PartCode::BOTTOM_RIGHT_DISTORT => 13,
            PartCode::BOTTOM_LEFT_DISTORT => 14,
            _ => return None,
        };
        Some(1 << bit)
    }
}

impl BitOr for PartCode {
    type Output = PartCode;

    fn bitor(self, rhs: PartCode) -> PartCode {
        PartCode(self.0 | rhs.0)
    }
}

impl fmt::Display for PartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(part) => write!(f, "{:?}", part),
            Err(_) => write!(f, "PartCode({})", self.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VSide {
    Top,
    Bottom,
}

/// An edge or corner size handle. At least one side is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeHandle {
    pub h: Option<HSide>,
    pub v: Option<VSide>,
}

impl SizeHandle {
    /// Position on the canonical unit square.
    pub fn canonical_point(&self) -> Point {
        let x = match self.h {
            Some(HSide::Left) => -0.5,
            Some(HSide::Right) => 0.5,
            None => 0.0,
        };
        let y = match self.v {
            Some(VSide::Top) => 0.5,
            Some(VSide::Bottom) => -0.5,
            None => 0.0,
        };
        Point::new(x, y)
    }

    /// The handle on the far side of the box.
    pub fn opposite(&self) -> SizeHandle {
        SizeHandle {
            h: self.h.map(|h| match h {
                HSide::Left => HSide::Right,
                HSide::Right => HSide::Left,
            }),
            v: self.v.map(|v| match v {
                VSide::Top => VSide::Bottom,
                VSide::Bottom => VSide::Top,
            }),
        }
    }

    pub fn is_corner(&self) -> bool {
        self.h.is_some() && self.v.is_some()
    }

    pub fn part_code(&self) -> PartCode {
        let h = match self.h {
            Some(HSide::Left) => PartCode::LEFT,
            Some(HSide::Right) => PartCode::RIGHT,
            None => PartCode::NONE,
        };
        let v = match self.v {
            Some(VSide::Top) => PartCode::TOP,
            Some(VSide::Bottom) => PartCode::BOTTOM,
            None => PartCode::NONE,
        };
        h | v
    }
}

/// Corner of the distortion quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn part_code(self) -> PartCode {
        match self {
            Corner::TopLeft => PartCode::TOP_LEFT_DISTORT,
            Corner::TopRight => PartCode::TOP_RIGHT_DISTORT,
            Corner::BottomRight => PartCode::BOTTOM_RIGHT_DISTORT,
            Corner::BottomLeft => PartCode::BOTTOM_LEFT_DISTORT,
        }
    }

    /// The other corner on the same horizontal edge.
    pub fn horizontal_partner(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::TopRight,
            Corner::TopRight => Corner::TopLeft,
            Corner::BottomRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::BottomRight,
        }
    }

    /// The other corner on the same vertical edge.
    pub fn vertical_partner(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopLeft,
            Corner::TopRight => Corner::BottomRight,
            Corner::BottomRight => Corner::TopRight,
        }
    }
}

/// Decoded form of a [`PartCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    None,
    EntireObject,
    PathEdge,
    Size(SizeHandle),
    ObjectCentre,
    OriginTarget,
    Rotation,
    Distort(Corner),
}

impl Part {
    pub fn part_code(&self) -> PartCode {
        match self {
            Part::None => PartCode::NONE,
            Part::EntireObject => PartCode::ENTIRE_OBJECT,
            Part::PathEdge => PartCode::SNAP_TO_PATH_EDGE,
            Part::Size(handle) => handle.part_code(),
            Part::ObjectCentre => PartCode::OBJECT_CENTRE,
            Part::OriginTarget => PartCode::ORIGIN_TARGET,
            Part::Rotation => PartCode::ROTATION,
            Part::Distort(corner) => corner.part_code(),
        }
    }
}

/// Bitmask selecting which knobs a shape exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnobMask(pub u32);

impl KnobMask {
    pub const ALL: KnobMask = KnobMask(u32::MAX);
    pub const ALL_SIZE: KnobMask = KnobMask(u32::MAX & !((1 << 10) | (1 << 9) | (1 << 8)));
    pub const HORIZONTAL_SIZING: KnobMask =
        KnobMask((1 << 0) | (1 << 2) | (1 << 4) | (1 << 5) | (1 << 6) | (1 << 7));
    pub const VERTICAL_SIZING: KnobMask =
        KnobMask((1 << 1) | (1 << 3) | (1 << 4) | (1 << 5) | (1 << 6) | (1 << 7));
    pub const ALL_LEFT: KnobMask = KnobMask((1 << 0) | (1 << 4) | (1 << 6));
    pub const ALL_RIGHT: KnobMask = KnobMask((1 << 2) | (1 << 5) | (1 << 7));
    pub const ALL_TOP: KnobMask = KnobMask((1 << 1) | (1 << 4) | (1 << 5));
    pub const ALL_BOTTOM: KnobMask = KnobMask((1 << 3) | (1 << 6) | (1 << 7));
    pub const CORNERS: KnobMask = KnobMask((1 << 4) | (1 << 5) | (1 << 6) | (1 << 7));
    pub const NWSE_CORNERS: KnobMask = KnobMask((1 << 4) | (1 << 7));
    pub const NESW_CORNERS: KnobMask = KnobMask((1 << 6) | (1 << 5));
    pub const EW_HANDLES: KnobMask = KnobMask((1 << 0) | (1 << 2));
    pub const NS_HANDLES: KnobMask = KnobMask((1 << 1) | (1 << 3));

    pub fn contains(&self, pc: PartCode) -> bool {
        pc.mask_bit().is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn without(self, pc: PartCode) -> KnobMask {
        match pc.mask_bit() {
            Some(bit) => KnobMask(self.0 & !bit),
            None => self,
        }
    }
}

impl BitOr for KnobMask {
    type Output = KnobMask;

    fn bitor(self, rhs: KnobMask) -> KnobMask {
        KnobMask(self.0 | rhs.0)
    }
}

/// Cursor to show while hovering or dragging a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorHint {
    Arrow,
    ResizeHorizontal,
    ResizeVertical,
    ResizeNwse,
    ResizeNesw,
    Rotate,
    Move,
    Crosshair,
}

impl CursorHint {
    /// Pure lookup from the part code; unknown codes get the arrow.
    pub fn for_part(pc: PartCode) -> CursorHint {
        match pc {
            PartCode::LEFT | PartCode::RIGHT => CursorHint::ResizeHorizontal,
            PartCode::TOP | PartCode::BOTTOM => CursorHint::ResizeVertical,
            PartCode::TOP_LEFT | PartCode::BOTTOM_RIGHT => CursorHint::ResizeNwse,
            PartCode::TOP_RIGHT | PartCode::BOTTOM_LEFT => CursorHint::ResizeNesw,
            PartCode::ROTATION => CursorHint::Rotate,
            PartCode::ENTIRE_OBJECT | PartCode::OBJECT_CENTRE | PartCode::ORIGIN_TARGET => {
                CursorHint::Move
            }
            PartCode::TOP_LEFT_DISTORT
            | PartCode::TOP_RIGHT_DISTORT
            | PartCode::BOTTOM_RIGHT_DISTORT
            | PartCode::BOTTOM_LEFT_DISTORT => CursorHint::Crosshair,
            _ => CursorHint::Arrow,
        }
    }
}

/// Name an undo collaborator shows for an operation that dragged `pc`.
pub fn undo_action_name(pc: PartCode) -> &'static str {
    match pc.decode() {
        Ok(Part::Size(_)) => "Resize",
        Ok(Part::Rotation) => "Rotate",
        Ok(Part::EntireObject | Part::ObjectCentre) => "Move",
        Ok(Part::OriginTarget) => "Move Origin",
        Ok(Part::Distort(_)) => "Distort",
        _ => "Change Shape",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_edge_unions() {
        assert_eq!(PartCode::TOP | PartCode::LEFT, PartCode::TOP_LEFT);
        assert_eq!(PartCode::BOTTOM | PartCode::RIGHT, PartCode::BOTTOM_RIGHT);
        let handle = match PartCode::TOP_LEFT.decode().unwrap() {
            Part::Size(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(handle.canonical_point(), Point::new(-0.5, 0.5));
        assert!(handle.is_corner());
    }

    #[test]
    fn test_decode_rejects_unknown_combinations() {
        let left_right = PartCode::LEFT | PartCode::RIGHT;
        assert_eq!(
            left_right.decode(),
            Err(ShapeError::UnknownPartCode(left_right.raw()))
        );
        assert!(PartCode::from_raw(-2).decode().is_err());
        assert!(PartCode::from_raw(1 << 20).decode().is_err());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(PartCode::NONE.decode().unwrap(), Part::None);
        assert_eq!(PartCode::ENTIRE_OBJECT.decode().unwrap(), Part::EntireObject);
        assert_eq!(PartCode::SNAP_TO_PATH_EDGE.decode().unwrap(), Part::PathEdge);
        assert!(PartCode::SNAP_TO_PATH_EDGE.raw() < 0);
        assert!(!PartCode::SNAP_TO_PATH_EDGE.is_knob());
    }

    #[test]
    fn test_decode_round_trips_through_part() {
        for raw in -100..(1 << 15) {
            let pc = PartCode::from_raw(raw);
            if let Ok(part) = pc.decode() {
                assert_eq!(part.part_code(), pc);
            }
        }
    }

    #[test]
    fn test_opposite_handles() {
        let tl = SizeHandle {
            h: Some(HSide::Left),
            v: Some(VSide::Top),
        };
        assert_eq!(tl.opposite().part_code(), PartCode::BOTTOM_RIGHT);
        let top = SizeHandle {
            h: None,
            v: Some(VSide::Top),
        };
        assert_eq!(top.opposite().canonical_point(), Point::new(0.0, -0.5));
    }

    #[test]
    fn test_knob_masks() {
        assert!(KnobMask::ALL.contains(PartCode::ROTATION));
        assert!(!KnobMask::ALL_SIZE.contains(PartCode::ROTATION));
        assert!(!KnobMask::ALL_SIZE.contains(PartCode::ORIGIN_TARGET));
        assert!(KnobMask::ALL_SIZE.contains(PartCode::TOP_LEFT));
        assert!(KnobMask::HORIZONTAL_SIZING.contains(PartCode::LEFT));
        assert!(!KnobMask::HORIZONTAL_SIZING.contains(PartCode::TOP));
        assert!(KnobMask::CORNERS.contains(PartCode::BOTTOM_LEFT));
        assert!(!KnobMask::CORNERS.contains(PartCode::BOTTOM));
        assert_eq!(
            KnobMask::NWSE_CORNERS | KnobMask::NESW_CORNERS,
            KnobMask::CORNERS
        );
        assert!(!KnobMask::ALL.contains(PartCode::ENTIRE_OBJECT));
        assert!(!KnobMask::ALL.without(PartCode::LEFT).contains(PartCode::LEFT));
    }

    #[test]
    fn test_cursor_table() {
        assert_eq!(CursorHint::for_part(PartCode::LEFT), CursorHint::ResizeHorizontal);
        assert_eq!(CursorHint::for_part(PartCode::BOTTOM), CursorHint::ResizeVertical);
        assert_eq!(CursorHint::for_part(PartCode::TOP_LEFT), CursorHint::ResizeNwse);
        assert_eq!(CursorHint::for_part(PartCode::TOP_RIGHT), CursorHint::ResizeNesw);
        assert_eq!(CursorHint::for_part(PartCode::ROTATION), CursorHint::Rotate);
        assert_eq!(CursorHint::for_part(PartCode::ENTIRE_OBJECT), CursorHint::Move);
        assert_eq!(CursorHint::for_part(PartCode::NONE), CursorHint::Arrow);
    }

    #[test]
    fn test_undo_action_names() {
        assert_eq!(undo_action_name(PartCode::RIGHT), "Resize");
        assert_eq!(undo_action_name(PartCode::ROTATION), "Rotate");
        assert_eq!(undo_action_name(PartCode::ENTIRE_OBJECT), "Move");
        assert_eq!(undo_action_name(PartCode::ORIGIN_TARGET), "Move Origin");
        assert_eq!(undo_action_name(PartCode::TOP_RIGHT_DISTORT), "Distort");
        assert_eq!(undo_action_name(PartCode::from_raw(77)), "Change Shape");
    }
}
