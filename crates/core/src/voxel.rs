//! Voxel primitives: frame extents, faces, and per-face visibility masks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest extent the source editor allows on any axis.
pub const MAX_EXTENT: i32 = 256;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Faces of a voxel that are not covered by a neighbor.
    ///
    /// Bit order matches the mesh wire format: bit0 = -Z through bit5 = +Y.
    pub struct FaceMask: u8 {
        const NEG_Z = 0b0000_0001;
        const NEG_X = 0b0000_0010;
        const NEG_Y = 0b0000_0100;
        const POS_Z = 0b0000_1000;
        const POS_X = 0b0001_0000;
        const POS_Y = 0b0010_0000;
    }
}

impl Default for FaceMask {
    fn default() -> Self {
        FaceMask::all()
    }
}

/// Axis-aligned face of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Facing -Z.
    NegZ,
    /// Facing -X.
    NegX,
    /// Facing -Y.
    NegY,
    /// Facing +Z.
    PosZ,
    /// Facing +X.
    PosX,
    /// Facing +Y.
    PosY,
}

impl Face {
    /// All faces in mask bit order.
    pub const ALL: [Face; 6] = [
        Face::NegZ,
        Face::NegX,
        Face::NegY,
        Face::PosZ,
        Face::PosX,
        Face::PosY,
    ];

    /// Mask bit for this face.
    pub const fn flag(self) -> FaceMask {
        match self {
            Face::NegZ => FaceMask::NEG_Z,
            Face::NegX => FaceMask::NEG_X,
            Face::NegY => FaceMask::NEG_Y,
            Face::PosZ => FaceMask::POS_Z,
            Face::PosX => FaceMask::POS_X,
            Face::PosY => FaceMask::POS_Y,
        }
    }

    /// Unit step (dx, dy, dz) towards the neighbor sharing this face.
    pub const fn offset(self) -> [isize; 3] {
        match self {
            Face::NegZ => [0, 0, -1],
            Face::NegX => [-1, 0, 0],
            Face::NegY => [0, -1, 0],
            Face::PosZ => [0, 0, 1],
            Face::PosX => [1, 0, 0],
            Face::PosY => [0, 1, 0],
        }
    }
}

/// Extents of a frame in output axis order.
///
/// Stored as signed integers because that is how both the source container
/// and the mesh header carry them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Bounds {
    /// Empty extents.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Whether every axis lies in `0..=MAX_EXTENT`.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|&extent| (0..=MAX_EXTENT).contains(&extent))
    }

    /// Whether a local position lies strictly inside the extents.
    pub fn contains(&self, x: u8, y: u8, z: u8) -> bool {
        i32::from(x) < self.x && i32::from(y) < self.y && i32::from(z) < self.z
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    /// Extents as unsigned sizes; negative axes clamp to zero.
    pub fn dims(&self) -> [usize; 3] {
        [self.x, self.y, self.z].map(|extent| extent.max(0) as usize)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// A single colored voxel inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// Palette index, passed through untouched.
    pub color: u8,
    /// Faces left visible after culling.
    pub mask: FaceMask,
}

impl Voxel {
    /// Voxel with every face visible.
    pub const fn new(x: u8, y: u8, z: u8, color: u8) -> Self {
        Self {
            x,
            y,
            z,
            color,
            mask: FaceMask::all(),
        }
    }

    /// A voxel with no visible face contributes nothing to the mesh.
    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.mask.is_empty()
    }

    #[inline]
    pub fn position(&self) -> [u8; 3] {
        [self.x, self.y, self.z]
    }
}
