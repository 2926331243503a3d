use thiserror::Error;

use crate::Bounds;

/// Violations of the scene model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A frame declared extents outside `0..=MAX_EXTENT`.
    #[error("invalid frame bounds {0}")]
    InvalidBounds(Bounds),
    /// A voxel position does not fit inside its frame.
    #[error("voxel ({x}, {y}, {z}) lies outside frame bounds {bounds}")]
    VoxelOutOfBounds {
        x: u8,
        y: u8,
        z: u8,
        bounds: Bounds,
    },
    /// Only levels 0, 1 and 2 are defined.
    #[error("unsupported optimization level {0} (expected 0, 1 or 2)")]
    InvalidOptimizationLevel(u8),
}
