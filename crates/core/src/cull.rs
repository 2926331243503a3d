//! Optimization levels and the per-frame face culler.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{compute_mask, CoreError, FaceMask, Frame, OccupancyGrid, Voxel};

/// How aggressively enclosed voxels are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptimizationLevel {
    /// Keep every voxel; masks are written as fully visible.
    None = 0,
    /// Compute masks and drop voxels with no visible face.
    Cull = 1,
    /// Reserved for finer passes; currently identical to [`OptimizationLevel::Cull`].
    Reserved = 2,
}

impl OptimizationLevel {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether neighbor masks are computed and hidden voxels dropped.
    pub const fn culls(self) -> bool {
        !matches!(self, OptimizationLevel::None)
    }
}

impl Default for OptimizationLevel {
    fn default() -> Self {
        OptimizationLevel::Cull
    }
}

impl TryFrom<u8> for OptimizationLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptimizationLevel::None),
            1 => Ok(OptimizationLevel::Cull),
            2 => Ok(OptimizationLevel::Reserved),
            other => Err(CoreError::InvalidOptimizationLevel(other)),
        }
    }
}

impl From<OptimizationLevel> for u8 {
    fn from(level: OptimizationLevel) -> Self {
        level.as_u8()
    }
}

/// Turns a source frame into a canonical, masked frame.
///
/// Output voxels are always in x/y/z scan order regardless of source order,
/// so converting the same scene twice yields identical frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceCuller {
    level: OptimizationLevel,
}

impl FaceCuller {
    pub fn new(level: OptimizationLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> OptimizationLevel {
        self.level
    }

    /// Build the frame's occupancy grid and emit its masked voxels.
    pub fn cull(&self, frame: &Frame) -> Frame {
        let grid = OccupancyGrid::from_frame(frame);
        let mut voxels = Vec::with_capacity(frame.len());
        let mut hidden = 0usize;

        for (x, y, z, color) in grid.occupied() {
            let mask = if self.level.culls() {
                compute_mask(&grid, x, y, z)
            } else {
                FaceMask::all()
            };
            if mask.is_empty() {
                hidden += 1;
                continue;
            }
            voxels.push(Voxel {
                x,
                y,
                z,
                color,
                mask,
            });
        }

        debug!(
            level = self.level.as_u8(),
            bounds = %frame.bounds(),
            source = frame.len(),
            kept = voxels.len(),
            hidden,
            "culled frame"
        );
        Frame::from_checked(frame.bounds(), voxels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bounds;

    fn solid_cube(edge: u8) -> Frame {
        let mut voxels = Vec::new();
        for x in 0..edge {
            for y in 0..edge {
                for z in 0..edge {
                    voxels.push(Voxel::new(x, y, z, 5));
                }
            }
        }
        let extent = i32::from(edge);
        Frame::new(Bounds::new(extent, extent, extent), voxels).unwrap()
    }

    #[test]
    fn level_parsing_accepts_defined_levels_only() {
        assert_eq!(OptimizationLevel::try_from(0), Ok(OptimizationLevel::None));
        assert_eq!(OptimizationLevel::try_from(1), Ok(OptimizationLevel::Cull));
        assert_eq!(OptimizationLevel::try_from(2), Ok(OptimizationLevel::Reserved));
        assert_eq!(
            OptimizationLevel::try_from(3),
            Err(CoreError::InvalidOptimizationLevel(3))
        );
        assert_eq!(OptimizationLevel::default(), OptimizationLevel::Cull);
    }

    #[test]
    fn level_zero_keeps_enclosed_voxels_fully_visible() {
        let culled = FaceCuller::new(OptimizationLevel::None).cull(&solid_cube(3));
        assert_eq!(culled.len(), 27);
        assert!(culled.voxels().iter().all(|v| v.mask == FaceMask::all()));
    }

    #[test]
    fn level_one_drops_enclosed_center() {
        let culled = FaceCuller::new(OptimizationLevel::Cull).cull(&solid_cube(3));
        assert_eq!(culled.len(), 26);
        assert!(!culled
            .voxels()
            .iter()
            .any(|v| v.position() == [1, 1, 1]));
        assert!(culled.voxels().iter().all(Voxel::is_visible));
    }

    #[test]
    fn reserved_level_matches_cull() {
        let frame = solid_cube(4);
        let cull = FaceCuller::new(OptimizationLevel::Cull).cull(&frame);
        let reserved = FaceCuller::new(OptimizationLevel::Reserved).cull(&frame);
        assert_eq!(cull, reserved);
        assert_eq!(cull.len(), 4 * 4 * 4 - 2 * 2 * 2);
    }

    #[test]
    fn isolated_voxels_survive_every_level() {
        let frame = Frame::new(
            Bounds::new(5, 5, 5),
            vec![Voxel::new(0, 0, 0, 1), Voxel::new(2, 2, 2, 2), Voxel::new(4, 4, 4, 3)],
        )
        .unwrap();
        for level in [
            OptimizationLevel::None,
            OptimizationLevel::Cull,
            OptimizationLevel::Reserved,
        ] {
            let culled = FaceCuller::new(level).cull(&frame);
            assert_eq!(culled.len(), 3);
            assert!(culled.voxels().iter().all(|v| v.mask == FaceMask::all()));
        }
    }

    #[test]
    fn pair_scenario_masks() {
        let frame = Frame::new(
            Bounds::new(2, 1, 1),
            vec![Voxel::new(1, 0, 0, 4), Voxel::new(0, 0, 0, 4)],
        )
        .unwrap();
        let culled = FaceCuller::new(OptimizationLevel::Cull).cull(&frame);
        let masks: Vec<u8> = culled.voxels().iter().map(|v| v.mask.bits()).collect();
        assert_eq!(masks, vec![0b10_1111, 0b11_1101]);
        assert_eq!(culled.voxels()[0].position(), [0, 0, 0]);
    }

    #[test]
    fn empty_frame_stays_empty() {
        let frame = Frame::empty(Bounds::new(4, 4, 4)).unwrap();
        let culled = FaceCuller::default().cull(&frame);
        assert!(culled.is_empty());
        assert_eq!(culled.bounds(), Bounds::new(4, 4, 4));
    }
}
