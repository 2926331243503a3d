//! Padded occupancy grid used for neighbor queries during culling.
//!
//! The grid is one cell larger than the frame on every side. Real voxels live
//! at `(x + 1, y + 1, z + 1)` and the border stays empty, so all six
//! neighbors of any voxel can be read without bounds checks.

use crate::{Face, FaceMask, Frame};

/// Flat, padded grid of palette indices for a single frame.
pub struct OccupancyGrid {
    /// Padded extents (frame extents + 2).
    dims: [usize; 3],
    cells: Vec<Option<u8>>,
}

impl OccupancyGrid {
    /// Place every voxel of the frame. A later voxel at the same position
    /// replaces an earlier one.
    pub fn from_frame(frame: &Frame) -> Self {
        let [sx, sy, sz] = frame.bounds().dims();
        let dims = [sx + 2, sy + 2, sz + 2];
        let mut grid = Self {
            dims,
            cells: vec![None; dims[0] * dims[1] * dims[2]],
        };
        for voxel in frame.voxels() {
            let idx = grid.index(
                usize::from(voxel.x) + 1,
                usize::from(voxel.y) + 1,
                usize::from(voxel.z) + 1,
            );
            grid.cells[idx] = Some(voxel.color);
        }
        grid
    }

    /// Padded extents of the grid.
    pub fn padded_dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.dims[0] && y < self.dims[1] && z < self.dims[2]);
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    /// Occupancy at a padded coordinate.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[self.index(x, y, z)].is_some()
    }

    /// Color at a frame-local coordinate.
    pub fn color_at(&self, x: u8, y: u8, z: u8) -> Option<u8> {
        self.cells[self.index(
            usize::from(x) + 1,
            usize::from(y) + 1,
            usize::from(z) + 1,
        )]
    }

    /// Occupied cells as `(x, y, z, color)` in frame-local coordinates,
    /// x outermost and z innermost.
    pub fn occupied(&self) -> impl Iterator<Item = (u8, u8, u8, u8)> + '_ {
        let [dx, dy, dz] = self.dims;
        (1..dx - 1).flat_map(move |x| {
            (1..dy - 1).flat_map(move |y| {
                (1..dz - 1).filter_map(move |z| {
                    self.cells[self.index(x, y, z)]
                        .map(|color| ((x - 1) as u8, (y - 1) as u8, (z - 1) as u8, color))
                })
            })
        })
    }
}

/// Visible faces of the voxel at a frame-local coordinate: every face whose
/// neighbor cell is empty.
pub fn compute_mask(grid: &OccupancyGrid, x: u8, y: u8, z: u8) -> FaceMask {
    let center = [
        usize::from(x) + 1,
        usize::from(y) + 1,
        usize::from(z) + 1,
    ];
    let mut mask = FaceMask::all();
    for face in Face::ALL {
        let [ox, oy, oz] = face.offset();
        let nx = center[0].wrapping_add_signed(ox);
        let ny = center[1].wrapping_add_signed(oy);
        let nz = center[2].wrapping_add_signed(oz);
        if grid.is_occupied(nx, ny, nz) {
            mask.remove(face.flag());
        }
    }
    mask
}
