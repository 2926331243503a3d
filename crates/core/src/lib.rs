//! Voxel scene model plus the occupancy grid and face culler that operate on it.

mod cull;
mod error;
mod grid;
mod scene;
mod voxel;

pub use cull::*;
pub use error::*;
pub use grid::*;
pub use scene::*;
pub use voxel::*;
