//! Frames and scenes produced per source file.

use crate::{Bounds, CoreError, Voxel};

/// One snapshot of an animated scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bounds: Bounds,
    voxels: Vec<Voxel>,
}

impl Frame {
    /// Build a frame, checking extents and that every voxel fits inside them.
    pub fn new(bounds: Bounds, voxels: Vec<Voxel>) -> Result<Self, CoreError> {
        if !bounds.is_valid() {
            return Err(CoreError::InvalidBounds(bounds));
        }
        if let Some(voxel) = voxels
            .iter()
            .find(|voxel| !bounds.contains(voxel.x, voxel.y, voxel.z))
        {
            return Err(CoreError::VoxelOutOfBounds {
                x: voxel.x,
                y: voxel.y,
                z: voxel.z,
                bounds,
            });
        }
        Ok(Self { bounds, voxels })
    }

    /// Frame with no voxels.
    pub fn empty(bounds: Bounds) -> Result<Self, CoreError> {
        Self::new(bounds, Vec::new())
    }

    /// Caller guarantees the voxels were derived from a frame with these bounds.
    pub(crate) fn from_checked(bounds: Bounds, voxels: Vec<Voxel>) -> Self {
        debug_assert!(voxels
            .iter()
            .all(|voxel| bounds.contains(voxel.x, voxel.y, voxel.z)));
        Self { bounds, voxels }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

/// Ordered animation frames plus the scene-level description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    frames: Vec<Frame>,
    description: String,
    max_bounds: Bounds,
}

impl Scene {
    /// Empty scene carrying a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            frames: Vec::new(),
            description: description.into(),
            max_bounds: Bounds::ZERO,
        }
    }

    /// Append the next animation frame.
    pub fn push_frame(&mut self, frame: Frame) {
        self.max_bounds = self.max_bounds.max(frame.bounds);
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Component-wise maximum extents over every frame seen so far.
    pub fn max_bounds(&self) -> Bounds {
        self.max_bounds
    }

    /// Extents of the last frame, or zero for a scene without frames.
    pub fn last_bounds(&self) -> Bounds {
        self.frames
            .last()
            .map(Frame::bounds)
            .unwrap_or(Bounds::ZERO)
    }

    /// Voxel count of every frame, in frame order.
    pub fn voxel_counts(&self) -> Vec<usize> {
        self.frames.iter().map(Frame::len).collect()
    }

    /// Rebuild the scene by transforming each frame in order.
    pub fn map_frames<F>(self, mut f: F) -> Scene
    where
        F: FnMut(usize, &Frame) -> Frame,
    {
        let mut mapped = Scene::new(self.description);
        for (index, frame) in self.frames.iter().enumerate() {
            mapped.push_frame(f(index, frame));
        }
        mapped
    }
}
