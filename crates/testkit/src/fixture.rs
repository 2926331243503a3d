//! Builder for synthetic source containers.
//!
//! Produces the same chunk layout the voxel editor writes, so reader and
//! pipeline tests do not depend on binary files checked into the repo.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Container version written by the editor.
pub const EDITOR_VERSION: u32 = 150;

/// One frame as it appears in the source file (axis order as stored).
#[derive(Debug, Clone, Default)]
pub struct SourceFrame {
    size: [i32; 3],
    voxels: Vec<[u8; 4]>,
}

impl SourceFrame {
    /// Frame with the given stored extents.
    pub fn new(size: [i32; 3]) -> Self {
        Self {
            size,
            voxels: Vec::new(),
        }
    }

    /// Append a raw `[x, y, z, color]` quad exactly as stored.
    pub fn voxel(mut self, quad: [u8; 4]) -> Self {
        self.voxels.push(quad);
        self
    }

    /// Append several raw quads.
    pub fn voxels<I: IntoIterator<Item = [u8; 4]>>(mut self, quads: I) -> Self {
        self.voxels.extend(quads);
        self
    }
}

/// Builds a complete source container.
#[derive(Debug, Clone)]
pub struct VoxFixture {
    version: u32,
    frames: Vec<SourceFrame>,
    packed: bool,
    frame_count: Option<i32>,
}

impl Default for VoxFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxFixture {
    /// Empty container with the editor's version number.
    pub fn new() -> Self {
        Self {
            version: EDITOR_VERSION,
            frames: Vec::new(),
            packed: false,
            frame_count: None,
        }
    }

    /// Override the header version field.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Append a frame.
    pub fn frame(mut self, frame: SourceFrame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Emit a `PACK` chunk carrying the frame count.
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// Emit a `PACK` chunk with an arbitrary frame count.
    pub fn frame_count_override(mut self, count: i32) -> Self {
        self.packed = true;
        self.frame_count = Some(count);
        self
    }

    /// Serialize the container.
    pub fn build(&self) -> Vec<u8> {
        let mut children = Vec::new();
        if self.packed {
            let count = self.frame_count.unwrap_or(self.frames.len() as i32);
            push_chunk(&mut children, b"PACK", &count.to_le_bytes());
        }
        for frame in &self.frames {
            let mut size = Vec::with_capacity(12);
            for extent in frame.size {
                size.extend_from_slice(&extent.to_le_bytes());
            }
            push_chunk(&mut children, b"SIZE", &size);

            let mut xyzi = Vec::with_capacity(4 + frame.voxels.len() * 4);
            xyzi.extend_from_slice(&(frame.voxels.len() as i32).to_le_bytes());
            for quad in &frame.voxels {
                xyzi.extend_from_slice(quad);
            }
            push_chunk(&mut children, b"XYZI", &xyzi);
        }

        let mut out = Vec::with_capacity(20 + children.len());
        out.extend_from_slice(b"VOX ");
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(b"MAIN");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(children.len() as u32).to_le_bytes());
        out.extend_from_slice(&children);
        out
    }

    /// Serialize the container to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, self.build())
            .with_context(|| format!("Failed to write fixture {}", path.display()))
    }
}

fn push_chunk(out: &mut Vec<u8>, tag: &[u8; 4], content: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(content);
}

/// Stored-order quads for a solid box of `edge`³ voxels with one color.
pub fn solid_box(edge: u8, color: u8) -> Vec<[u8; 4]> {
    let mut quads = Vec::with_capacity(usize::from(edge).pow(3));
    for x in 0..edge {
        for y in 0..edge {
            for z in 0..edge {
                quads.push([x, y, z, color]);
            }
        }
    }
    quads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_layout_matches_editor_offsets() {
        let bytes = VoxFixture::new()
            .frame(SourceFrame::new([3, 4, 5]).voxel([1, 2, 3, 4]))
            .build();

        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 150);
        assert_eq!(&bytes[8..12], b"MAIN");
        assert_eq!(&bytes[20..24], b"SIZE");
        assert_eq!(i32::from_le_bytes(bytes[32..36].try_into().unwrap()), 3);
        assert_eq!(&bytes[44..48], b"XYZI");
        assert_eq!(i32::from_le_bytes(bytes[56..60].try_into().unwrap()), 1);
        assert_eq!(&bytes[60..64], &[1, 2, 3, 4]);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn packed_layout_puts_frame_count_at_body_offset_eight() {
        let bytes = VoxFixture::new()
            .frame(SourceFrame::new([1, 1, 1]))
            .frame(SourceFrame::new([1, 1, 1]))
            .packed()
            .build();
        assert_eq!(&bytes[20..24], b"PACK");
        assert_eq!(i32::from_le_bytes(bytes[32..36].try_into().unwrap()), 2);
        assert_eq!(&bytes[36..40], b"SIZE");
    }

    #[test]
    fn write_to_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/model.vox");
        VoxFixture::new()
            .frame(SourceFrame::new([1, 1, 1]))
            .write_to(&path)
            .expect("fixture written");
        assert!(path.is_file());
    }

    #[test]
    fn solid_box_has_edge_cubed_quads() {
        assert_eq!(solid_box(3, 1).len(), 27);
        assert!(solid_box(0, 1).is_empty());
    }
}
