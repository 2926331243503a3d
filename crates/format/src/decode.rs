//! Reader for emitted engine meshes, used for inspection and verification.

use serde::Serialize;
use vxmesh_core::Bounds;

use crate::codec::{FRAME_HEADER_LEN, MESH_MAGIC, MESH_VERSION, VOXEL_RECORD_LEN};
use crate::cursor::ByteCursor;
use crate::error::describe_tag;
use crate::{FormatError, MeshVariant};

/// One voxel record as stored in a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoxelRecord {
    /// Position x.
    pub x: i16,
    /// Position y.
    pub y: i16,
    /// Position z.
    pub z: i16,
    /// Palette index.
    pub color: u8,
    /// Raw visibility mask byte.
    pub mask: u8,
}

/// Fully decoded mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMesh {
    /// Layout the bytes were decoded as.
    pub variant: MeshVariant,
    /// Header bounds.
    pub bounds: Bounds,
    /// Description text (always empty for static meshes).
    pub description: String,
    /// Voxel records per frame.
    pub frames: Vec<Vec<VoxelRecord>>,
}

impl DecodedMesh {
    /// Number of records in each frame.
    pub fn voxel_counts(&self) -> Vec<usize> {
        self.frames.iter().map(Vec::len).collect()
    }
}

fn truncated(what: &str, cursor: &ByteCursor<'_>) -> FormatError {
    FormatError::MalformedMesh(format!(
        "truncated {what} at offset {}",
        cursor.position()
    ))
}

/// Decode `data` as the given mesh variant. The whole buffer must be consumed.
pub fn decode_mesh(data: &[u8], variant: MeshVariant) -> Result<DecodedMesh, FormatError> {
    let mut cursor = ByteCursor::new(data);

    let magic = cursor.read_array::<4>().ok_or_else(|| truncated("magic", &cursor))?;
    if &magic != MESH_MAGIC {
        return Err(FormatError::MalformedMesh(format!(
            "bad magic {}",
            describe_tag(Some(&magic))
        )));
    }
    let version = cursor.read_u32().ok_or_else(|| truncated("version", &cursor))?;
    if version != MESH_VERSION {
        return Err(FormatError::MalformedMesh(format!(
            "unsupported version {version:#x}"
        )));
    }

    match variant {
        MeshVariant::Animated => {
            cursor.read_u32().ok_or_else(|| truncated("flags", &cursor))?;
        }
        MeshVariant::Static => {
            cursor.read_u64().ok_or_else(|| truncated("flags", &cursor))?;
            cursor.read_u32().ok_or_else(|| truncated("reserved field", &cursor))?;
        }
    }
    let bounds = read_bounds(&mut cursor)?;

    let description = match variant {
        MeshVariant::Animated => read_description(&mut cursor)?,
        MeshVariant::Static => String::new(),
    };

    let frame_count = cursor.read_u32().ok_or_else(|| truncated("frame count", &cursor))?;
    // Every frame costs at least its count prefix.
    if (frame_count as usize).saturating_mul(FRAME_HEADER_LEN) > cursor.remaining() {
        return Err(FormatError::MalformedMesh(format!(
            "{frame_count} frames cannot fit in {} bytes",
            cursor.remaining()
        )));
    }
    let mut frames = Vec::with_capacity(frame_count as usize);
    for frame in 0..frame_count {
        frames.push(read_frame(&mut cursor, frame)?);
    }

    if cursor.remaining() != 0 {
        return Err(FormatError::MalformedMesh(format!(
            "{} trailing bytes after last frame",
            cursor.remaining()
        )));
    }

    Ok(DecodedMesh {
        variant,
        bounds,
        description,
        frames,
    })
}

fn read_bounds(cursor: &mut ByteCursor<'_>) -> Result<Bounds, FormatError> {
    let mut extents = [0i32; 3];
    for extent in &mut extents {
        *extent = cursor.read_i32().ok_or_else(|| truncated("bounds", cursor))?;
    }
    Ok(Bounds::new(extents[0], extents[1], extents[2]))
}

fn read_description(cursor: &mut ByteCursor<'_>) -> Result<String, FormatError> {
    let len = cursor
        .read_u32()
        .ok_or_else(|| truncated("description length", cursor))? as usize;
    if len == 0 {
        return Err(FormatError::MalformedMesh(
            "description length must include its terminator".to_string(),
        ));
    }
    let bytes = cursor.take(len).ok_or_else(|| truncated("description", cursor))?;
    let (text, terminator) = bytes.split_at(len - 1);
    if terminator != [0] {
        return Err(FormatError::MalformedMesh(
            "description is not NUL-terminated".to_string(),
        ));
    }
    String::from_utf8(text.to_vec())
        .map_err(|err| FormatError::MalformedMesh(format!("description is not UTF-8: {err}")))
}

fn read_frame(cursor: &mut ByteCursor<'_>, frame: u32) -> Result<Vec<VoxelRecord>, FormatError> {
    let count = cursor
        .read_u32()
        .ok_or_else(|| truncated("frame header", cursor))? as usize;
    let needed = count.saturating_mul(VOXEL_RECORD_LEN);
    if needed > cursor.remaining() {
        return Err(FormatError::MalformedMesh(format!(
            "frame {frame}: {count} records need {needed} bytes, {} left",
            cursor.remaining()
        )));
    }

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let record = read_record(cursor).ok_or_else(|| truncated("voxel record", cursor))?;
        records.push(record);
    }
    Ok(records)
}

fn read_record(cursor: &mut ByteCursor<'_>) -> Option<VoxelRecord> {
    let x = cursor.read_i16()?;
    let y = cursor.read_i16()?;
    let z = cursor.read_i16()?;
    let color = cursor.read_u8()?;
    let mask = cursor.read_u8()?;
    cursor.take(4)?;
    Some(VoxelRecord {
        x,
        y,
        z,
        color,
        mask,
    })
}
