//! Reader for the chunked voxel container exported by the editor.
//!
//! Layout consumed (little-endian):
//! - 20-byte header: `"VOX "`, u32 version, `"MAIN"`, u32 content size, u32 children size
//! - optional `PACK` chunk: 12-byte body, frame count at body offset 8
//! - per frame: `SIZE` chunk (20-byte body, three i32 extents at offset 8, axis
//!   order z/x/y) then `XYZI` chunk (12-byte body, voxel count at offset 8,
//!   followed by `count * 4` bytes of z/x/y/color quads)
//!
//! Chunk sizes stored in the bodies are not used for navigation; frames are
//! read strictly in sequence and anything after the last frame is ignored.

use tracing::debug;
use vxmesh_core::{Bounds, Frame, Scene, Voxel};

use crate::cursor::ByteCursor;
use crate::error::describe_tag;
use crate::{ColorTransform, FormatError};

/// Magic at the start of every source container.
pub const CONTAINER_MAGIC: &[u8; 4] = b"VOX ";
/// Bytes skipped before the first child chunk.
pub const CONTAINER_HEADER_LEN: usize = 20;
/// Width of a chunk tag.
pub const CHUNK_TAG_LEN: usize = 4;
/// Tag announcing a multi-frame scene.
pub const PACK_TAG: &[u8; 4] = b"PACK";
/// Tag of the per-frame extents chunk.
pub const SIZE_TAG: &[u8; 4] = b"SIZE";
/// Tag of the per-frame voxel data chunk.
pub const XYZI_TAG: &[u8; 4] = b"XYZI";

const PACK_BODY_LEN: usize = 12;
const SIZE_BODY_LEN: usize = 20;
const XYZI_BODY_LEN: usize = 12;
/// Offset of the payload values inside a chunk body (after the two size fields).
const BODY_PAYLOAD_OFFSET: usize = 8;
const SOURCE_VOXEL_LEN: usize = 4;

/// Parses a source container into a [`Scene`] with an empty description.
#[derive(Debug, Clone, Copy)]
pub struct SourceReader {
    transform: ColorTransform,
}

impl SourceReader {
    /// Reader applying the given palette remap to every voxel.
    pub fn new(transform: ColorTransform) -> Self {
        Self { transform }
    }

    /// Decode every frame of the container.
    pub fn read(&self, data: &[u8]) -> Result<Scene, FormatError> {
        let mut cursor = ByteCursor::new(data);
        let header = cursor.take(CONTAINER_HEADER_LEN).ok_or_else(|| {
            FormatError::MalformedContainer(format!(
                "header needs {CONTAINER_HEADER_LEN} bytes, got {}",
                data.len()
            ))
        })?;
        if &header[..4] != CONTAINER_MAGIC {
            return Err(FormatError::MalformedContainer(format!(
                "bad magic {}",
                describe_tag(Some(&header[..4]))
            )));
        }
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let frame_count = match cursor.peek(CHUNK_TAG_LEN) {
            Some(tag) if tag == PACK_TAG => {
                cursor.take(CHUNK_TAG_LEN);
                let body = take_body(&mut cursor, PACK_BODY_LEN, "PACK")?;
                let count = body_i32(body, 0);
                usize::try_from(count).map_err(|_| {
                    FormatError::MalformedContainer(format!("negative frame count {count}"))
                })?
            }
            _ => 1,
        };
        debug!(version, frame_count, "reading source container");

        let mut scene = Scene::default();
        for frame in 0..frame_count {
            scene.push_frame(self.read_frame(&mut cursor, frame)?);
        }
        Ok(scene)
    }

    fn read_frame(&self, cursor: &mut ByteCursor<'_>, frame: usize) -> Result<Frame, FormatError> {
        let tag = cursor.take(CHUNK_TAG_LEN);
        if tag != Some(SIZE_TAG.as_slice()) {
            return Err(FormatError::MissingSizeChunk {
                frame,
                found: describe_tag(tag),
            });
        }
        let body = take_body(cursor, SIZE_BODY_LEN, "SIZE")?;
        let (src_x, src_y, src_z) = (body_i32(body, 0), body_i32(body, 4), body_i32(body, 8));
        let bounds = Bounds::new(src_y, src_z, src_x);

        let tag = cursor.take(CHUNK_TAG_LEN);
        if tag != Some(XYZI_TAG.as_slice()) {
            return Err(FormatError::MissingVoxelChunk {
                frame,
                found: describe_tag(tag),
            });
        }
        let body = take_body(cursor, XYZI_BODY_LEN, "XYZI")?;
        let count = body_i32(body, 0);
        let count = usize::try_from(count).map_err(|_| {
            FormatError::MalformedContainer(format!("frame {frame}: negative voxel count {count}"))
        })?;
        let len = count
            .checked_mul(SOURCE_VOXEL_LEN)
            .ok_or_else(|| {
                FormatError::MalformedContainer(format!("frame {frame}: voxel count {count} overflows"))
            })?;
        let raw = cursor.take(len).ok_or_else(|| {
            FormatError::MalformedContainer(format!(
                "frame {frame}: {count} voxels need {len} bytes, {} left",
                cursor.remaining()
            ))
        })?;

        let voxels = raw
            .chunks_exact(SOURCE_VOXEL_LEN)
            .map(|quad| Voxel::new(quad[1], quad[2], quad[0], self.transform.apply(quad[3])))
            .collect();
        let frame_data = Frame::new(bounds, voxels)
            .map_err(|err| FormatError::MalformedContainer(format!("frame {frame}: {err}")))?;
        debug!(frame, bounds = %bounds, voxels = count, "read frame");
        Ok(frame_data)
    }
}

fn take_body<'a>(
    cursor: &mut ByteCursor<'a>,
    len: usize,
    chunk: &str,
) -> Result<&'a [u8], FormatError> {
    let at = cursor.position();
    cursor.take(len).ok_or_else(|| {
        FormatError::MalformedContainer(format!(
            "truncated {chunk} chunk at offset {at}: need {len} bytes, {} left",
            cursor.remaining()
        ))
    })
}

/// Read the i32 stored `offset` bytes into a body's payload area.
fn body_i32(body: &[u8], offset: usize) -> i32 {
    let at = BODY_PAYLOAD_OFFSET + offset;
    i32::from_le_bytes([body[at], body[at + 1], body[at + 2], body[at + 3]])
}
