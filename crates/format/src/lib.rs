#![warn(missing_docs)]
//! Binary formats on both ends of the converter: the chunked source
//! container on the way in and the engine mesh layouts on the way out.

mod codec;
mod container;
mod cursor;
mod decode;
mod error;
mod palette;

pub use codec::{
    encode_animated, encode_static, BoundsPolicy, MeshEncoder, MeshVariant, ANIMATED_HEADER_LEN,
    FRAME_HEADER_LEN, MESH_MAGIC, MESH_VERSION, STATIC_FACE_MASK, STATIC_HEADER_LEN,
    VOXEL_RECORD_LEN,
};
pub use container::{
    SourceReader, CHUNK_TAG_LEN, CONTAINER_HEADER_LEN, CONTAINER_MAGIC, PACK_TAG, SIZE_TAG,
    XYZI_TAG,
};
pub use decode::{decode_mesh, DecodedMesh, VoxelRecord};
pub use error::FormatError;
pub use palette::ColorTransform;
