use thiserror::Error;

/// Failures while reading a source container or reading/writing a mesh.
///
/// Every variant is scoped to a single file; callers log and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The container header, a chunk body, or voxel data is broken.
    #[error("malformed container: {0}")]
    MalformedContainer(String),
    /// A frame did not start with a `SIZE` chunk.
    #[error("frame {frame}: expected SIZE chunk, found {found}")]
    MissingSizeChunk {
        /// Zero-based frame index.
        frame: usize,
        /// Printable form of the tag that was found instead.
        found: String,
    },
    /// A `SIZE` chunk was not followed by an `XYZI` chunk.
    #[error("frame {frame}: expected XYZI chunk, found {found}")]
    MissingVoxelChunk {
        /// Zero-based frame index.
        frame: usize,
        /// Printable form of the tag that was found instead.
        found: String,
    },
    /// The description cannot be stored as terminated UTF-8 text.
    #[error("description cannot be encoded: {0}")]
    TextEncoding(String),
    /// An emitted mesh failed to decode.
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),
}

/// Printable form of a chunk tag for error messages.
pub(crate) fn describe_tag(tag: Option<&[u8]>) -> String {
    match tag {
        Some(bytes) => format!("'{}'", bytes.escape_ascii()),
        None => "end of data".to_string(),
    }
}
