//! Single-file conversion: source bytes in, mesh bytes out.

use tracing::debug;
use vxmesh_core::{Bounds, FaceCuller, OptimizationLevel};
use vxmesh_format::{BoundsPolicy, FormatError, MeshEncoder, MeshVariant, SourceReader};

/// Knobs for one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub variant: MeshVariant,
    /// Ignored for the static variant, which is never culled.
    pub optimization: OptimizationLevel,
    pub bounds_policy: BoundsPolicy,
}

/// Result of converting one source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedMesh {
    pub bytes: Vec<u8>,
    /// Voxels written per frame, after culling.
    pub voxel_counts: Vec<usize>,
    pub max_bounds: Bounds,
}

impl ConvertedMesh {
    pub fn total_voxels(&self) -> usize {
        self.voxel_counts.iter().sum()
    }
}

/// Reads a source container, culls every frame and encodes the scene.
///
/// Stateless between calls; one processor can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameProcessor {
    options: ConvertOptions,
}

impl FrameProcessor {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `source`, attaching `description` (UTF-8) to animated meshes.
    ///
    /// Nothing is produced unless every stage succeeds.
    pub fn process(
        &self,
        source: &[u8],
        description: Option<&[u8]>,
    ) -> Result<ConvertedMesh, FormatError> {
        let variant = self.options.variant;
        let mut scene = SourceReader::new(variant.color_transform()).read(source)?;

        if variant == MeshVariant::Animated {
            if let Some(bytes) = description {
                let text = std::str::from_utf8(bytes).map_err(|err| {
                    FormatError::TextEncoding(format!("description is not UTF-8: {err}"))
                })?;
                scene.set_description(normalize_newlines(text));
            }
        }

        if variant.culls() {
            let culler = FaceCuller::new(self.options.optimization);
            scene = scene.map_frames(|_, frame| culler.cull(frame));
        }

        let bytes = MeshEncoder::new(variant)
            .with_bounds_policy(self.options.bounds_policy)
            .encode(&scene)?;
        debug!(
            variant = variant.as_str(),
            frames = scene.frame_count(),
            bytes = bytes.len(),
            "encoded scene"
        );

        Ok(ConvertedMesh {
            bytes,
            voxel_counts: scene.voxel_counts(),
            max_bounds: scene.max_bounds(),
        })
    }
}

/// Text-mode line endings: `\r\n` and lone `\r` both become `\n`.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
