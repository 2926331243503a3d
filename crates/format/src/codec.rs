//! Engine mesh encoding.
//!
//! Animated layout (little-endian):
//! `[magic: 4][version: u32][flags: u32][bounds: 3 x i32][desc_len: u32][desc: utf8 + NUL]`
//! `[frame_count: u32]` then per frame `[voxel_count: u32][records: voxel_count x 12]`.
//!
//! Static layout:
//! `[magic: 4][version: u32][flags: u64][reserved: u32][bounds: 3 x i32][frame_count: u32]`
//! then frames as above, every record carrying [`STATIC_FACE_MASK`].
//!
//! Voxel record (12 bytes): `[x: i16][y: i16][z: i16][color: u8][mask: u8][reserved: 4]`.

use serde::{Deserialize, Serialize};
use vxmesh_core::{Bounds, Frame, Scene, Voxel};

use crate::{ColorTransform, FormatError};

/// Magic at the start of every emitted mesh.
pub const MESH_MAGIC: &[u8; 4] = b"VOX ";
/// Mesh format version understood by the engine.
pub const MESH_VERSION: u32 = 0x7f;
/// Animated header bytes before the description text.
pub const ANIMATED_HEADER_LEN: usize = 28;
/// Static header bytes before the frame count.
pub const STATIC_HEADER_LEN: usize = 32;
/// Per-frame voxel count prefix.
pub const FRAME_HEADER_LEN: usize = 4;
/// Size of one encoded voxel.
pub const VOXEL_RECORD_LEN: usize = 12;
/// Mask written for every static voxel: all faces except -Z.
pub const STATIC_FACE_MASK: u8 = 0x7e;

const DESCRIPTION_TERMINATOR: u8 = 0;

/// Which engine layout to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshVariant {
    /// Culled, multi-frame mesh with a description.
    #[default]
    Animated,
    /// Unculled mesh with fixed masks and no description.
    Static,
}

impl MeshVariant {
    /// Palette remap the source reader must apply for this variant.
    pub fn color_transform(self) -> ColorTransform {
        match self {
            MeshVariant::Animated => ColorTransform::Animated,
            MeshVariant::Static => ColorTransform::Static,
        }
    }

    /// Whether frames go through the face culler.
    pub fn culls(self) -> bool {
        matches!(self, MeshVariant::Animated)
    }

    /// Stable lowercase name used in configs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            MeshVariant::Animated => "animated",
            MeshVariant::Static => "static",
        }
    }
}

/// Which extents go into the scene header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundsPolicy {
    /// Extents of the last frame (what existing engine assets contain).
    #[default]
    LastFrame,
    /// Component-wise maximum over all frames.
    Union,
}

impl BoundsPolicy {
    fn select(self, scene: &Scene) -> Bounds {
        match self {
            BoundsPolicy::LastFrame => scene.last_bounds(),
            BoundsPolicy::Union => scene.max_bounds(),
        }
    }
}

/// Serializes scenes into one of the engine layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshEncoder {
    variant: MeshVariant,
    bounds_policy: BoundsPolicy,
}

impl MeshEncoder {
    /// Encoder for `variant` using the last-frame bounds policy.
    pub fn new(variant: MeshVariant) -> Self {
        Self {
            variant,
            bounds_policy: BoundsPolicy::default(),
        }
    }

    /// Replace the header bounds policy.
    pub fn with_bounds_policy(mut self, bounds_policy: BoundsPolicy) -> Self {
        self.bounds_policy = bounds_policy;
        self
    }

    /// Variant this encoder produces.
    pub fn variant(&self) -> MeshVariant {
        self.variant
    }

    /// Encode a (culled) scene.
    pub fn encode(&self, scene: &Scene) -> Result<Vec<u8>, FormatError> {
        match self.variant {
            MeshVariant::Animated => encode_animated(scene, self.bounds_policy),
            MeshVariant::Static => Ok(encode_static(scene, self.bounds_policy)),
        }
    }
}

/// Encode the animated layout. Fails only when the description cannot be
/// stored as NUL-terminated text.
pub fn encode_animated(scene: &Scene, bounds_policy: BoundsPolicy) -> Result<Vec<u8>, FormatError> {
    let description = scene.description().as_bytes();
    if let Some(offset) = description.iter().position(|&b| b == DESCRIPTION_TERMINATOR) {
        return Err(FormatError::TextEncoding(format!(
            "interior NUL byte at offset {offset}"
        )));
    }
    let description_len = u32::try_from(description.len() + 1).map_err(|_| {
        FormatError::TextEncoding(format!("{} bytes exceed the u32 length field", description.len()))
    })?;

    let mut out = Vec::with_capacity(
        ANIMATED_HEADER_LEN + description.len() + 1 + FRAME_HEADER_LEN + frames_len(scene),
    );
    out.extend_from_slice(MESH_MAGIC);
    out.extend_from_slice(&MESH_VERSION.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    push_bounds(&mut out, bounds_policy.select(scene));

    out.extend_from_slice(&description_len.to_le_bytes());
    out.extend_from_slice(description);
    out.push(DESCRIPTION_TERMINATOR);

    push_frames(&mut out, scene, None);
    Ok(out)
}

/// Encode the static layout; every record gets [`STATIC_FACE_MASK`].
pub fn encode_static(scene: &Scene, bounds_policy: BoundsPolicy) -> Vec<u8> {
    let mut out = Vec::with_capacity(STATIC_HEADER_LEN + FRAME_HEADER_LEN + frames_len(scene));
    out.extend_from_slice(MESH_MAGIC);
    out.extend_from_slice(&MESH_VERSION.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    push_bounds(&mut out, bounds_policy.select(scene));

    push_frames(&mut out, scene, Some(STATIC_FACE_MASK));
    out
}

fn frames_len(scene: &Scene) -> usize {
    scene
        .frames()
        .iter()
        .map(|frame| FRAME_HEADER_LEN + frame.len() * VOXEL_RECORD_LEN)
        .sum()
}

fn push_bounds(out: &mut Vec<u8>, bounds: Bounds) {
    out.extend_from_slice(&bounds.x.to_le_bytes());
    out.extend_from_slice(&bounds.y.to_le_bytes());
    out.extend_from_slice(&bounds.z.to_le_bytes());
}

fn push_frames(out: &mut Vec<u8>, scene: &Scene, fixed_mask: Option<u8>) {
    out.extend_from_slice(&(scene.frame_count() as u32).to_le_bytes());
    for frame in scene.frames() {
        push_frame(out, frame, fixed_mask);
    }
}

fn push_frame(out: &mut Vec<u8>, frame: &Frame, fixed_mask: Option<u8>) {
    out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    for voxel in frame.voxels() {
        push_record(out, voxel, fixed_mask.unwrap_or(voxel.mask.bits()));
    }
}

fn push_record(out: &mut Vec<u8>, voxel: &Voxel, mask: u8) {
    out.extend_from_slice(&i16::from(voxel.x).to_le_bytes());
    out.extend_from_slice(&i16::from(voxel.y).to_le_bytes());
    out.extend_from_slice(&i16::from(voxel.z).to_le_bytes());
    out.push(voxel.color);
    out.push(mask);
    out.extend_from_slice(&[0; 4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vxmesh_core::{FaceMask, Voxel};

    fn scene_with(description: &str, frames: Vec<Frame>) -> Scene {
        let mut scene = Scene::new(description);
        for frame in frames {
            scene.push_frame(frame);
        }
        scene
    }

    #[test]
    fn animated_header_layout() {
        let scene = scene_with("", vec![Frame::empty(Bounds::new(2, 3, 4)).unwrap()]);
        let bytes = encode_animated(&scene, BoundsPolicy::LastFrame).unwrap();

        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(&bytes[4..12], &[0x7f, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[12..24], &[2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0]);
        // Empty description still costs its terminator.
        assert_eq!(&bytes[24..28], &1u32.to_le_bytes());
        assert_eq!(bytes[28], 0);
        assert_eq!(&bytes[29..33], &1u32.to_le_bytes());
        // Empty frame contributes only its count.
        assert_eq!(&bytes[33..37], &0u32.to_le_bytes());
        assert_eq!(bytes.len(), ANIMATED_HEADER_LEN + 1 + 4 + 4);
    }

    #[test]
    fn animated_record_layout() {
        let mut voxel = Voxel::new(1, 2, 3, 200);
        voxel.mask = FaceMask::POS_X | FaceMask::NEG_Z;
        let frame = Frame::new(Bounds::new(4, 4, 4), vec![voxel]).unwrap();
        let bytes = encode_animated(&scene_with("hi", vec![frame]), BoundsPolicy::LastFrame).unwrap();

        let desc_start = ANIMATED_HEADER_LEN;
        assert_eq!(&bytes[24..28], &3u32.to_le_bytes());
        assert_eq!(&bytes[desc_start..desc_start + 3], b"hi\0");
        let record = &bytes[bytes.len() - VOXEL_RECORD_LEN..];
        assert_eq!(record, &[1, 0, 2, 0, 3, 0, 200, 0b01_0001, 0, 0, 0, 0]);
    }

    #[test]
    fn description_length_counts_utf8_bytes() {
        let scene = scene_with("héllo", Vec::new());
        let bytes = encode_animated(&scene, BoundsPolicy::LastFrame).unwrap();
        assert_eq!(&bytes[24..28], &7u32.to_le_bytes());
        assert_eq!(&bytes[28..35], "héllo\0".as_bytes());
        assert_eq!(&bytes[35..39], &0u32.to_le_bytes());
    }

    #[test]
    fn interior_nul_is_a_text_encoding_error() {
        let scene = scene_with("a\0b", Vec::new());
        let err = encode_animated(&scene, BoundsPolicy::LastFrame).unwrap_err();
        assert!(matches!(err, FormatError::TextEncoding(msg) if msg.contains("offset 1")));
    }

    #[test]
    fn header_bounds_follow_policy() {
        let scene = scene_with(
            "",
            vec![
                Frame::empty(Bounds::new(9, 1, 1)).unwrap(),
                Frame::empty(Bounds::new(1, 2, 1)).unwrap(),
            ],
        );
        let last = encode_animated(&scene, BoundsPolicy::LastFrame).unwrap();
        let union = encode_animated(&scene, BoundsPolicy::Union).unwrap();
        assert_eq!(&last[12..16], &1i32.to_le_bytes());
        assert_eq!(&union[12..16], &9i32.to_le_bytes());
        assert_eq!(&union[16..20], &2i32.to_le_bytes());
    }

    #[test]
    fn static_layout_uses_fixed_mask() {
        let mut voxel = Voxel::new(0, 0, 0, 12);
        voxel.mask = FaceMask::empty();
        let frame = Frame::new(Bounds::new(1, 1, 1), vec![voxel]).unwrap();
        let bytes = encode_static(&scene_with("ignored", vec![frame]), BoundsPolicy::LastFrame);

        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(&bytes[4..8], &0x7fu32.to_le_bytes());
        assert_eq!(&bytes[8..20], &[0; 12]);
        assert_eq!(&bytes[20..32], &[1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(&bytes[32..36], &1u32.to_le_bytes());
        assert_eq!(&bytes[36..40], &1u32.to_le_bytes());
        assert_eq!(&bytes[40..52], &[0, 0, 0, 0, 0, 0, 12, STATIC_FACE_MASK, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), STATIC_HEADER_LEN + 4 + 4 + VOXEL_RECORD_LEN);
    }

    #[test]
    fn encoder_dispatches_on_variant() {
        let scene = scene_with("x", vec![Frame::empty(Bounds::new(1, 1, 1)).unwrap()]);
        let animated = MeshEncoder::new(MeshVariant::Animated).encode(&scene).unwrap();
        let stat = MeshEncoder::new(MeshVariant::Static).encode(&scene).unwrap();
        assert_eq!(animated.len(), ANIMATED_HEADER_LEN + 2 + 4 + 4);
        assert_eq!(stat.len(), STATIC_HEADER_LEN + 4 + 4);
        assert_eq!(MeshEncoder::default().variant(), MeshVariant::Animated);
    }
}
