//! Fuzz-style property tests for the source reader and mesh codec
//!
//! Readers must reject malformed input with errors instead of panicking,
//! and every scene the reader accepts must survive an encode/decode pass.

use proptest::prelude::*;
use vxmesh_format::{
    decode_mesh, encode_animated, encode_static, BoundsPolicy, ColorTransform, MeshVariant,
    SourceReader, STATIC_FACE_MASK,
};
use vxmesh_testkit::{SourceFrame, VoxFixture};

/// Stored extents plus quads that fit inside them.
fn source_frame() -> impl Strategy<Value = SourceFrame> {
    (1i32..8, 1i32..8, 1i32..8).prop_flat_map(|(e0, e1, e2)| {
        let quad = (0..e0 as u8, 0..e1 as u8, 0..e2 as u8, any::<u8>())
            .prop_map(|(a, b, c, color)| [a, b, c, color]);
        prop::collection::vec(quad, 0..40)
            .prop_map(move |quads| SourceFrame::new([e0, e1, e2]).voxels(quads))
    })
}

fn container() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(source_frame(), 1..4).prop_map(|frames| {
        let packed = frames.len() > 1;
        let mut fixture = VoxFixture::new();
        for frame in frames {
            fixture = fixture.frame(frame);
        }
        if packed {
            fixture = fixture.packed();
        }
        fixture.build()
    })
}

proptest! {
    /// Property: Arbitrary bytes don't crash the source reader
    #[test]
    fn arbitrary_bytes_dont_crash_reader(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _ = SourceReader::new(ColorTransform::Animated).read(&random_bytes);
        let _ = SourceReader::new(ColorTransform::Static).read(&random_bytes);
    }

    /// Property: Arbitrary bytes behind a valid magic don't crash the reader
    #[test]
    fn arbitrary_chunks_dont_crash_reader(
        body in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let mut bytes = b"VOX \x96\x00\x00\x00MAIN".to_vec();
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&body);
        let _ = SourceReader::new(ColorTransform::Animated).read(&bytes);
    }

    /// Property: Arbitrary bytes don't crash the mesh decoder
    #[test]
    fn arbitrary_bytes_dont_crash_decoder(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _ = decode_mesh(&random_bytes, MeshVariant::Animated);
        let _ = decode_mesh(&random_bytes, MeshVariant::Static);
    }

    /// Property: A single corrupted byte never panics the reader
    #[test]
    fn corrupted_containers_dont_crash(
        bytes in container(),
        index in any::<prop::sample::Index>(),
        value in any::<u8>(),
    ) {
        let mut bytes = bytes;
        let at = index.index(bytes.len());
        bytes[at] = value;
        let _ = SourceReader::new(ColorTransform::Animated).read(&bytes);
    }

    /// Property: Every accepted scene survives the animated layout
    #[test]
    fn animated_meshes_roundtrip(
        bytes in container(),
        description in "[a-zA-Z0-9 =.\n]{0,40}",
    ) {
        let mut scene = SourceReader::new(ColorTransform::Animated).read(&bytes).unwrap();
        scene.set_description(description.clone());

        let encoded = encode_animated(&scene, BoundsPolicy::Union).unwrap();
        let mesh = decode_mesh(&encoded, MeshVariant::Animated).unwrap();

        prop_assert_eq!(mesh.bounds, scene.max_bounds());
        prop_assert_eq!(&mesh.description, &description);
        prop_assert_eq!(mesh.voxel_counts(), scene.voxel_counts());
        for (records, frame) in mesh.frames.iter().zip(scene.frames()) {
            for (record, voxel) in records.iter().zip(frame.voxels()) {
                prop_assert_eq!(
                    [record.x, record.y, record.z],
                    [i16::from(voxel.x), i16::from(voxel.y), i16::from(voxel.z)]
                );
                prop_assert_eq!(record.color, voxel.color);
                prop_assert_eq!(record.mask, voxel.mask.bits());
            }
        }
    }

    /// Property: Static meshes keep every source voxel with the fixed mask
    #[test]
    fn static_meshes_keep_every_voxel(bytes in container()) {
        let scene = SourceReader::new(ColorTransform::Static).read(&bytes).unwrap();
        let encoded = encode_static(&scene, BoundsPolicy::LastFrame);
        let mesh = decode_mesh(&encoded, MeshVariant::Static).unwrap();

        prop_assert_eq!(mesh.bounds, scene.last_bounds());
        prop_assert_eq!(mesh.voxel_counts(), scene.voxel_counts());
        prop_assert!(mesh.frames.iter().flatten().all(|r| r.mask == STATIC_FACE_MASK));
    }

    /// Property: Encoding is a pure function of the scene
    #[test]
    fn encoding_is_deterministic(bytes in container()) {
        let reader = SourceReader::new(ColorTransform::Animated);
        let first = encode_animated(&reader.read(&bytes).unwrap(), BoundsPolicy::LastFrame).unwrap();
        let second = encode_animated(&reader.read(&bytes).unwrap(), BoundsPolicy::LastFrame).unwrap();
        prop_assert_eq!(first, second);
    }
}
