use super::*;
use crate::codec::encode;
use crate::foundation::core::{FrameNumber, Mat4, Vec3};
use crate::mesh::Deformation;
use crate::sampler::NoProgress;

fn wave(vertices: usize, frames: usize) -> MeshAnimation {
    let positions: Vec<Vec3> = (0..vertices).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
    let frames = (1..=frames)
        .map(|f| {
            positions
                .iter()
                .map(|p| *p + Vec3::new(0.0, 0.1 * f as f32, 0.0))
                .collect()
        })
        .collect();
    MeshAnimation {
        name: Some("wave".to_string()),
        world: Mat4::IDENTITY,
        positions,
        faces: vec![vec![0, 1, 2]],
        deform: Some(Deformation::Baked {
            first_frame: FrameNumber(1),
            frames,
        }),
    }
}

fn config(size: u32, start: u64, end: u64) -> BakeConfig {
    BakeConfig {
        texture_size: size,
        frames: FrameRange::new(FrameNumber(start), FrameNumber(end)).unwrap(),
        ..BakeConfig::default()
    }
}

#[test]
fn defaults_are_128px_over_frames_1_to_42() {
    let cfg = BakeConfig::default();
    assert_eq!(cfg.texture_size, 128);
    assert_eq!(cfg.frames.start, FrameNumber(1));
    assert_eq!(cfg.frames.end, FrameNumber(42));
    assert_eq!(cfg.background, [0.0, 0.0, 0.0, 168.0 / 255.0]);
    assert_eq!(cfg.mode, EncodeMode::Lenient);
    cfg.validate().unwrap();
}

#[test]
fn config_json_fills_missing_fields() {
    let cfg = BakeConfig::from_reader(
        r#"{ "texture_size": 64, "frames": { "start": 2, "end": 9 }, "mode": "strict" }"#
            .as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.texture_size, 64);
    assert_eq!(cfg.frames.len_frames(), 8);
    assert_eq!(cfg.mode, EncodeMode::Strict);
    assert!(!cfg.parallel);

    assert!(BakeConfig::from_reader(r#"{ "texure_size": 64 }"#.as_bytes()).is_err());
}

#[test]
fn config_validation() {
    let zero = BakeConfig {
        texture_size: 0,
        ..BakeConfig::default()
    };
    assert!(zero.validate().is_err());

    let backwards = BakeConfig {
        frames: FrameRange {
            start: FrameNumber(5),
            end: FrameNumber(2),
        },
        ..BakeConfig::default()
    };
    assert!(backwards.validate().is_err());

    let bright = BakeConfig {
        background: [0.0, 0.0, 0.0, 1.5],
        ..BakeConfig::default()
    };
    assert!(bright.validate().is_err());

    let no_threads = BakeConfig {
        threads: Some(0),
        ..BakeConfig::default()
    };
    assert!(no_threads.validate().is_err());
}

#[test]
fn bake_encodes_every_frame_and_vertex() {
    let mesh = wave(6, 3);
    let baked = bake(&mesh, &config(4, 1, 2), &mut NoProgress).unwrap();

    assert_eq!(baked.layout.frame_width(), 2);
    assert_eq!(baked.stats.frames, 2);
    assert_eq!(baked.stats.texels_written, 12);
    assert_eq!(baked.stats.overflowed_texels, 0);

    let rest = mesh.rest_positions();
    let posed = rest[5] + Vec3::new(0.0, 0.1 * 2.0, 0.0);
    let addr = baked.layout.address(FrameNumber(2), 5);
    assert_eq!(addr, crate::layout::TexelAddress { column: 3, row: 1 });
    assert_eq!(
        baked.pixels.get(addr).unwrap(),
        encode(rest[5], posed).unwrap().to_rgba()
    );

    let loops = baked.loop_uvs.as_ref().unwrap();
    assert_eq!(loops[0], vec![[0.0, 0.0], [0.0, 0.25], [0.0, 0.5]]);
    assert_eq!(baked.manifest().frame_count, 2);
}

#[test]
fn bake_rejects_frames_the_mesh_does_not_have() {
    let mesh = wave(3, 4);
    let err = bake(&mesh, &config(16, 2, 6), &mut NoProgress).unwrap_err();
    assert!(err.to_string().contains("provides frames 1..=4"), "{err}");
}

#[test]
fn bake_rejects_frames_past_the_texture_edge() {
    let mesh = wave(6, 3);
    let err = bake(&mesh, &config(4, 1, 3), &mut NoProgress).unwrap_err();
    assert!(err.to_string().contains("does not fit"), "{err}");
}

#[test]
fn bake_surfaces_range_exceeded_with_site() {
    let mut mesh = wave(3, 2);
    if let Some(Deformation::Baked { frames, .. }) = &mut mesh.deform {
        frames[1][2].z = 40.0;
    }
    let err = bake(&mesh, &config(8, 1, 2), &mut NoProgress).unwrap_err();
    assert!(err.is_encoding_failure());
    assert!(err.to_string().contains("at frame 2, vertex 2"), "{err}");
}

#[test]
fn parallel_bake_matches_sequential() {
    let mesh = wave(20, 6);
    let seq = bake(&mesh, &config(32, 1, 6), &mut NoProgress).unwrap();
    let cfg = BakeConfig {
        parallel: true,
        threads: Some(2),
        ..config(32, 1, 6)
    };
    let par = bake(&mesh, &cfg, &mut NoProgress).unwrap();
    assert_eq!(seq.pixels, par.pixels);
    assert_eq!(seq.stats, par.stats);
}

#[test]
fn bake_rejects_frame_counter_overflow() {
    let mut mesh = wave(3, 2);
    if let Some(Deformation::Baked { first_frame, .. }) = &mut mesh.deform {
        *first_frame = FrameNumber(u64::MAX);
    }
    let err = bake(&mesh, &config(8, 1, 2), &mut NoProgress).unwrap_err();
    assert!(matches!(err, VatError::Validation(_)), "{err}");
}
