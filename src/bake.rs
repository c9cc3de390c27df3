//! End-to-end bake: mesh animation in, texture and layout out.

use crate::codec::EncodeMode;
use crate::export::LayoutManifest;
use crate::foundation::core::{BACKGROUND_RGBA, FrameRange, TEXTURE_SIZE};
use crate::foundation::error::{VatError, VatResult};
use crate::layout::{UvLayout, assign_layout};
use crate::mesh::MeshAnimation;
use crate::pixels::PixelBuffer;
use crate::sampler::{ProgressSink, SampleOpts, SampleStats, sample_frames};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Bake settings, loadable from JSON. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BakeConfig {
    /// Texture edge length in texels.
    pub texture_size: u32,
    /// Frames to sample (inclusive, 1-based).
    pub frames: FrameRange,
    /// Fill color of texels no vertex writes.
    pub background: [f32; 4],
    /// Integer-part overflow policy.
    pub mode: EncodeMode,
    /// Encode frames on a rayon pool.
    pub parallel: bool,
    /// Rayon worker threads (parallel mode only).
    pub threads: Option<usize>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            texture_size: TEXTURE_SIZE,
            frames: FrameRange::default(),
            background: BACKGROUND_RGBA,
            mode: EncodeMode::default(),
            parallel: false,
            threads: None,
        }
    }
}

impl BakeConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VatResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VatError::validation(format!("parse bake config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VatResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VatError::validation(format!("open bake config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check field invariants.
    pub fn validate(&self) -> VatResult<()> {
        if self.texture_size == 0 {
            return Err(VatError::validation("texture_size must be > 0"));
        }
        self.frames.validate()?;
        if self
            .background
            .iter()
            .any(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
        {
            return Err(VatError::validation(format!(
                "background channels must lie in [0, 1], got {:?}",
                self.background
            )));
        }
        if self.threads == Some(0) {
            return Err(VatError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    fn sample_opts(&self) -> SampleOpts {
        SampleOpts {
            mode: self.mode,
            parallel: self.parallel,
            threads: self.threads,
        }
    }
}

/// Result of a successful bake.
#[derive(Clone, Debug)]
pub struct BakedAnimation {
    /// Vertex UV layout.
    pub layout: UvLayout,
    /// Encoded texture.
    pub pixels: PixelBuffer,
    /// Sampling statistics.
    pub stats: SampleStats,
    /// Frames that were sampled.
    pub frames: FrameRange,
    /// Per-corner UVs, present when the mesh has faces.
    pub loop_uvs: Option<Vec<Vec<[f32; 2]>>>,
}

impl BakedAnimation {
    /// Layout sidecar for this bake.
    pub fn manifest(&self) -> LayoutManifest {
        LayoutManifest::new(&self.layout, self.frames, self.loop_uvs.clone())
    }
}

/// Lay out, sample and encode `mesh` according to `config`.
#[tracing::instrument(
    skip_all,
    fields(vertices = mesh.vertex_count(), size = config.texture_size)
)]
pub fn bake(
    mesh: &MeshAnimation,
    config: &BakeConfig,
    progress: &mut dyn ProgressSink,
) -> VatResult<BakedAnimation> {
    config.validate()?;
    mesh.validate()?;

    if let Some(available) = mesh.frame_range()
        && !(available.contains(config.frames.start) && available.contains(config.frames.end))
    {
        return Err(VatError::validation(format!(
            "mesh animation provides frames {}..={}, bake requests {}..={}",
            available.start.0, available.end.0, config.frames.start.0, config.frames.end.0
        )));
    }

    let rest = mesh.rest_positions();
    let layout = assign_layout(rest.len(), config.texture_size)?;
    layout.check_frames(config.frames)?;
    let loop_uvs = if mesh.faces.is_empty() {
        None
    } else {
        Some(layout.loop_uvs(&mesh.faces)?)
    };

    let mut pixels = PixelBuffer::new(config.texture_size, config.background)?;
    let mut evaluator = mesh.evaluator()?;
    let stats = sample_frames(
        &rest,
        config.frames,
        evaluator.as_mut(),
        &layout,
        &mut pixels,
        progress,
        &config.sample_opts(),
    )?;

    tracing::info!(
        frames = stats.frames,
        texels = stats.texels_written,
        overflowed = stats.overflowed_texels,
        max_exponent = stats.max_exponent,
        "bake finished"
    );

    Ok(BakedAnimation {
        layout,
        pixels,
        stats,
        frames: config.frames,
        loop_uvs,
    })
}

#[cfg(test)]
#[path = "../tests/unit/bake/pipeline.rs"]
mod tests;
