//! Writing baked results to disk.

use crate::foundation::core::{FrameNumber, FrameRange};
use crate::foundation::error::{VatError, VatResult};
use crate::layout::UvLayout;
use crate::pixels::PixelBuffer;
use anyhow::Context as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

/// Sidecar describing how a baked texture is addressed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutManifest {
    /// Texture edge length in texels.
    pub texture_size: u32,
    /// Columns occupied by one frame.
    pub frame_width: u32,
    /// First baked frame.
    pub first_frame: FrameNumber,
    /// Number of baked frames.
    pub frame_count: u64,
    /// Number of vertices.
    pub vertex_count: usize,
    /// UV per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// UV per face corner, when faces were provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_uvs: Option<Vec<Vec<[f32; 2]>>>,
}

impl LayoutManifest {
    /// Describe `layout` baked over `frames`.
    pub fn new(layout: &UvLayout, frames: FrameRange, loop_uvs: Option<Vec<Vec<[f32; 2]>>>) -> Self {
        Self {
            texture_size: layout.texture_size(),
            frame_width: layout.frame_width(),
            first_frame: frames.start,
            frame_count: frames.len_frames(),
            vertex_count: layout.vertex_count(),
            uvs: layout.uvs().to_vec(),
            loop_uvs,
        }
    }

    /// Read a manifest back from disk.
    pub fn from_path(path: impl AsRef<Path>) -> VatResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open layout manifest '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| VatError::serde(format!("parse layout manifest: {e}")))
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> VatResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Save `buffer` as an 8-bit RGBA PNG, top row first.
#[tracing::instrument(skip(buffer), fields(size = buffer.size()))]
pub fn write_png(buffer: &PixelBuffer, path: &Path) -> VatResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &buffer.to_rgba8_top_down(),
        buffer.size(),
        buffer.size(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote texture");
    Ok(())
}

/// Write the layout manifest for `layout` as pretty JSON and return it.
#[tracing::instrument(skip(layout, loop_uvs))]
pub fn write_layout_json(
    layout: &UvLayout,
    frames: FrameRange,
    loop_uvs: Option<Vec<Vec<[f32; 2]>>>,
    path: &Path,
) -> VatResult<LayoutManifest> {
    let manifest = LayoutManifest::new(layout, frames, loop_uvs);
    ensure_parent_dir(path)?;
    let f = File::create(path)
        .with_context(|| format!("create layout manifest '{}'", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &manifest)
        .map_err(|e| VatError::serde(format!("serialize layout manifest: {e}")))?;
    w.write_all(b"\n")
        .and_then(|()| w.flush())
        .with_context(|| format!("write layout manifest '{}'", path.display()))?;
    Ok(manifest)
}

#[cfg(test)]
#[path = "../tests/unit/export/files.rs"]
mod tests;
