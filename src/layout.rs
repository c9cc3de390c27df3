//! Vertex-to-texel UV layout.
//!
//! Vertices are laid out column-major inside a block of `frame_width` columns: vertex `i` lives at
//! column `i / texture_size`, row `i % texture_size`. Frame `f` (1-based) shifts the block right by
//! `(f - 1) * frame_width` columns, so one texture holds every frame side by side.

use crate::foundation::core::{FrameNumber, FrameRange};
use crate::foundation::error::{VatError, VatResult};
use crate::foundation::math::ceil_div;

/// Texel coordinate inside the square texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TexelAddress {
    /// Horizontal position (`u` axis).
    pub column: u32,
    /// Vertical position (`v` axis).
    pub row: u32,
}

impl TexelAddress {
    /// Index of this texel in a row-major `texture_size × texture_size` buffer.
    pub fn pixel_index(self, texture_size: u32) -> usize {
        self.row as usize * texture_size as usize + self.column as usize
    }

    /// Return `true` when the address falls inside the texture.
    pub fn in_bounds(self, texture_size: u32) -> bool {
        self.column < texture_size && self.row < texture_size
    }
}

/// Texel address of `vertex` at `frame`.
///
/// Pure arithmetic, no bounds check: columns past the texture edge are the caller's problem (see
/// [`UvLayout::check_frames`]). Columns beyond `u32::MAX` saturate.
pub fn texel_address(
    frame: FrameNumber,
    vertex: usize,
    frame_width: u32,
    texture_size: u32,
) -> TexelAddress {
    let size = u64::from(texture_size.max(1));
    let vertex = vertex as u64;
    let column = vertex / size + frame.slot().saturating_mul(u64::from(frame_width));
    TexelAddress {
        column: u32::try_from(column).unwrap_or(u32::MAX),
        row: (vertex % size) as u32,
    }
}

/// Per-vertex UVs plus the frame block width they imply.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UvLayout {
    texture_size: u32,
    frame_width: u32,
    uvs: Vec<[f32; 2]>,
}

/// Assign every vertex a unique texel and compute `frame_width = ceil(vertex_count / texture_size)`.
#[tracing::instrument(level = "debug")]
pub fn assign_layout(vertex_count: usize, texture_size: u32) -> VatResult<UvLayout> {
    if texture_size == 0 {
        return Err(VatError::validation("texture_size must be > 0"));
    }
    let frame_width = u32::try_from(ceil_div(vertex_count as u64, u64::from(texture_size)))
        .map_err(|_| VatError::validation("vertex count too large for texture addressing"))?;

    let size = f64::from(texture_size);
    let uvs = (0..vertex_count)
        .map(|i| {
            let addr = texel_address(FrameNumber(1), i, frame_width, texture_size);
            [
                (f64::from(addr.column) / size) as f32,
                (f64::from(addr.row) / size) as f32,
            ]
        })
        .collect();

    Ok(UvLayout {
        texture_size,
        frame_width,
        uvs,
    })
}

impl UvLayout {
    /// Texture edge length in texels.
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Columns occupied by one frame.
    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Number of vertices laid out.
    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    /// UV per vertex, indexed by vertex index.
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Texel address of `vertex` at `frame` under this layout.
    pub fn address(&self, frame: FrameNumber, vertex: usize) -> TexelAddress {
        texel_address(frame, vertex, self.frame_width, self.texture_size)
    }

    /// Highest frame number whose block still fits horizontally.
    ///
    /// `None` when there are no vertices (any frame fits).
    pub fn max_frame(&self) -> Option<FrameNumber> {
        if self.frame_width == 0 {
            return None;
        }
        Some(FrameNumber(u64::from(self.texture_size / self.frame_width)))
    }

    /// Reject ranges whose addressing would run past the right texture edge.
    pub fn check_frames(&self, frames: FrameRange) -> VatResult<()> {
        frames.validate()?;
        let Some(max) = self.max_frame() else {
            return Ok(());
        };
        if frames.end > max {
            return Err(VatError::validation(format!(
                "frame {} does not fit: {} vertices need {} columns per frame, a {}px texture holds frames 1..={}",
                frames.end.0,
                self.vertex_count(),
                self.frame_width,
                self.texture_size,
                max.0
            )));
        }
        Ok(())
    }

    /// Expand per-vertex UVs to per-corner ("loop") UVs for the given faces.
    ///
    /// Every corner referencing vertex `v` gets `uvs[v]`; a vertex shared by several faces maps to
    /// the same texel in all of them.
    pub fn loop_uvs(&self, faces: &[Vec<u32>]) -> VatResult<Vec<Vec<[f32; 2]>>> {
        faces
            .iter()
            .enumerate()
            .map(|(face_idx, face)| {
                face.iter()
                    .map(|&v| {
                        self.uvs.get(v as usize).copied().ok_or_else(|| {
                            VatError::validation(format!(
                                "face {face_idx} references vertex {v}, mesh has {}",
                                self.uvs.len()
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/layout/uv.rs"]
mod tests;
