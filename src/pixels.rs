//! Square RGBA pixel storage for the baked texture.

use crate::codec::QuantizedColor;
use crate::foundation::core::BACKGROUND_RGBA;
use crate::foundation::error::{VatError, VatResult};
use crate::foundation::math::unorm8;
use crate::layout::TexelAddress;

/// `size × size` float RGBA texels, row-major.
///
/// Row 0 is texture `v = 0`, i.e. the bottom row of the image; see
/// [`PixelBuffer::to_rgba8_top_down`] for formats that store the top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    size: u32,
    texels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    /// Allocate a buffer with every texel set to `background`.
    pub fn new(size: u32, background: [f32; 4]) -> VatResult<Self> {
        if size == 0 {
            return Err(VatError::validation("pixel buffer size must be > 0"));
        }
        let len = (size as usize)
            .checked_mul(size as usize)
            .ok_or_else(|| VatError::validation(format!("pixel buffer size {size} too large")))?;
        Ok(Self {
            size,
            texels: vec![background; len],
        })
    }

    /// Allocate a buffer filled with the default background `(0, 0, 0, 168/255)`.
    pub fn with_default_background(size: u32) -> VatResult<Self> {
        Self::new(size, BACKGROUND_RGBA)
    }

    /// Edge length in texels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Texel count (`size²`).
    pub fn len(&self) -> usize {
        self.texels.len()
    }

    /// Always `false`: a buffer has at least one texel.
    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Overwrite one texel with an encoded color.
    pub fn write(&mut self, addr: TexelAddress, color: QuantizedColor) -> VatResult<()> {
        self.write_rgba(addr, color.to_rgba())
    }

    /// Overwrite one texel with raw float channels.
    pub fn write_rgba(&mut self, addr: TexelAddress, rgba: [f32; 4]) -> VatResult<()> {
        let idx = self.index(addr)?;
        self.texels[idx] = rgba;
        Ok(())
    }

    /// Read one texel.
    pub fn get(&self, addr: TexelAddress) -> VatResult<[f32; 4]> {
        Ok(self.texels[self.index(addr)?])
    }

    /// Borrow all texels, row-major.
    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    /// Flat channel sequence (`r, g, b, a` per texel, row-major), length `size² * 4`.
    pub fn flatten(&self) -> Vec<f32> {
        self.texels.iter().flatten().copied().collect()
    }

    /// 8-bit channel sequence in buffer row order (bottom row first).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|px| px.map(unorm8))
            .collect()
    }

    /// 8-bit channel sequence with rows flipped (top row first), as PNG expects.
    pub fn to_rgba8_top_down(&self) -> Vec<u8> {
        let row_len = self.size as usize;
        self.texels
            .chunks_exact(row_len)
            .rev()
            .flatten()
            .flat_map(|px| px.map(unorm8))
            .collect()
    }

    fn index(&self, addr: TexelAddress) -> VatResult<usize> {
        if !addr.in_bounds(self.size) {
            return Err(VatError::validation(format!(
                "texel ({}, {}) is outside the {}x{} texture",
                addr.column, addr.row, self.size, self.size
            )));
        }
        Ok(addr.pixel_index(self.size))
    }
}

#[cfg(test)]
#[path = "../tests/unit/pixels/buffer.rs"]
mod tests;
