//! Delta encoding of a vertex displacement into one RGBA texel.
//!
//! Layout of a texel:
//!
//! - `r`, `g`, `b`: fractional parts of the (possibly rescaled) displacement, raw floats in `[0, 1)`
//! - `a`: `alpha_word / 255` with
//!   `alpha_word = (ix + 2) << 6 | (iy + 2) << 4 | (iz + 2) << 2 | w`
//!
//! `ix`, `iy`, `iz` are the floored integer parts (2 bits each, biased by 2) and `w` is the
//! exponent level (2 bits). A non-zero `w` multiplies the displacement by `2 * w` before splitting;
//! this is a linear factor and the shader-side decoder depends on it bit for bit.

use crate::foundation::core::Vec3;
use crate::foundation::error::{TexelSite, VatError, VatResult};
use crate::foundation::math::{clamp_u8, unorm8};

/// Highest representable exponent level.
pub const MAX_EXPONENT: i64 = 3;

/// Bias added to integer parts before packing.
pub const INTEGER_BIAS: i64 = 2;

/// What to do when an integer part does not fit its 2-bit field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMode {
    /// Pack anyway; the overflowing field bleeds into its neighbours.
    #[default]
    Lenient,
    /// Fail with [`VatError::IntegerPartOverflow`].
    Strict,
}

/// One encoded texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizedColor {
    /// Fractional part per axis.
    pub fract: [f32; 3],
    /// Integer part per axis, already biased by [`INTEGER_BIAS`].
    pub biased: [i32; 3],
    /// Exponent level `w` in `0..=3`.
    pub exponent: u8,
}

impl QuantizedColor {
    /// Packed alpha word.
    ///
    /// Computed with signed shifts and ors, so an overflowing integer part produces a word outside
    /// `0..=255` instead of saturating.
    pub fn alpha_word(self) -> i32 {
        (self.biased[0] << 6)
            | (self.biased[1] << 4)
            | (self.biased[2] << 2)
            | i32::from(self.exponent)
    }

    /// Alpha channel in float color space (`alpha_word / 255`, not clamped).
    pub fn alpha(self) -> f32 {
        self.alpha_word() as f32 / 255.0
    }

    /// Return `true` when any biased integer part lies outside `0..=3`.
    pub fn overflowed(self) -> bool {
        self.biased.iter().any(|b| !(0..=3).contains(b))
    }

    /// Float RGBA as written into the pixel buffer.
    pub fn to_rgba(self) -> [f32; 4] {
        [self.fract[0], self.fract[1], self.fract[2], self.alpha()]
    }

    /// 8-bit RGBA as stored in the exported texture.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            unorm8(self.fract[0]),
            unorm8(self.fract[1]),
            unorm8(self.fract[2]),
            clamp_u8(self.alpha_word()),
        ]
    }
}

/// Delta encoder with a configurable overflow policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaEncoder {
    /// Integer-part overflow policy.
    pub mode: EncodeMode,
}

impl DeltaEncoder {
    /// Create an encoder with the given overflow policy.
    pub fn new(mode: EncodeMode) -> Self {
        Self { mode }
    }

    /// Encode `rest - posed` into one texel.
    pub fn encode(self, rest: Vec3, posed: Vec3) -> VatResult<QuantizedColor> {
        let mut delta = (rest.as_dvec3() - posed.as_dvec3()).to_array();
        if delta.iter().any(|d| !d.is_finite()) {
            return Err(VatError::validation(format!(
                "non-finite displacement {delta:?} (rest {rest}, posed {posed})"
            )));
        }
        let unscaled = delta;

        let level = delta.iter().map(|d| scale_level(*d)).max().unwrap_or(0);
        if level > MAX_EXPONENT {
            return Err(VatError::RangeExceeded {
                site: TexelSite::default(),
                delta: unscaled,
                level,
            });
        }

        if level != 0 {
            let factor = (2 * level) as f64;
            for d in &mut delta {
                *d *= factor;
            }
        }

        let mut fract = [0.0f32; 3];
        let mut biased = [0i32; 3];
        for (axis, d) in delta.iter().enumerate() {
            let int = d.floor();
            fract[axis] = (d - int) as f32;
            let int = int as i64;
            if self.mode == EncodeMode::Strict && !(-INTEGER_BIAS..=1).contains(&int) {
                return Err(VatError::IntegerPartOverflow {
                    site: TexelSite::default(),
                    delta: unscaled,
                    axis,
                    value: int,
                });
            }
            biased[axis] = (int + INTEGER_BIAS) as i32;
        }

        Ok(QuantizedColor {
            fract,
            biased,
            exponent: level as u8,
        })
    }
}

/// Encode `rest - posed` with the default (lenient) policy.
pub fn encode(rest: Vec3, posed: Vec3) -> VatResult<QuantizedColor> {
    DeltaEncoder::default().encode(rest, posed)
}

// Range bucket of one axis: `floor(|d| / 2)`.
fn scale_level(d: f64) -> i64 {
    (d.abs() / 2.0).floor() as i64
}

#[cfg(test)]
#[path = "../tests/unit/codec/delta.rs"]
mod tests;
