use crate::foundation::error::{VatError, VatResult};

pub use glam::{Mat4, Vec3};

/// Default texture edge length in texels.
pub const TEXTURE_SIZE: u32 = 128;

/// Default first sampled frame.
pub const DEFAULT_FIRST_FRAME: FrameNumber = FrameNumber(1);

/// Default last sampled frame (inclusive).
pub const DEFAULT_LAST_FRAME: FrameNumber = FrameNumber(42);

/// Default background fill: opaque-ish black with alpha `168/255`.
pub const BACKGROUND_RGBA: [f32; 4] = [0.0, 0.0, 0.0, 168.0 / 255.0];

/// 1-based animation frame number.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameNumber(pub u64);

impl FrameNumber {
    /// Zero-based frame slot used for horizontal texel addressing (`frame - 1`).
    pub fn slot(self) -> u64 {
        self.0.saturating_sub(1)
    }
}

/// Inclusive frame range `[start, end]`, both 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame (inclusive).
    pub start: FrameNumber,
    /// Last frame (inclusive).
    pub end: FrameNumber,
}

impl Default for FrameRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_FIRST_FRAME,
            end: DEFAULT_LAST_FRAME,
        }
    }
}

impl FrameRange {
    /// Create a validated range with `1 <= start <= end`.
    pub fn new(start: FrameNumber, end: FrameNumber) -> VatResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Check the range invariants; ranges can also arrive through deserialization.
    pub fn validate(self) -> VatResult<()> {
        if self.start.0 == 0 {
            return Err(VatError::validation("frame numbers are 1-based; start must be >= 1"));
        }
        if self.start > self.end {
            return Err(VatError::validation(format!(
                "frame range start ({}) must be <= end ({})",
                self.start.0, self.end.0
            )));
        }
        Ok(())
    }

    /// Number of frames in the range.
    pub fn len_frames(self) -> u64 {
        if self.start > self.end {
            return 0;
        }
        self.end.0 - self.start.0 + 1
    }

    /// Return `true` when `f` lies inside `[start, end]`.
    pub fn contains(self, f: FrameNumber) -> bool {
        self.start <= f && f <= self.end
    }

    /// Iterate frames in ascending order.
    pub fn iter(self) -> impl Iterator<Item = FrameNumber> {
        (self.start.0..=self.end.0).map(FrameNumber)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
