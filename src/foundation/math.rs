/// Quantize a `[0, 1]` float channel to 8-bit unorm (round to nearest, clamped).
pub(crate) fn unorm8(c: f32) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Clamp a raw 8-bit word that may have overflowed its range.
pub(crate) fn clamp_u8(word: i32) -> u8 {
    word.clamp(0, 255) as u8
}

pub(crate) fn ceil_div(n: u64, d: u64) -> u64 {
    n.div_ceil(d)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
