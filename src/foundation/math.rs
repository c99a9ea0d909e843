/// Flat grey used to seed decoder planes.
pub(crate) const SEED_GREY: u8 = 127;

#[inline]
pub(crate) fn clamp_pixel(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

/// `round(scale * pixel) + offset`, clamped to the 8-bit range.
#[inline]
pub(crate) fn apply_affine(pixel: u8, scale: f64, offset: i32) -> u8 {
    let scaled = (scale * f64::from(pixel)).round() as i64;
    clamp_pixel(scaled.saturating_add(i64::from(offset)))
}

/// Integer truncating average of a 2x2 cell.
#[inline]
pub(crate) fn box4(a: u8, b: u8, c: u8, d: u8) -> u8 {
    ((u16::from(a) + u16::from(b) + u16::from(c) + u16::from(d)) / 4) as u8
}

pub(crate) fn mean(block: &[u8]) -> f64 {
    if block.is_empty() {
        return 0.0;
    }
    let sum: u64 = block.iter().map(|&p| u64::from(p)).sum();
    sum as f64 / block.len() as f64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
