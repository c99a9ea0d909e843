use crate::{
    foundation::error::{FractalError, FractalResult},
    raster::plane::Image,
};

fn check_comparable(a: &Image, b: &Image) -> FractalResult<()> {
    if a.width() != b.width() || a.height() != b.height() || a.channels() != b.channels() {
        return Err(FractalError::validation(format!(
            "cannot compare {}x{}x{} with {}x{}x{}",
            a.width(),
            a.height(),
            a.channels(),
            b.width(),
            b.height(),
            b.channels()
        )));
    }
    Ok(())
}

fn sample_pairs<'a>(a: &'a Image, b: &'a Image) -> impl Iterator<Item = (u8, u8)> + 'a {
    a.planes()
        .iter()
        .zip(b.planes())
        .flat_map(|(pa, pb)| pa.as_slice().iter().copied().zip(pb.as_slice().iter().copied()))
}

/// Largest per-sample difference across all channels.
pub fn max_abs_diff(a: &Image, b: &Image) -> FractalResult<u8> {
    check_comparable(a, b)?;
    Ok(sample_pairs(a, b)
        .map(|(x, y)| x.abs_diff(y))
        .max()
        .unwrap_or(0))
}

/// Mean squared error across all channels.
pub fn mse(a: &Image, b: &Image) -> FractalResult<f64> {
    check_comparable(a, b)?;
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for (x, y) in sample_pairs(a, b) {
        let d = f64::from(x) - f64::from(y);
        sum += d * d;
        n += 1;
    }
    Ok(if n == 0 { 0.0 } else { sum / n as f64 })
}

/// Peak signal-to-noise ratio in dB; infinite for identical images.
pub fn psnr(a: &Image, b: &Image) -> FractalResult<f64> {
    let mse = mse(a, b)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/metrics.rs"]
mod tests;
