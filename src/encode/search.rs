use crate::{
    foundation::{
        error::{FractalError, FractalResult},
        math::mean,
    },
    raster::plane::ChannelPlane,
    transform::symmetry::{Symmetry, SymmetrySet},
};

/// Closed-form least-squares fit of a range block onto a domain block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    /// Least-squares contrast factor.
    pub scale: f64,
    /// Unrounded `range_avg - scale * domain_avg`.
    pub offset: f64,
    /// Mean squared residual of the centered, rounded prediction.
    pub error: f64,
}

/// Regress `range` onto `domain` (same length, same pixel order).
///
/// `scale` falls back to 0 for a flat domain block.
pub fn fit(domain: &[u8], range: &[u8], range_avg: f64) -> Fit {
    let domain_avg = mean(domain);

    let mut num = 0.0f64;
    let mut den = 0.0f64;
    for (&d, &r) in domain.iter().zip(range) {
        let dc = f64::from(d) - domain_avg;
        num += dc * (f64::from(r) - range_avg);
        den += dc * dc;
    }
    let scale = if den == 0.0 { 0.0 } else { num / den };

    let mut sq = 0.0f64;
    for (&d, &r) in domain.iter().zip(range) {
        let predicted = (scale * (f64::from(d) - domain_avg)).round();
        let residual = predicted - (f64::from(r) - range_avg);
        sq += residual * residual;
    }
    let n = range.len().max(1) as f64;

    Fit {
        scale,
        offset: range_avg - scale * domain_avg,
        error: sq / n,
    }
}

/// Mean squared error of `scale * domain + offset` against `range`, without rounding.
pub fn collage_error(domain: &[u8], range: &[u8], scale: f64, offset: f64) -> f64 {
    let n = range.len().max(1) as f64;
    domain
        .iter()
        .zip(range)
        .map(|(&d, &r)| {
            let e = scale * f64::from(d) + offset - f64::from(r);
            e * e
        })
        .sum::<f64>()
        / n
}

/// Half-resolution domain pool shared by every range block of one channel.
pub(crate) struct DomainPool<'a> {
    down: &'a ChannelPlane,
    width: u32,
    height: u32,
}

impl<'a> DomainPool<'a> {
    /// `width`/`height` are the full-resolution dimensions `down` was built from.
    pub(crate) fn new(down: &'a ChannelPlane, width: u32, height: u32) -> FractalResult<Self> {
        if down.as_slice().is_empty() {
            return Err(FractalError::validation("domain pool plane is empty"));
        }
        Ok(Self {
            down,
            width,
            height,
        })
    }

    /// Full-resolution origins of non-overlapping `2 * size` domain blocks, row-major.
    ///
    /// An axis too short for a single block yields origin 0 alone.
    pub(crate) fn candidates(&self, size: u32) -> Vec<(u32, u32)> {
        let step = 2 * size;
        let axis = |len: u32| -> Vec<u32> {
            let fitting: Vec<u32> = (0..len)
                .step_by(step as usize)
                .filter(|p| p + step <= len)
                .collect();
            if fitting.is_empty() {
                vec![0]
            } else {
                fitting
            }
        };
        let xs = axis(self.width);
        axis(self.height)
            .into_iter()
            .flat_map(|y| xs.iter().map(move |&x| (x, y)))
            .collect()
    }

    /// Copy the domain block at full-resolution origin `(x, y)` as seen through `symmetry`.
    pub(crate) fn load(
        &self,
        x: u32,
        y: u32,
        size: u32,
        symmetry: Symmetry,
        scratch: &mut Vec<u8>,
    ) {
        let (ox, oy) = (x / 2, y / 2);
        let max_x = self.down.width() - 1;
        let max_y = self.down.height() - 1;
        let traversal = symmetry.traversal();
        scratch.clear();
        for dy in 0..size {
            for dx in 0..size {
                let (sx, sy) = traversal.source_of(dx, dy, size);
                scratch.push(self.down.get((ox + sx).min(max_x), (oy + sy).min(max_y)));
            }
        }
    }
}

/// Best domain block for one range block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Match {
    pub(crate) domain_x: u32,
    pub(crate) domain_y: u32,
    pub(crate) symmetry: Symmetry,
    pub(crate) scale: f64,
    pub(crate) offset: i32,
    pub(crate) error: f64,
}

/// Exhaustive search over every candidate and symmetry; first seen wins ties.
pub(crate) fn best_match(
    pool: &DomainPool<'_>,
    range_block: &[u8],
    size: u32,
    symmetries: SymmetrySet,
    scratch: &mut Vec<u8>,
) -> FractalResult<Match> {
    if range_block.is_empty() || range_block.len() != (size as usize) * (size as usize) {
        return Err(FractalError::validation(format!(
            "range block holds {} samples, expected {size}x{size}",
            range_block.len()
        )));
    }
    let range_avg = mean(range_block);

    let mut best: Option<Match> = None;
    for (x, y) in pool.candidates(size) {
        for symmetry in symmetries.iter() {
            pool.load(x, y, size, symmetry, scratch);
            let f = fit(scratch, range_block, range_avg);
            if best.is_none_or(|b| f.error < b.error) {
                best = Some(Match {
                    domain_x: x,
                    domain_y: y,
                    symmetry,
                    scale: f.scale,
                    offset: f.offset.round() as i32,
                    error: f.error,
                });
            }
        }
    }
    best.ok_or_else(|| FractalError::codec("no domain candidate was evaluated"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/search.rs"]
mod tests;
