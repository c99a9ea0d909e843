use crate::{
    foundation::{
        error::{FractalError, FractalResult},
        math::{apply_affine, box4},
    },
    raster::plane::ChannelPlane,
    transform::symmetry::Symmetry,
};

/// One contractive block map.
///
/// The domain block is addressed in full-resolution coordinates and always spans
/// `2 * size` pixels there; it is averaged down to `size` before being painted onto
/// the `size x size` range block as `round(scale * pixel) + offset`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Domain block origin, full-resolution x.
    pub domain_x: u32,
    /// Domain block origin, full-resolution y.
    pub domain_y: u32,
    /// Range block origin x.
    pub range_x: u32,
    /// Range block origin y.
    pub range_y: u32,
    /// Range block side; the domain spans twice this.
    pub size: u32,
    /// Orientation applied while reading the domain.
    pub symmetry: Symmetry,
    /// Contrast factor; the map contracts only when `|scale| < 1`.
    pub scale: f64,
    /// Brightness shift added after scaling.
    pub offset: i32,
}

impl Transform {
    /// Build a transform from its eight stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        domain_x: u32,
        domain_y: u32,
        range_x: u32,
        range_y: u32,
        size: u32,
        symmetry: Symmetry,
        scale: f64,
        offset: i32,
    ) -> Self {
        Self {
            domain_x,
            domain_y,
            range_x,
            range_y,
            size,
            symmetry,
            scale,
            offset,
        }
    }

    /// Paint the range block of `dest` from a pre-built half-resolution pool.
    ///
    /// The domain block is read from `down` at `(domain_x / 2, domain_y / 2)`.
    pub fn execute_on_downsampled(
        &self,
        down: &ChannelPlane,
        dest: &mut ChannelPlane,
    ) -> FractalResult<()> {
        self.paint(down, self.domain_x / 2, self.domain_y / 2, dest)
    }

    /// Average the `2 * size` domain region of `src` first, then paint `dest`.
    pub fn execute_with_downsample(
        &self,
        src: &ChannelPlane,
        dest: &mut ChannelPlane,
    ) -> FractalResult<()> {
        let domain = down_sample(src, self.domain_x, self.domain_y, self.size)?;
        self.paint(&domain, 0, 0, dest)
    }

    /// [`Self::execute_with_downsample`] where source and destination are the same plane.
    ///
    /// The domain is sampled before any pixel of the range block is written.
    pub fn apply_in_place(&self, plane: &mut ChannelPlane) -> FractalResult<()> {
        let domain = down_sample(plane, self.domain_x, self.domain_y, self.size)?;
        self.paint(&domain, 0, 0, plane)
    }

    fn paint(
        &self,
        src: &ChannelPlane,
        src_x: u32,
        src_y: u32,
        dest: &mut ChannelPlane,
    ) -> FractalResult<()> {
        self.check_range_fits(dest.width(), dest.height())?;
        if src.as_slice().is_empty() {
            return Err(FractalError::validation("transform source plane is empty"));
        }

        let max_x = src.width() - 1;
        let max_y = src.height() - 1;
        let traversal = self.symmetry.traversal();
        for dy in 0..self.size {
            for dx in 0..self.size {
                let (sx, sy) = traversal.source_of(dx, dy, self.size);
                let pixel = src.get(
                    src_x.saturating_add(sx).min(max_x),
                    src_y.saturating_add(sy).min(max_y),
                );
                dest.set(
                    self.range_x + dx,
                    self.range_y + dy,
                    apply_affine(pixel, self.scale, self.offset),
                );
            }
        }
        Ok(())
    }

    /// Reject a range block that is empty or not inside a `width x height` plane.
    pub(crate) fn check_range_fits(&self, width: u32, height: u32) -> FractalResult<()> {
        let fits_x = self
            .range_x
            .checked_add(self.size)
            .is_some_and(|end| end <= width);
        let fits_y = self
            .range_y
            .checked_add(self.size)
            .is_some_and(|end| end <= height);
        if self.size == 0 || !fits_x || !fits_y {
            return Err(FractalError::validation(format!(
                "range block {}x{} at ({}, {}) does not fit a {}x{} plane",
                self.size,
                self.size,
                self.range_x,
                self.range_y,
                width,
                height
            )));
        }
        Ok(())
    }
}

/// Box-filter the `2 * target_size` square at `(start_x, start_y)` into a
/// `target_size x target_size` plane.
///
/// Each output pixel is the truncating mean of one 2x2 cell. Cells past the
/// plane edge are clamped to the last whole cell, so regions hanging off the
/// plane repeat its border.
pub fn down_sample(
    src: &ChannelPlane,
    start_x: u32,
    start_y: u32,
    target_size: u32,
) -> FractalResult<ChannelPlane> {
    down_sample_region(src, start_x, start_y, target_size, target_size)
}

/// Half-resolution copy of a whole plane.
pub fn down_sample_plane(src: &ChannelPlane) -> FractalResult<ChannelPlane> {
    down_sample_region(src, 0, 0, src.width() / 2, src.height() / 2)
}

fn down_sample_region(
    src: &ChannelPlane,
    start_x: u32,
    start_y: u32,
    target_w: u32,
    target_h: u32,
) -> FractalResult<ChannelPlane> {
    let (w, h) = (src.width(), src.height());
    if w < 2 || h < 2 {
        return Err(FractalError::validation(format!(
            "cannot down-sample a {w}x{h} plane"
        )));
    }

    let mut out = Vec::with_capacity((target_w as usize) * (target_h as usize));
    for j in 0..target_h {
        let y = start_y.saturating_add(2 * j).min(h - 2);
        for i in 0..target_w {
            let x = start_x.saturating_add(2 * i).min(w - 2);
            out.push(box4(
                src.get(x, y),
                src.get(x + 1, y),
                src.get(x, y + 1),
                src.get(x + 1, y + 1),
            ));
        }
    }
    ChannelPlane::from_raw(target_w, target_h, out)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/block.rs"]
mod tests;
