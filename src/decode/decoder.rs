use crate::{
    foundation::{
        error::{FractalError, FractalResult},
        math::SEED_GREY,
    },
    raster::plane::{ChannelPlane, Image, validate_metadata},
    transform::set::TransformSet,
};

/// Outcome of one decode phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseStats {
    /// 1-based phase number.
    pub phase: u32,
    /// Largest per-sample change this phase made, over all channels.
    pub max_deviation: u8,
}

/// Working planes that converge toward the transform set's fixed point.
///
/// Planes start flat grey. Each [`Decoder::decode`] call is one phase: every
/// transform, in stored order, reads and overwrites the same plane.
#[derive(Clone, Debug)]
pub struct Decoder {
    width: u32,
    height: u32,
    planes: Vec<ChannelPlane>,
}

impl Decoder {
    /// Grey-seeded planes for a `width x height` raster with 1 or 3 channels.
    pub fn new(width: u32, height: u32, channels: usize) -> FractalResult<Self> {
        validate_metadata(width, height, channels)?;
        Ok(Self {
            width,
            height,
            planes: (0..channels)
                .map(|_| ChannelPlane::filled(width, height, SEED_GREY))
                .collect(),
        })
    }

    /// Raster width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current plane count.
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Grow the plane count to `channels`; never shrinks. New planes are seeded grey.
    pub fn reconcile_channels(&mut self, channels: usize) -> FractalResult<()> {
        validate_metadata(self.width, self.height, channels)?;
        while self.planes.len() < channels {
            self.planes
                .push(ChannelPlane::filled(self.width, self.height, SEED_GREY));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, transforms), fields(transforms = transforms.len()))]
    /// Run one phase: apply every transform of every channel in stored order.
    ///
    /// Range blocks are checked against the raster up front, so a rejected set
    /// leaves the planes untouched.
    pub fn decode(&mut self, transforms: &TransformSet) -> FractalResult<()> {
        for (channel, t) in transforms.iter() {
            match t.check_range_fits(self.width, self.height) {
                Err(FractalError::Validation(msg)) => {
                    return Err(FractalError::validation(format!("channel {channel}: {msg}")));
                }
                other => other?,
            }
        }
        self.reconcile_channels(transforms.channels())?;
        for channel in 1..=transforms.channels() {
            let plane = &mut self.planes[channel - 1];
            for t in transforms.channel(channel)? {
                t.apply_in_place(plane)?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, transforms))]
    /// Run `phases` phases and report how much each one changed the planes.
    ///
    /// Deviation shrinks geometrically only when every `|scale| < 1`.
    pub fn run_phases(
        &mut self,
        transforms: &TransformSet,
        phases: u32,
    ) -> FractalResult<Vec<PhaseStats>> {
        let max_scale = transforms.max_abs_scale();
        if max_scale >= 1.0 {
            tracing::warn!(
                max_scale,
                "transform set is not contractive; decoding may not converge"
            );
        }

        let mut stats = Vec::with_capacity(phases as usize);
        for phase in 1..=phases {
            let before = self.planes.clone();
            self.decode(transforms)?;
            let max_deviation = before
                .iter()
                .zip(&self.planes)
                .flat_map(|(a, b)| a.as_slice().iter().zip(b.as_slice()))
                .map(|(&x, &y)| x.abs_diff(y))
                .max()
                .unwrap_or(0);
            tracing::debug!(phase, max_deviation, "decode phase");
            stats.push(PhaseStats {
                phase,
                max_deviation,
            });
        }
        Ok(stats)
    }

    /// Export the current planes: all of them for `channel == 0`, otherwise the
    /// selected 1-based channel as a mono image.
    pub fn make_image(&self, channel: usize) -> FractalResult<Image> {
        if channel == 0 {
            return Image::from_planes(self.planes.clone());
        }
        let plane = self.planes.get(channel - 1).ok_or_else(|| {
            FractalError::validation(format!(
                "channel {channel} is outside the decoder's range [1, {}]",
                self.planes.len()
            ))
        })?;
        Image::from_planes(vec![plane.clone()])
    }
}

/// Reconstruct a `width x height` image from `transforms` with `phases` phases.
pub fn decode_image(
    transforms: &TransformSet,
    width: u32,
    height: u32,
    phases: u32,
) -> FractalResult<Image> {
    let mut decoder = Decoder::new(width, height, transforms.channels())?;
    decoder.run_phases(transforms, phases)?;
    decoder.make_image(0)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/decoder.rs"]
mod tests;
