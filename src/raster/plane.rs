use crate::foundation::error::{FractalError, FractalResult};

/// One row-major 8-bit sample plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelPlane {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ChannelPlane {
    /// A plane where every sample is `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Wrap an existing row-major buffer; its length must be `width * height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FractalResult<Self> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(FractalError::validation(format!(
                "plane buffer holds {} samples, expected {width}x{height} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Sample at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Overwrite the sample at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, v: u8) {
        self.data[(y as usize) * (self.width as usize) + x as usize] = v;
    }
}

/// Channel-plane image: 1 (grey) or 3 (RGB) planes of equal size.
///
/// Channels are addressed 1-based, matching the transform file layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    planes: Vec<ChannelPlane>,
}

impl Image {
    /// An image whose planes are all flat `value`.
    pub fn filled(width: u32, height: u32, channels: usize, value: u8) -> FractalResult<Self> {
        validate_metadata(width, height, channels)?;
        Ok(Self {
            width,
            height,
            planes: (0..channels)
                .map(|_| ChannelPlane::filled(width, height, value))
                .collect(),
        })
    }

    /// Assemble an image from planes that all share the same dimensions.
    pub fn from_planes(planes: Vec<ChannelPlane>) -> FractalResult<Self> {
        let Some(first) = planes.first() else {
            return Err(FractalError::validation("image needs at least one plane"));
        };
        let (width, height) = (first.width, first.height);
        validate_metadata(width, height, planes.len())?;
        if planes
            .iter()
            .any(|p| p.width != width || p.height != height)
        {
            return Err(FractalError::validation(
                "all image planes must share the same dimensions",
            ));
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// Split pixel-interleaved samples (`GG..` or `RGBRGB..`) into planes.
    pub fn from_interleaved(
        width: u32,
        height: u32,
        channels: usize,
        samples: &[u8],
    ) -> FractalResult<Self> {
        validate_metadata(width, height, channels)?;
        let pixels = (width as usize) * (height as usize);
        if samples.len() != pixels * channels {
            return Err(FractalError::validation(format!(
                "interleaved buffer holds {} samples, expected {}",
                samples.len(),
                pixels * channels
            )));
        }

        let mut planes = vec![Vec::with_capacity(pixels); channels];
        for px in samples.chunks_exact(channels) {
            for (plane, &v) in planes.iter_mut().zip(px) {
                plane.push(v);
            }
        }
        Ok(Self {
            width,
            height,
            planes: planes
                .into_iter()
                .map(|data| ChannelPlane {
                    width,
                    height,
                    data,
                })
                .collect(),
        })
    }

    /// Interleave all planes back into `GG..` or `RGBRGB..` order.
    pub fn to_interleaved(&self) -> Vec<u8> {
        let pixels = (self.width as usize) * (self.height as usize);
        let mut out = Vec::with_capacity(pixels * self.planes.len());
        for i in 0..pixels {
            for plane in &self.planes {
                out.push(plane.data[i]);
            }
        }
        out
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of planes (1 or 3).
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Plane for a 1-based channel index.
    pub fn plane(&self, channel: usize) -> FractalResult<&ChannelPlane> {
        let idx = self.channel_slot(channel)?;
        Ok(&self.planes[idx])
    }

    /// Mutable plane for a 1-based channel index.
    pub fn plane_mut(&mut self, channel: usize) -> FractalResult<&mut ChannelPlane> {
        let idx = self.channel_slot(channel)?;
        Ok(&mut self.planes[idx])
    }

    /// All planes in channel order.
    pub fn planes(&self) -> &[ChannelPlane] {
        &self.planes
    }

    fn channel_slot(&self, channel: usize) -> FractalResult<usize> {
        if channel == 0 || channel > self.planes.len() {
            return Err(FractalError::validation(format!(
                "channel {channel} is outside [1, {}]",
                self.planes.len()
            )));
        }
        Ok(channel - 1)
    }
}

/// Reject non-positive dimensions and channel counts other than 1 or 3.
pub fn validate_metadata(width: u32, height: u32, channels: usize) -> FractalResult<()> {
    if width == 0 || height == 0 {
        return Err(FractalError::validation(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    if channels != 1 && channels != 3 {
        return Err(FractalError::validation(format!(
            "image must have 1 or 3 channels, got {channels}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/plane.rs"]
mod tests;
