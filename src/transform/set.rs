use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    foundation::error::{FractalError, FractalResult},
    raster::plane::validate_metadata,
    transform::block::Transform,
};

const MAX_CHANNELS: usize = 3;

/// Current transform file layout.
pub const FORMAT_VERSION: u32 = 1;

/// Per-channel ordered transforms: the entire compressed form of one image.
///
/// Slot `c - 1` holds channel `c`; slots past `channels` stay empty.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformSet {
    channels: usize,
    transforms: [Vec<Transform>; MAX_CHANNELS],
}

impl TransformSet {
    /// An empty set for a 1- or 3-channel image.
    pub fn new(channels: usize) -> FractalResult<Self> {
        check_channel_count(channels)?;
        Ok(Self {
            channels,
            transforms: Default::default(),
        })
    }

    /// Build a set from one transform list per channel.
    pub fn from_channels(per_channel: Vec<Vec<Transform>>) -> FractalResult<Self> {
        let mut set = Self::new(per_channel.len())?;
        for (slot, list) in set.transforms.iter_mut().zip(per_channel) {
            *slot = list;
        }
        Ok(set)
    }

    /// Declared channel count (1 or 3).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Transforms of a 1-based channel, in application order.
    pub fn channel(&self, channel: usize) -> FractalResult<&[Transform]> {
        Ok(&self.transforms[self.slot(channel)?])
    }

    pub(crate) fn extend_channel(
        &mut self,
        channel: usize,
        transforms: impl IntoIterator<Item = Transform>,
    ) -> FractalResult<()> {
        let slot = self.slot(channel)?;
        self.transforms[slot].extend(transforms);
        Ok(())
    }

    /// Total transform count over all channels.
    pub fn len(&self) -> usize {
        self.transforms.iter().map(Vec::len).sum()
    }

    /// Whether no channel holds a transform.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(channel, transform)` pairs, channel by channel.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Transform)> {
        self.transforms
            .iter()
            .take(self.channels)
            .enumerate()
            .flat_map(|(i, list)| list.iter().map(move |t| (i + 1, t)))
    }

    /// Largest `|scale|`; the set is guaranteed contractive only below 1.
    pub fn max_abs_scale(&self) -> f64 {
        self.iter()
            .map(|(_, t)| t.scale.abs())
            .fold(0.0, f64::max)
    }

    /// Number of transforms per block size.
    pub fn block_size_histogram(&self) -> BTreeMap<u32, usize> {
        let mut hist = BTreeMap::new();
        for (_, t) in self.iter() {
            *hist.entry(t.size).or_insert(0) += 1;
        }
        hist
    }

    fn slot(&self, channel: usize) -> FractalResult<usize> {
        if channel == 0 || channel > self.channels {
            return Err(FractalError::validation(format!(
                "channel {channel} is outside the transform set's range [1, {}]",
                self.channels
            )));
        }
        Ok(channel - 1)
    }

    fn validate(&self) -> FractalResult<()> {
        check_channel_count(self.channels)?;
        if self.transforms[self.channels..].iter().any(|l| !l.is_empty()) {
            return Err(FractalError::validation(format!(
                "transforms present for channels beyond declared count {}",
                self.channels
            )));
        }
        Ok(())
    }
}

fn check_channel_count(channels: usize) -> FractalResult<()> {
    if channels != 1 && channels != MAX_CHANNELS {
        return Err(FractalError::validation(format!(
            "transform set must cover 1 or 3 channels, got {channels}"
        )));
    }
    Ok(())
}

/// Serializable transform file: a [`TransformSet`] plus the target raster size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EncodedImage {
    /// File layout version; must equal [`FORMAT_VERSION`].
    pub version: u32,
    /// Raster width the transforms were encoded from.
    pub width: u32,
    /// Raster height the transforms were encoded from.
    pub height: u32,
    /// The compressed image.
    pub transforms: TransformSet,
}

impl EncodedImage {
    /// Wrap `transforms` at the current [`FORMAT_VERSION`].
    pub fn new(width: u32, height: u32, transforms: TransformSet) -> Self {
        Self {
            version: FORMAT_VERSION,
            width,
            height,
            transforms,
        }
    }

    /// Check version, metadata and that every range block lies inside the raster.
    pub fn validate(&self) -> FractalResult<()> {
        if self.version != FORMAT_VERSION {
            return Err(FractalError::validation(format!(
                "unsupported transform file version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        validate_metadata(self.width, self.height, self.transforms.channels())?;
        self.transforms.validate()?;
        for (channel, t) in self.transforms.iter() {
            let end_x = u64::from(t.range_x) + u64::from(t.size);
            let end_y = u64::from(t.range_y) + u64::from(t.size);
            if t.size == 0 || end_x > u64::from(self.width) || end_y > u64::from(self.height) {
                return Err(FractalError::validation(format!(
                    "channel {channel}: range block {}x{} at ({}, {}) exceeds {}x{}",
                    t.size, t.size, t.range_x, t.range_y, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a transform file from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FractalResult<Self> {
        let encoded: Self = serde_json::from_reader(r)
            .map_err(|e| FractalError::serde(format!("parse transform JSON: {e}")))?;
        encoded.validate()?;
        Ok(encoded)
    }

    /// Parse and validate a transform file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> FractalResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FractalError::validation(format!("open transform file '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as compact JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> FractalResult<()> {
        serde_json::to_writer(w, self)
            .map_err(|e| FractalError::serde(format!("write transform JSON: {e}")))
    }

    /// Write the transform file, creating parent directories as needed.
    pub fn to_path(&self, path: impl AsRef<Path>) -> FractalResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let f = File::create(path)
            .with_context(|| format!("create transform file '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush transform file '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/set.rs"]
mod tests;
