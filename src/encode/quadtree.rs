use std::time::Instant;

use rayon::prelude::*;

use crate::{
    encode::{
        options::EncoderOptions,
        search::{DomainPool, best_match},
    },
    foundation::error::{FractalError, FractalResult},
    raster::plane::{ChannelPlane, Image, validate_metadata},
    transform::{
        block::{Transform, down_sample_plane},
        set::TransformSet,
        symmetry::SymmetrySet,
    },
};

/// Side of the top-level range blocks; image dimensions must be multiples of it.
pub const TOP_LEVEL_BLOCK_SIZE: u32 = 32;

/// Blocks of this size are never subdivided.
pub const MIN_BLOCK_SIZE: u32 = 2;

/// Counters describing one encode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Top-level blocks searched, over all channels.
    pub top_level_blocks: u64,
    /// Emitted transforms, over all channels.
    pub transforms: u64,
    /// Blocks split into quadrants because their best match was not good enough.
    pub subdivisions: u64,
    /// Smallest emitted block size (0 when nothing was emitted).
    pub smallest_block: u32,
    /// Largest emitted block size.
    pub largest_block: u32,
}

impl EncodeStats {
    fn record_leaf(&mut self, size: u32) {
        self.transforms += 1;
        self.smallest_block = if self.smallest_block == 0 {
            size
        } else {
            self.smallest_block.min(size)
        };
        self.largest_block = self.largest_block.max(size);
    }

    fn merge(&mut self, other: EncodeStats) {
        self.top_level_blocks += other.top_level_blocks;
        self.transforms += other.transforms;
        self.subdivisions += other.subdivisions;
        if other.smallest_block != 0 {
            self.smallest_block = if self.smallest_block == 0 {
                other.smallest_block
            } else {
                self.smallest_block.min(other.smallest_block)
            };
        }
        self.largest_block = self.largest_block.max(other.largest_block);
    }
}

/// Builds a [`TransformSet`] from an image, one channel at a time.
#[derive(Clone, Debug)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Validate `options` and build an encoder around them.
    pub fn new(options: EncoderOptions) -> FractalResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options this encoder was built with.
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode every channel of `source`.
    pub fn encode(&self, source: &Image) -> FractalResult<TransformSet> {
        self.encode_with_stats(source).map(|(set, _)| set)
    }

    #[tracing::instrument(
        skip(self, source),
        fields(width = source.width(), height = source.height(), channels = source.channels())
    )]
    /// Encode every channel of `source` and report search counters.
    pub fn encode_with_stats(&self, source: &Image) -> FractalResult<(TransformSet, EncodeStats)> {
        validate_source(source)?;

        let pool = if self.options.threading.parallel {
            Some(build_thread_pool(self.options.threading.threads)?)
        } else {
            None
        };

        let mut set = TransformSet::new(source.channels())?;
        let mut stats = EncodeStats::default();
        let blocks = top_level_blocks(source.width(), source.height());

        for channel in 1..=source.channels() {
            let started = Instant::now();
            let range = source.plane(channel)?;
            let down = down_sample_plane(range)?;
            let ctx = SearchContext::new(range, &down, &self.options)?;

            let per_block = match &pool {
                Some(pool) => pool.install(|| {
                    blocks
                        .par_iter()
                        .map(|&(x, y)| ctx.encode_block(x, y))
                        .collect::<Vec<_>>()
                }),
                None => blocks
                    .iter()
                    .map(|&(x, y)| ctx.encode_block(x, y))
                    .collect(),
            };

            let mut channel_stats = EncodeStats::default();
            for item in per_block {
                let (transforms, block_stats) = item?;
                set.extend_channel(channel, transforms)?;
                channel_stats.merge(block_stats);
            }

            tracing::debug!(
                channel,
                transforms = channel_stats.transforms,
                subdivisions = channel_stats.subdivisions,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "encoded channel"
            );
            stats.merge(channel_stats);
        }

        Ok((set, stats))
    }
}

/// Encode `source` with `options`.
pub fn encode(source: &Image, options: &EncoderOptions) -> FractalResult<TransformSet> {
    Encoder::new(options.clone())?.encode(source)
}

/// Match the `block_size` range block at `(to_x, to_y)` against the pool built from
/// `range_plane`, subdividing while the best error is at or above `quality_threshold`.
///
/// Leaves are appended to `out` depth-first, quadrants in top-left, top-right,
/// bottom-left, bottom-right order.
pub fn find_matches_for(
    out: &mut Vec<Transform>,
    to_x: u32,
    to_y: u32,
    block_size: u32,
    range_plane: &ChannelPlane,
    down_plane: &ChannelPlane,
    options: &EncoderOptions,
) -> FractalResult<EncodeStats> {
    options.validate()?;
    let ctx = SearchContext::new(range_plane, down_plane, options)?;
    ctx.find_matches_for(out, to_x, to_y, block_size)
}

struct SearchContext<'a> {
    range: &'a ChannelPlane,
    pool: DomainPool<'a>,
    threshold: f64,
    symmetries: SymmetrySet,
}

impl<'a> SearchContext<'a> {
    fn new(
        range: &'a ChannelPlane,
        down: &'a ChannelPlane,
        options: &EncoderOptions,
    ) -> FractalResult<Self> {
        if range.as_slice().is_empty() {
            return Err(FractalError::validation("range plane is empty"));
        }
        Ok(Self {
            range,
            pool: DomainPool::new(down, range.width(), range.height())?,
            threshold: f64::from(options.quality_threshold),
            symmetries: options.symmetries,
        })
    }

    fn encode_block(&self, x: u32, y: u32) -> FractalResult<(Vec<Transform>, EncodeStats)> {
        let mut out = Vec::new();
        let mut stats = self.find_matches_for(&mut out, x, y, TOP_LEVEL_BLOCK_SIZE)?;
        stats.top_level_blocks = 1;
        Ok((out, stats))
    }

    fn find_matches_for(
        &self,
        out: &mut Vec<Transform>,
        to_x: u32,
        to_y: u32,
        block_size: u32,
    ) -> FractalResult<EncodeStats> {
        if block_size < MIN_BLOCK_SIZE || !block_size.is_power_of_two() {
            return Err(FractalError::validation(format!(
                "block size {block_size} must be a power of two >= {MIN_BLOCK_SIZE}"
            )));
        }
        let outside_x = to_x
            .checked_add(block_size)
            .is_none_or(|end| end > self.range.width());
        let outside_y = to_y
            .checked_add(block_size)
            .is_none_or(|end| end > self.range.height());
        if outside_x || outside_y {
            return Err(FractalError::validation(format!(
                "block {block_size}x{block_size} at ({to_x}, {to_y}) exceeds the {}x{} plane",
                self.range.width(),
                self.range.height()
            )));
        }

        let mut stats = EncodeStats::default();
        let mut range_block = Vec::with_capacity((block_size as usize) * (block_size as usize));
        let mut scratch = Vec::with_capacity(range_block.capacity());
        let mut stack = vec![(to_x, to_y, block_size)];

        while let Some((x, y, size)) = stack.pop() {
            copy_block(self.range, x, y, size, &mut range_block);
            let m = best_match(&self.pool, &range_block, size, self.symmetries, &mut scratch)?;

            if size > MIN_BLOCK_SIZE && m.error >= self.threshold {
                let half = size / 2;
                // reversed so the top-left quadrant is popped first
                stack.extend([
                    (x + half, y + half, half),
                    (x, y + half, half),
                    (x + half, y, half),
                    (x, y, half),
                ]);
                stats.subdivisions += 1;
                continue;
            }

            tracing::trace!(x, y, size, error = m.error, "leaf transform");
            out.push(Transform::new(
                m.domain_x, m.domain_y, x, y, size, m.symmetry, m.scale, m.offset,
            ));
            stats.record_leaf(size);
        }
        Ok(stats)
    }
}

fn copy_block(plane: &ChannelPlane, x: u32, y: u32, size: u32, out: &mut Vec<u8>) {
    out.clear();
    for j in y..y + size {
        for i in x..x + size {
            out.push(plane.get(i, j));
        }
    }
}

fn validate_source(source: &Image) -> FractalResult<()> {
    validate_metadata(source.width(), source.height(), source.channels())?;
    if source.width() % TOP_LEVEL_BLOCK_SIZE != 0 || source.height() % TOP_LEVEL_BLOCK_SIZE != 0 {
        return Err(FractalError::validation(format!(
            "image {}x{} is not a multiple of {TOP_LEVEL_BLOCK_SIZE} in both dimensions",
            source.width(),
            source.height()
        )));
    }
    Ok(())
}

/// Origins of the top-level grid, row-major.
fn top_level_blocks(width: u32, height: u32) -> Vec<(u32, u32)> {
    let step = TOP_LEVEL_BLOCK_SIZE as usize;
    (0..height)
        .step_by(step)
        .flat_map(|y| (0..width).step_by(step).map(move |x| (x, y)))
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> FractalResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FractalError::codec(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/quadtree.rs"]
mod tests;
