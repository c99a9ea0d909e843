//! Lossy fractal (iterated function system) image compression.
//!
//! An image is encoded as a set of contractive block maps: every range block of the
//! image is approximated by a down-sampled, optionally rotated or mirrored domain
//! block whose intensities are scaled and offset. Decoding starts from flat grey and
//! applies the maps repeatedly until the image settles near their fixed point.
//!
//! # Pipeline overview
//!
//! 1. **Load**: image file -> [`Image`] (1 or 3 channel planes, sides a multiple of 32)
//! 2. **Encode**: [`Image`] -> [`TransformSet`] via quadtree search ([`Encoder`])
//! 3. **Store**: [`TransformSet`] + raster size -> [`EncodedImage`] JSON file
//! 4. **Decode**: [`TransformSet`] -> [`Image`] after N phases ([`Decoder`])
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same image and options always produce the same transform
//!   set, with or without parallel search.
//! - **Fail fast**: malformed inputs are rejected with [`FractalError::Validation`]
//!   before any work starts.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod decode;
mod encode;
mod foundation;
mod raster;
mod transform;

pub use decode::decoder::{Decoder, PhaseStats, decode_image};
pub use encode::options::{EncodeThreading, EncoderOptions};
pub use encode::quadtree::{
    EncodeStats, Encoder, MIN_BLOCK_SIZE, TOP_LEVEL_BLOCK_SIZE, encode, find_matches_for,
};
pub use encode::search::{Fit, collage_error, fit};
pub use foundation::error::{FractalError, FractalResult};
pub use raster::io::{crop_to_codec_bounds, image_from_dynamic, load_image, save_image};
pub use raster::metrics::{max_abs_diff, mse, psnr};
pub use raster::plane::{ChannelPlane, Image, validate_metadata};
pub use transform::block::{Transform, down_sample, down_sample_plane};
pub use transform::set::{EncodedImage, FORMAT_VERSION, TransformSet};
pub use transform::symmetry::{Symmetry, SymmetrySet};
