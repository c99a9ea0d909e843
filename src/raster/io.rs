//! Raster file boundary: everything that touches the `image` crate lives here.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    encode::quadtree::TOP_LEVEL_BLOCK_SIZE,
    foundation::error::{FractalError, FractalResult},
    raster::plane::{ChannelPlane, Image},
};

/// Decode an image file. Grayscale sources load as 1 channel, everything else as RGB.
pub fn load_image(path: impl AsRef<Path>) -> FractalResult<Image> {
    let path = path.as_ref();
    let dyn_img =
        image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    image_from_dynamic(&dyn_img)
}

/// Convert an in-memory `image::DynamicImage` into channel planes.
pub fn image_from_dynamic(dyn_img: &image::DynamicImage) -> FractalResult<Image> {
    if dyn_img.color().has_color() {
        let rgb = dyn_img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Image::from_interleaved(width, height, 3, rgb.as_raw())
    } else {
        let luma = dyn_img.to_luma8();
        let (width, height) = luma.dimensions();
        Image::from_planes(vec![ChannelPlane::from_raw(
            width,
            height,
            luma.into_raw(),
        )?])
    }
}

/// Encode `img` to disk; the format follows the file extension.
pub fn save_image(path: impl AsRef<Path>, img: &Image) -> FractalResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let color = match img.channels() {
        1 => image::ColorType::L8,
        3 => image::ColorType::Rgb8,
        n => {
            return Err(FractalError::validation(format!(
                "cannot save an image with {n} channels"
            )));
        }
    };
    image::save_buffer(path, &img.to_interleaved(), img.width(), img.height(), color)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

/// Center-crop to the largest square whose side is a multiple of the top-level block size.
pub fn crop_to_codec_bounds(img: &Image) -> FractalResult<Image> {
    let side = img.width().min(img.height()) / TOP_LEVEL_BLOCK_SIZE * TOP_LEVEL_BLOCK_SIZE;
    if side == 0 {
        return Err(FractalError::validation(format!(
            "image {}x{} is smaller than one {TOP_LEVEL_BLOCK_SIZE}x{TOP_LEVEL_BLOCK_SIZE} block",
            img.width(),
            img.height()
        )));
    }
    if side == img.width() && side == img.height() {
        return Ok(img.clone());
    }

    let x0 = (img.width() - side) / 2;
    let y0 = (img.height() - side) / 2;
    let planes = img
        .planes()
        .iter()
        .map(|src| {
            let mut data = Vec::with_capacity((side as usize) * (side as usize));
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    data.push(src.get(x, y));
                }
            }
            ChannelPlane::from_raw(side, side, data)
        })
        .collect::<FractalResult<Vec<_>>>()?;
    Image::from_planes(planes)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/io.rs"]
mod tests;
