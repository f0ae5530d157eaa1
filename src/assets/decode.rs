use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;

use crate::foundation::{
    core::Shape,
    error::{DollyError, DollyResult},
    pixel::{DepthMap, Image},
};

/// Decode an encoded panorama into packed RGB8, dropping any alpha channel.
pub fn decode_panorama(bytes: &[u8]) -> DollyResult<Image<u8>> {
    let dyn_img = image::load_from_memory(bytes).context("decode panorama from memory")?;
    rgb_image(dyn_img)
}

pub fn load_panorama(path: &Path) -> DollyResult<Image<u8>> {
    let dyn_img = image::open(path).with_context(|| format!("open panorama '{}'", path.display()))?;
    rgb_image(dyn_img)
}

/// Decode a depth image as 8-bit luma, resized to `shape` when it differs.
pub fn decode_depth(bytes: &[u8], shape: Shape) -> DollyResult<DepthMap<u8>> {
    let dyn_img = image::load_from_memory(bytes).context("decode depth map from memory")?;
    depth_map(dyn_img, shape)
}

pub fn load_depth(path: &Path, shape: Shape) -> DollyResult<DepthMap<u8>> {
    let dyn_img = image::open(path).with_context(|| format!("open depth map '{}'", path.display()))?;
    depth_map(dyn_img, shape)
}

/// Bilinear resize of an RGB8 image; returns a clone when the shape already matches.
pub fn resize_image_to(img: &Image<u8>, shape: Shape) -> DollyResult<Image<u8>> {
    if img.shape() == shape {
        return Ok(img.clone());
    }
    if img.channels() != 3 {
        return Err(DollyError::validation(format!(
            "can only resize RGB images, got {} channels",
            img.channels()
        )));
    }
    let buf = image::RgbImage::from_raw(img.width(), img.height(), img.as_slice().to_vec())
        .ok_or_else(|| DollyError::validation("image buffer does not match its dimensions"))?;
    let resized = image::imageops::resize(&buf, shape.width, shape.height, FilterType::Triangle);
    Image::new(shape.width, shape.height, 3, resized.into_raw())
}

fn rgb_image(dyn_img: image::DynamicImage) -> DollyResult<Image<u8>> {
    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Image::new(width, height, 3, rgb.into_raw())
}

fn depth_map(dyn_img: image::DynamicImage, shape: Shape) -> DollyResult<DepthMap<u8>> {
    if shape.is_empty() {
        return Err(DollyError::validation(format!(
            "cannot fit a depth map to an empty {shape} image"
        )));
    }
    let mut luma = dyn_img.to_luma8();
    if luma.dimensions() != (shape.width, shape.height) {
        tracing::debug!(
            from = %Shape::new(luma.width(), luma.height()),
            to = %shape,
            "resizing depth map to image size"
        );
        luma = image::imageops::resize(&luma, shape.width, shape.height, FilterType::Triangle);
    }
    DepthMap::new(shape.width, shape.height, luma.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
