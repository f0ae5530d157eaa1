//! Depth-proportional parallax shift.
//!
//! Nearer pixels (larger depth values) are displaced further than distant ones, which reads as
//! a camera dolly rather than a flat slide. Source coordinates are clamped to the image, so the
//! left/right seam of an equirectangular panorama is *not* wrapped: content near the seam smears
//! the edge column instead of pulling from the opposite side.

use crate::{
    effects::sample::{Border, bilinear_into},
    foundation::{
        error::{DollyError, DollyResult},
        pixel::{DepthMap, Image, Sample},
    },
};

/// Maximum horizontal shift as a fraction of image width, at `displacement = 1`.
pub const MAX_SHIFT_FRACTION: f32 = 0.05;
/// Vertical shift relative to the horizontal shift.
pub const VERTICAL_PARALLAX: f32 = 0.3;

/// Which way the camera appears to travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarpDirection {
    /// Into the scene (content slides toward -x when sampled from +x).
    Forward,
    /// Out of the scene; the shift is negated.
    Backward,
}

/// Largest horizontal shift, in pixels, for an image `width` wide.
pub fn max_shift(width: u32, displacement: f32, direction: WarpDirection) -> f32 {
    let shift = displacement * width as f32 * MAX_SHIFT_FRACTION;
    match direction {
        WarpDirection::Forward => shift,
        WarpDirection::Backward => -shift,
    }
}

/// Displace `image` by `displacement` (in `[0, 1]`) scaled per pixel by `depth`.
///
/// Returns a new image of identical shape and channel count. The only error is a depth map whose
/// dimensions differ from the image's.
pub fn depth_warp<P: Sample, D: Sample>(
    image: &Image<P>,
    depth: &DepthMap<D>,
    displacement: f32,
    direction: WarpDirection,
) -> DollyResult<Image<P>> {
    if depth.shape() != image.shape() {
        return Err(DollyError::shape_mismatch(
            "depth map vs image",
            image.shape(),
            depth.shape(),
        ));
    }

    let w = image.width();
    let h = image.height();
    let ch = image.channels();
    let shift = max_shift(w, displacement.clamp(0.0, 1.0), direction);

    let mut out = Vec::with_capacity(image.as_slice().len());
    let mut px = vec![0.0f32; ch];
    for y in 0..h {
        for x in 0..w {
            let dx = depth.nearness(x, y) * shift;
            let dy = dx * VERTICAL_PARALLAX;
            let sx = (x as f32 + dx).clamp(0.0, (w - 1) as f32);
            let sy = (y as f32 + dy).clamp(0.0, (h - 1) as f32);
            bilinear_into(image, sx, sy, Border::Replicate, &mut px);
            out.extend(px.iter().map(|&v| P::from_f32(v)));
        }
    }

    Image::new(w, h, ch, out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/depth_warp.rs"]
mod tests;
