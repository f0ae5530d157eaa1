//! Dense pixel grids consumed and produced by the transition core.
//!
//! Both grids are row-major and tightly packed. [`Image`] is interleaved (`channels` samples per
//! pixel); [`DepthMap`] is single-channel with the convention `0 = farthest`,
//! `full scale = nearest`.

use crate::foundation::{
    core::Shape,
    error::{DollyError, DollyResult},
};

/// A numeric pixel sample that can be linearly interpolated.
///
/// All arithmetic in the core happens in `f32`; samples are converted on read and converted back
/// (rounded and saturated for integer types) on write.
pub trait Sample: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Value representing "full intensity" (used to normalize depth to `[0, 1]`).
    const FULL_SCALE: f32;

    fn to_f32(self) -> f32;

    fn from_f32(v: f32) -> Self;
}

impl Sample for u8 {
    const FULL_SCALE: f32 = 255.0;

    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }
}

impl Sample for u16 {
    const FULL_SCALE: f32 = 65535.0;

    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0.0, 65535.0) as u16
    }
}

impl Sample for f32 {
    const FULL_SCALE: f32 = 1.0;

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(v: f32) -> Self {
        v
    }
}

/// An interleaved multi-channel image (RGB by convention).
#[derive(Clone, Debug, PartialEq)]
pub struct Image<P = u8> {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<P>,
}

impl<P: Sample> Image<P> {
    /// Wrap a packed buffer of `width * height * channels` samples.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<P>) -> DollyResult<Self> {
        if channels == 0 {
            return Err(DollyError::validation("image must have at least one channel"));
        }
        let expected = Shape::new(width, height).pixel_count() * channels;
        if data.len() != expected {
            return Err(DollyError::validation(format!(
                "image buffer has {} samples, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// An image where every pixel equals `pixel`.
    pub fn filled(width: u32, height: u32, pixel: &[P]) -> DollyResult<Self> {
        let n = Shape::new(width, height).pixel_count();
        let mut data = Vec::with_capacity(n * pixel.len());
        for _ in 0..n {
            data.extend_from_slice(pixel);
        }
        Self::new(width, height, pixel.len(), data)
    }

    /// Build an image by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(
        width: u32,
        height: u32,
        channels: usize,
        mut f: impl FnMut(u32, u32, usize) -> P,
    ) -> DollyResult<Self> {
        let mut data = Vec::with_capacity(Shape::new(width, height).pixel_count() * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height)
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<P> {
        self.data
    }

    /// Samples of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[P] {
        let i = (y as usize * self.width as usize + x as usize) * self.channels;
        &self.data[i..i + self.channels]
    }

    /// Same dimensions and channel count.
    pub fn same_layout(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.channels == other.channels
    }
}

/// A single-channel depth map co-registered with an [`Image`].
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap<P = u8> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

impl<P: Sample> DepthMap<P> {
    pub fn new(width: u32, height: u32, data: Vec<P>) -> DollyResult<Self> {
        let expected = Shape::new(width, height).pixel_count();
        if data.len() != expected {
            return Err(DollyError::validation(format!(
                "depth buffer has {} samples, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, value: P) -> Self {
        Self {
            width,
            height,
            data: vec![value; Shape::new(width, height).pixel_count()],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> P) -> Self {
        let mut data = Vec::with_capacity(Shape::new(width, height).pixel_count());
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height)
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    /// Depth at `(x, y)` normalized to `[0, 1]`, where 1 is nearest.
    pub fn nearness(&self, x: u32, y: u32) -> f32 {
        let v = self.data[y as usize * self.width as usize + x as usize];
        (v.to_f32() / P::FULL_SCALE).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pixel.rs"]
mod tests;
