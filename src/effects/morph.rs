use crate::{
    effects::{
        flow::{FlowField, FlowParams, estimate_flow},
        sample::{Border, bilinear_into},
    },
    foundation::{
        error::{DollyError, DollyResult},
        pixel::{Image, Sample},
    },
};

/// Flow-based morph between a fixed pair of images.
///
/// The flow field depends only on the two end images, so it is estimated once in
/// [`Morpher::prepare`] and reused for every `t`.
#[derive(Clone, Debug)]
pub struct Morpher {
    flow: FlowField,
}

impl Morpher {
    pub fn prepare<P: Sample>(a: &Image<P>, b: &Image<P>, params: &FlowParams) -> DollyResult<Self> {
        Ok(Self {
            flow: estimate_flow(a, b, params)?,
        })
    }

    pub fn from_flow(flow: FlowField) -> Self {
        Self { flow }
    }

    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    /// Intermediate frame at `t` in `[0, 1]`.
    ///
    /// `a` is pulled forward along `t * flow`, `b` backward along `(1 - t) * flow`, and the two
    /// are blended with weights `(1 - t, t)`. Samples falling outside an image read as zero.
    pub fn frame_at<P: Sample>(&self, a: &Image<P>, b: &Image<P>, t: f32) -> DollyResult<Image<P>> {
        if a.shape() != self.flow.shape() || b.shape() != self.flow.shape() {
            return Err(DollyError::shape_mismatch(
                "morph inputs vs flow field",
                self.flow.shape(),
                if a.shape() != self.flow.shape() {
                    a.shape()
                } else {
                    b.shape()
                },
            ));
        }
        if a.channels() != b.channels() {
            return Err(DollyError::validation("morph inputs differ in channel count"));
        }

        let t = t.clamp(0.0, 1.0);
        let ch = a.channels();
        let mut pa = vec![0.0f32; ch];
        let mut pb = vec![0.0f32; ch];
        let mut out = Vec::with_capacity(a.as_slice().len());
        for y in 0..a.height() {
            for x in 0..a.width() {
                let [u, v] = self.flow.at(x, y);
                let (xf, yf) = (x as f32, y as f32);
                bilinear_into(a, xf + u * t, yf + v * t, Border::Constant, &mut pa);
                bilinear_into(
                    b,
                    xf - u * (1.0 - t),
                    yf - v * (1.0 - t),
                    Border::Constant,
                    &mut pb,
                );
                out.extend(
                    pa.iter()
                        .zip(&pb)
                        .map(|(&s, &d)| P::from_f32(s * (1.0 - t) + d * t)),
                );
            }
        }
        Image::new(a.width(), a.height(), ch, out)
    }
}

/// One-shot morph: estimates flow and renders a single frame at `t`.
///
/// Prefer [`Morpher`] when rendering more than one frame of the same pair.
pub fn morph<P: Sample>(
    a: &Image<P>,
    b: &Image<P>,
    t: f32,
    params: &FlowParams,
) -> DollyResult<Image<P>> {
    Morpher::prepare(a, b, params)?.frame_at(a, b, t)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/morph.rs"]
mod tests;
