use crate::{
    effects::mask::TransitionMask,
    foundation::{
        error::{DollyError, DollyResult},
        pixel::{Image, Sample},
    },
};

fn ensure_same_layout<P: Sample>(a: &Image<P>, b: &Image<P>, what: &'static str) -> DollyResult<()> {
    if a.same_layout(b) {
        return Ok(());
    }
    if a.shape() != b.shape() {
        return Err(DollyError::shape_mismatch(what, a.shape(), b.shape()));
    }
    if a.channels() != b.channels() {
        return Err(DollyError::validation(format!(
            "{what}: channel count differs ({} vs {})",
            a.channels(),
            b.channels()
        )));
    }
    Ok(())
}

/// Uniform linear blend `a * (1 - t) + b * t`.
pub fn crossfade<P: Sample>(a: &Image<P>, b: &Image<P>, t: f32) -> DollyResult<Image<P>> {
    ensure_same_layout(a, b, "crossfade inputs")?;
    let t = t.clamp(0.0, 1.0);
    let data = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&av, &bv)| P::from_f32(av.to_f32() * (1.0 - t) + bv.to_f32() * t))
        .collect();
    Image::new(a.width(), a.height(), a.channels(), data)
}

/// Per-pixel blend `a * (1 - mask) + b * mask`, applied to every channel.
pub fn composite_masked<P: Sample>(
    a: &Image<P>,
    b: &Image<P>,
    mask: &TransitionMask,
) -> DollyResult<Image<P>> {
    ensure_same_layout(a, b, "composite inputs")?;
    if mask.shape() != a.shape() {
        return Err(DollyError::shape_mismatch(
            "mask vs frame",
            a.shape(),
            mask.shape(),
        ));
    }

    let ch = a.channels();
    let mut data = Vec::with_capacity(a.as_slice().len());
    for ((pa, pb), &m) in a
        .as_slice()
        .chunks_exact(ch)
        .zip(b.as_slice().chunks_exact(ch))
        .zip(mask.weights())
    {
        for (&av, &bv) in pa.iter().zip(pb) {
            data.push(P::from_f32(av.to_f32() * (1.0 - m) + bv.to_f32() * m));
        }
    }
    Image::new(a.width(), a.height(), ch, data)
}

/// Source until the midpoint, destination afterwards.
pub fn hard_cut<P: Sample>(a: &Image<P>, b: &Image<P>, t: f32) -> Image<P> {
    if t < 0.5 { a.clone() } else { b.clone() }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
