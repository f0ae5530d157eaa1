//! Dense optical flow.
//!
//! A coarse-to-fine, iterative Lucas-Kanade estimator evaluated at every pixel: each pyramid
//! level refines the upsampled field from the level above by repeatedly warping the second image
//! toward the first and solving the windowed 2x2 normal equations per pixel.
//!
//! The field maps image 1 to image 2: `image1(p) ~= image2(p + flow(p))`.

use rayon::prelude::*;

use crate::{
    effects::sample::bilinear_plane,
    foundation::{
        core::Shape,
        error::{DollyError, DollyResult},
        pixel::{Image, Sample},
    },
};

/// Pyramid levels stop once either side would drop below this many pixels.
const MIN_LEVEL_SIDE: u32 = 8;
/// Pixels whose structure tensor has a smaller eigenvalue (per window pixel) are not updated.
const MIN_EIGEN_PER_PIXEL: f32 = 1e-3;

/// Tunables for [`estimate_flow`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Number of pyramid levels including full resolution.
    pub levels: usize,
    /// Side of the square integration window (odd).
    pub window: usize,
    /// Refinement passes per level.
    pub iterations: usize,
    /// Scale between consecutive pyramid levels, in `(0, 1)`.
    pub pyr_scale: f32,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            levels: 3,
            window: 15,
            iterations: 3,
            pyr_scale: 0.5,
        }
    }
}

impl FlowParams {
    pub fn validate(&self) -> DollyResult<()> {
        if self.levels == 0 {
            return Err(DollyError::validation("flow levels must be >= 1"));
        }
        if self.window < 3 || self.window.is_multiple_of(2) {
            return Err(DollyError::validation(format!(
                "flow window must be odd and >= 3, got {}",
                self.window
            )));
        }
        if self.iterations == 0 {
            return Err(DollyError::validation("flow iterations must be >= 1"));
        }
        if !(self.pyr_scale > 0.0 && self.pyr_scale < 1.0) {
            return Err(DollyError::validation(format!(
                "flow pyr_scale must be in (0, 1), got {}",
                self.pyr_scale
            )));
        }
        Ok(())
    }
}

/// Per-pixel motion vectors `(dx, dy)` in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    shape: Shape,
    vectors: Vec<[f32; 2]>,
}

impl FlowField {
    pub fn zeros(shape: Shape) -> Self {
        Self {
            shape,
            vectors: vec![[0.0, 0.0]; shape.pixel_count()],
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn vectors(&self) -> &[[f32; 2]] {
        &self.vectors
    }

    pub fn at(&self, x: u32, y: u32) -> [f32; 2] {
        self.vectors[y as usize * self.shape.width as usize + x as usize]
    }
}

/// Luma of an image on a 0..255 scale, regardless of the sample type.
pub fn to_gray<P: Sample>(img: &Image<P>) -> Vec<f32> {
    let scale = 255.0 / P::FULL_SCALE;
    img.as_slice()
        .chunks_exact(img.channels())
        .map(|px| {
            let l = if px.len() >= 3 {
                0.299 * px[0].to_f32() + 0.587 * px[1].to_f32() + 0.114 * px[2].to_f32()
            } else {
                px[0].to_f32()
            };
            l * scale
        })
        .collect()
}

#[derive(Clone)]
struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

/// Estimate the dense flow from `a` to `b`.
#[tracing::instrument(skip(a, b), fields(shape = %a.shape()))]
pub fn estimate_flow<P: Sample>(
    a: &Image<P>,
    b: &Image<P>,
    params: &FlowParams,
) -> DollyResult<FlowField> {
    params.validate()?;
    if a.shape() != b.shape() {
        return Err(DollyError::shape_mismatch(
            "morph inputs",
            a.shape(),
            b.shape(),
        ));
    }
    if a.width() < 2 || a.height() < 2 {
        return Err(DollyError::flow(format!(
            "image {} is too small for flow estimation",
            a.shape()
        )));
    }

    let base1 = Plane {
        width: a.width() as usize,
        height: a.height() as usize,
        data: to_gray(a),
    };
    let base2 = Plane {
        data: to_gray(b),
        ..base1.clone()
    };
    let pyr1 = build_pyramid(base1, params);
    let pyr2 = build_pyramid(base2, params);
    tracing::debug!(levels = pyr1.len(), "built flow pyramids");

    let radius = params.window / 2;
    let mut flow: Option<(usize, usize, Vec<[f32; 2]>)> = None;
    for (l1, l2) in pyr1.iter().zip(&pyr2).rev() {
        let mut field = match flow.take() {
            None => vec![[0.0, 0.0]; l1.width * l1.height],
            Some((cw, ch, coarse)) => upsample_flow(&coarse, cw, ch, l1.width, l1.height),
        };
        refine_level(l1, l2, &mut field, radius, params.iterations);
        flow = Some((l1.width, l1.height, field));
    }

    let vectors = flow.map(|(_, _, f)| f).unwrap_or_default();
    if vectors.iter().any(|v| !v[0].is_finite() || !v[1].is_finite()) {
        return Err(DollyError::flow("estimated field contains non-finite vectors"));
    }
    Ok(FlowField {
        shape: a.shape(),
        vectors,
    })
}

fn build_pyramid(base: Plane, params: &FlowParams) -> Vec<Plane> {
    let mut pyr = vec![base];
    while pyr.len() < params.levels {
        let Some(prev) = pyr.last() else { break };
        let w = ((prev.width as f32) * params.pyr_scale).round() as usize;
        let h = ((prev.height as f32) * params.pyr_scale).round() as usize;
        if w < MIN_LEVEL_SIDE as usize || h < MIN_LEVEL_SIDE as usize {
            break;
        }
        let next = downscale(&blur5(prev), w, h);
        pyr.push(next);
    }
    pyr
}

/// Separable `[1 4 6 4 1] / 16` blur with edge replication.
fn blur5(p: &Plane) -> Plane {
    const K: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];
    let (w, h) = (p.width, p.height);
    let clamp = |i: isize, n: usize| i.clamp(0, n as isize - 1) as usize;

    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &p.data[y * w..(y + 1) * w];
        for x in 0..w {
            tmp[y * w + x] = K
                .iter()
                .enumerate()
                .map(|(k, wk)| wk * row[clamp(x as isize + k as isize - 2, w)])
                .sum();
        }
    }
    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            out[y * w + x] = K
                .iter()
                .enumerate()
                .map(|(k, wk)| wk * tmp[clamp(y as isize + k as isize - 2, h) * w + x])
                .sum();
        }
    }
    Plane {
        width: w,
        height: h,
        data: out,
    }
}

fn downscale(p: &Plane, w: usize, h: usize) -> Plane {
    let sx = p.width as f32 / w as f32;
    let sy = p.height as f32 / h as f32;
    let mut data = Vec::with_capacity(w * h);
    for y in 0..h {
        let fy = (y as f32 + 0.5) * sy - 0.5;
        for x in 0..w {
            let fx = (x as f32 + 0.5) * sx - 0.5;
            data.push(bilinear_plane(&p.data, p.width, p.height, fx, fy));
        }
    }
    Plane {
        width: w,
        height: h,
        data,
    }
}

fn upsample_flow(
    coarse: &[[f32; 2]],
    cw: usize,
    ch: usize,
    w: usize,
    h: usize,
) -> Vec<[f32; 2]> {
    let us: Vec<f32> = coarse.iter().map(|v| v[0]).collect();
    let vs: Vec<f32> = coarse.iter().map(|v| v[1]).collect();
    let rx = cw as f32 / w as f32;
    let ry = ch as f32 / h as f32;
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        let fy = (y as f32 + 0.5) * ry - 0.5;
        for x in 0..w {
            let fx = (x as f32 + 0.5) * rx - 0.5;
            out.push([
                bilinear_plane(&us, cw, ch, fx, fy) / rx,
                bilinear_plane(&vs, cw, ch, fx, fy) / ry,
            ]);
        }
    }
    out
}

/// Sum over a `(2r+1)^2` window with edge replication, via two running-sum passes.
fn box_sum(src: &[f32], w: usize, h: usize, r: usize) -> Vec<f32> {
    let ri = r as isize;
    let clamp = |i: isize, n: usize| i.clamp(0, n as isize - 1) as usize;

    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        let mut acc: f32 = (-ri..=ri).map(|k| row[clamp(k, w)]).sum();
        for x in 0..w {
            tmp[y * w + x] = acc;
            let xi = x as isize;
            acc += row[clamp(xi + ri + 1, w)] - row[clamp(xi - ri, w)];
        }
    }

    let mut out = vec![0.0f32; w * h];
    for x in 0..w {
        let mut acc: f32 = (-ri..=ri).map(|k| tmp[clamp(k, h) * w + x]).sum();
        for y in 0..h {
            out[y * w + x] = acc;
            let yi = y as isize;
            acc += tmp[clamp(yi + ri + 1, h) * w + x] - tmp[clamp(yi - ri, h) * w + x];
        }
    }
    out
}

fn refine_level(
    l1: &Plane,
    l2: &Plane,
    field: &mut [[f32; 2]],
    radius: usize,
    iterations: usize,
) {
    let (w, h) = (l1.width, l1.height);
    let clamp = |i: isize, n: usize| i.clamp(0, n as isize - 1) as usize;

    let mut ix = vec![0.0f32; w * h];
    let mut iy = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as isize, y as isize);
            ix[y * w + x] =
                0.5 * (l1.data[y * w + clamp(xi + 1, w)] - l1.data[y * w + clamp(xi - 1, w)]);
            iy[y * w + x] =
                0.5 * (l1.data[clamp(yi + 1, h) * w + x] - l1.data[clamp(yi - 1, h) * w + x]);
        }
    }

    let product = |a: &[f32], b: &[f32]| -> Vec<f32> { a.iter().zip(b).map(|(p, q)| p * q).collect() };
    let a11 = box_sum(&product(&ix, &ix), w, h, radius);
    let a12 = box_sum(&product(&ix, &iy), w, h, radius);
    let a22 = box_sum(&product(&iy, &iy), w, h, radius);

    let area = ((2 * radius + 1) * (2 * radius + 1)) as f32;
    let min_eigen = MIN_EIGEN_PER_PIXEL * area;
    let max_step = radius.max(1) as f32;

    for _ in 0..iterations {
        let it: Vec<f32> = field
            .par_chunks(w)
            .enumerate()
            .flat_map_iter(|(y, row)| {
                row.iter().enumerate().map(move |(x, v)| {
                    bilinear_plane(&l2.data, w, h, x as f32 + v[0], y as f32 + v[1])
                        - l1.data[y * w + x]
                })
            })
            .collect();

        let b1 = box_sum(&product(&ix, &it), w, h, radius);
        let b2 = box_sum(&product(&iy, &it), w, h, radius);

        field.par_iter_mut().enumerate().for_each(|(i, v)| {
            let (p, q, r) = (a11[i], a12[i], a22[i]);
            let det = p * r - q * q;
            let half_tr = 0.5 * (p + r);
            let lambda_min = half_tr - (half_tr * half_tr - det).max(0.0).sqrt();
            if lambda_min < min_eigen || det <= 0.0 {
                return;
            }
            let du = -(r * b1[i] - q * b2[i]) / det;
            let dv = -(p * b2[i] - q * b1[i]) / det;
            v[0] += du.clamp(-max_step, max_step);
            v[1] += dv.clamp(-max_step, max_step);
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/flow.rs"]
mod tests;
