use crate::foundation::pixel::{Image, Sample};

/// Policy for sample coordinates that fall outside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Border {
    /// Clamp to the nearest edge pixel.
    #[default]
    Replicate,
    /// Treat everything outside the image as zero.
    Constant,
}

/// Bilinearly sample every channel of `img` at `(sx, sy)` into `out`.
///
/// `out.len()` must equal `img.channels()`.
pub fn bilinear_into<P: Sample>(img: &Image<P>, sx: f32, sy: f32, border: Border, out: &mut [f32]) {
    let w = img.width() as i64;
    let h = img.height() as i64;
    let ch = img.channels();
    let data = img.as_slice();

    let (sx, sy) = match border {
        Border::Replicate => (sx.clamp(0.0, (w - 1) as f32), sy.clamp(0.0, (h - 1) as f32)),
        Border::Constant => (sx, sy),
    };

    let fx0 = sx.floor();
    let fy0 = sy.floor();
    let fx = sx - fx0;
    let fy = sy - fy0;
    let x0 = fx0 as i64;
    let y0 = fy0 as i64;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    out.fill(0.0);
    for (x, y, wgt) in taps {
        if wgt == 0.0 {
            continue;
        }
        let (x, y) = match border {
            Border::Replicate => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            Border::Constant => {
                if x < 0 || y < 0 || x >= w || y >= h {
                    continue;
                }
                (x, y)
            }
        };
        let base = (y as usize * w as usize + x as usize) * ch;
        for (c, o) in out.iter_mut().enumerate() {
            *o += data[base + c].to_f32() * wgt;
        }
    }
}

/// Bilinearly sample a single-channel `f32` plane with edge replication.
pub fn bilinear_plane(plane: &[f32], width: usize, height: usize, sx: f32, sy: f32) -> f32 {
    let sx = sx.clamp(0.0, (width - 1) as f32);
    let sy = sy.clamp(0.0, (height - 1) as f32);
    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let top = plane[y0 * width + x0] * (1.0 - fx) + plane[y0 * width + x1] * fx;
    let bottom = plane[y1 * width + x0] * (1.0 - fx) + plane[y1 * width + x1] * fx;
    top * (1.0 - fy) + bottom * fy
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sample.rs"]
mod tests;
