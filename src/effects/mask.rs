use crate::foundation::core::Shape;

/// Half-width of the soft edge on wipe and radial reveals, in normalized units.
const SOFT_EDGE: f32 = 0.1;
/// Radial reveal radius grows this much faster than progress so it reaches the corners.
const RADIAL_SPEED: f32 = 1.5;

/// Spatial pattern of the blend between source and destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaskStyle {
    /// Uniform dissolve.
    #[default]
    Fade,
    /// Soft-edged left-to-right reveal.
    ///
    /// The weight at normalized column `x` follows `progress - x`, so the destination appears
    /// on the left edge first and the right edge last.
    Wipe,
    /// Soft-edged circular reveal growing from the image center.
    Radial,
}

impl MaskStyle {
    /// Parse a style name. Unknown names fall back to [`MaskStyle::Fade`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fade" => Self::Fade,
            "wipe" => Self::Wipe,
            "radial" => Self::Radial,
            other => {
                tracing::warn!(style = other, "unknown mask style, falling back to fade");
                Self::Fade
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Wipe => "wipe",
            Self::Radial => "radial",
        }
    }
}

impl From<String> for MaskStyle {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<MaskStyle> for String {
    fn from(s: MaskStyle) -> Self {
        s.as_str().to_string()
    }
}

/// Per-pixel blend weights in `[0, 1]`: 0 keeps the source frame, 1 shows the destination.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionMask {
    shape: Shape,
    weights: Vec<f32>,
}

impl TransitionMask {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.weights[y as usize * self.shape.width as usize + x as usize]
    }
}

/// Build the blend-weight field for `progress` in the given `style`.
pub fn generate_mask(shape: Shape, progress: f32, style: MaskStyle) -> TransitionMask {
    let w = shape.width as usize;
    let h = shape.height as usize;
    let weights = match style {
        MaskStyle::Fade => vec![progress; shape.pixel_count()],
        MaskStyle::Wipe => {
            let denom = w.saturating_sub(1).max(1) as f32;
            let row: Vec<f32> = (0..w)
                .map(|x| soft_step(progress - x as f32 / denom))
                .collect();
            let mut weights = Vec::with_capacity(shape.pixel_count());
            for _ in 0..h {
                weights.extend_from_slice(&row);
            }
            weights
        }
        MaskStyle::Radial => {
            let cx = w as f32 / 2.0;
            let cy = h as f32 / 2.0;
            let max_dist = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
            let mut weights = Vec::with_capacity(shape.pixel_count());
            for y in 0..h {
                let dy = y as f32 - cy;
                for x in 0..w {
                    let dx = x as f32 - cx;
                    let dist = (dx * dx + dy * dy).sqrt() / max_dist;
                    weights.push(soft_step(progress * RADIAL_SPEED - dist));
                }
            }
            weights
        }
    };
    TransitionMask { shape, weights }
}

/// Ramp from 0 to 1 across `[-SOFT_EDGE, SOFT_EDGE]`.
fn soft_step(v: f32) -> f32 {
    ((v + SOFT_EDGE) / (2.0 * SOFT_EDGE)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask.rs"]
mod tests;
