use crate::foundation::core::FrameIndex;

/// Easing curves used to map raw transition progress to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in/out.
    #[default]
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Eased progress of frame `idx` out of `frame_count`.
    pub fn at(self, idx: FrameIndex, frame_count: u64) -> f64 {
        self.apply(progress(idx, frame_count))
    }
}

/// Raw linear progress `idx / (frame_count - 1)`.
///
/// A single-frame (or empty) transition has progress 0. Indices past the end clamp to 1.
pub fn progress(idx: FrameIndex, frame_count: u64) -> f64 {
    if frame_count <= 1 {
        return 0.0;
    }
    let last = frame_count - 1;
    idx.0.min(last) as f64 / last as f64
}

/// Cubic ease-in/out progress for frame `frame_index` of `frame_count`.
pub fn ease(frame_index: u64, frame_count: u64) -> f64 {
    Ease::InOutCubic.at(FrameIndex(frame_index), frame_count)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
