use crate::foundation::core::Shape;

/// Convenience result type used across panodolly.
pub type DollyResult<T> = Result<T, DollyError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DollyError {
    /// Invalid user-provided options or buffers.
    #[error("validation error: {0}")]
    Validation(String),

    /// Two grids that must be co-registered have different dimensions.
    #[error("input shape mismatch: {what}: expected {expected}, got {actual}")]
    InputShapeMismatch {
        /// Which pair of inputs disagreed.
        what: &'static str,
        /// Shape of the reference input.
        expected: Shape,
        /// Shape of the offending input.
        actual: Shape,
    },

    /// A transition was requested with fewer than one frame.
    #[error("degenerate frame count: {0} (must be >= 1)")]
    DegenerateFrameCount(u64),

    /// The dense correspondence field for a morph could not be computed.
    #[error("flow estimation failed: {0}")]
    FlowEstimation(String),

    /// An optional capability (e.g. the `ffmpeg` encoder) is not present on this system.
    #[error("feature unavailable: {0}")]
    Unavailable(String),

    /// Errors while writing frames to an output sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing config and metadata.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DollyError {
    /// Build a [`DollyError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DollyError::InputShapeMismatch`] value.
    pub fn shape_mismatch(what: &'static str, expected: Shape, actual: Shape) -> Self {
        Self::InputShapeMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Build a [`DollyError::FlowEstimation`] value.
    pub fn flow(msg: impl Into<String>) -> Self {
        Self::FlowEstimation(msg.into())
    }

    /// Build a [`DollyError::Unavailable`] value.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Build a [`DollyError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`DollyError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
