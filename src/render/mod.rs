//! Transition synthesis and the frame pipeline that feeds sinks.

/// Chunked, optionally parallel rendering into [`crate::encode::sink::FrameSink`]s.
pub mod pipeline;
/// Per-pair frame synthesis.
pub mod synth;
