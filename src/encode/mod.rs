//! Frame sinks.
//!
//! Sinks consume synthesized frames in ascending index order.

/// `ffmpeg`-based video sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Numbered still images on disk.
pub mod sequence;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
