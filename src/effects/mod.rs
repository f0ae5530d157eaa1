//! Per-frame image operations.
//!
//! Everything here is a pure function of its inputs (or of a value prepared once, like a
//! [`morph::Morpher`]) and is safe to call from many threads at once.

pub mod composite;
pub mod depth_warp;
pub mod flow;
pub mod mask;
pub mod morph;
/// Bilinear sampling helpers.
pub mod sample;
