//! Core value types shared by every stage: frame indices, shapes, pixel buffers and errors.

pub mod core;
pub mod error;
pub mod pixel;
