/// Easing curves and frame-to-progress mapping.
pub mod ease;
