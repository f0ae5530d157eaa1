//! Panodolly synthesizes short transition clips between pairs of equirectangular panoramas.
//!
//! Each transition blends a source panorama into a destination panorama over a fixed number of
//! frames, optionally displacing both by their depth maps to fake a forward dolly:
//!
//! - Build a [`TransitionPair`] from two images and their depth maps
//! - Create a [`Synthesizer`] with [`SynthOpts`] and pull frames from it
//! - Or run the whole directory-level flow with [`generate_all_transitions`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod batch;
pub mod config;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod pairs;
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, Shape};
pub use crate::foundation::error::{DollyError, DollyResult};
pub use crate::foundation::pixel::{DepthMap, Image, Sample};

pub use crate::animation::ease::{Ease, ease, progress};
pub use crate::batch::{BatchReport, TransitionOutput, generate_all_transitions, generate_transition};
pub use crate::config::TransitionConfig;
pub use crate::effects::depth_warp::{WarpDirection, depth_warp};
pub use crate::effects::mask::{MaskStyle, TransitionMask, generate_mask};
pub use crate::effects::morph::{Morpher, morph};
pub use crate::encode::ffmpeg::{EncoderCapabilities, FfmpegSink, VideoOpts};
pub use crate::encode::sequence::{ImageSequenceSink, SequenceFormat, SequenceOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::pairs::discovery::{TransitionJob, find_transition_pairs};
pub use crate::render::pipeline::{RenderStats, RenderThreading, render_frames, render_to_sinks};
pub use crate::render::synth::{
    BlendMode, MorphFallback, SynthOpts, SynthPhase, Synthesizer, TransitionPair, synthesize,
    synthesize_with,
};
