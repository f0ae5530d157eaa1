use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    animation::ease::Ease,
    effects::{flow::FlowParams, mask::MaskStyle},
    encode::{ffmpeg::VideoOpts, sequence::SequenceOpts},
    foundation::error::{DollyError, DollyResult},
    render::{
        pipeline::RenderThreading,
        synth::{BlendMode, DEFAULT_FRAME_COUNT, MorphFallback, SynthOpts},
    },
};

/// Settings for a batch of transitions.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub frames: u64,
    pub mode: BlendMode,
    pub mask: MaskStyle,
    pub ease: Ease,
    pub morph_fallback: MorphFallback,
    pub sequence: SequenceOpts,
    pub video: VideoOpts,
    pub threading: RenderThreading,
    pub flow: FlowParams,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAME_COUNT,
            mode: BlendMode::default(),
            mask: MaskStyle::default(),
            ease: Ease::default(),
            morph_fallback: MorphFallback::default(),
            sequence: SequenceOpts::default(),
            video: VideoOpts::default(),
            threading: RenderThreading::default(),
            flow: FlowParams::default(),
        }
    }
}

impl TransitionConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> DollyResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| DollyError::serde(format!("parse transition config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DollyResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open config JSON '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> DollyResult<()> {
        if self.frames < 1 {
            return Err(DollyError::DegenerateFrameCount(self.frames));
        }
        if !(1..=100).contains(&self.sequence.jpeg_quality) {
            return Err(DollyError::validation(format!(
                "sequence jpeg_quality must be in 1..=100, got {}",
                self.sequence.jpeg_quality
            )));
        }
        if let Some(q) = self.video.quality
            && q > 10
        {
            return Err(DollyError::validation(format!(
                "video quality must be in 0..=10, got {q}"
            )));
        }
        self.video.fps()?;
        if self.threading.threads == Some(0) {
            return Err(DollyError::validation(
                "threading.threads must be >= 1 when set",
            ));
        }
        self.flow.validate()
    }

    /// Synthesis options for one pair.
    pub fn synth_opts(&self) -> SynthOpts {
        SynthOpts {
            frame_count: self.frames,
            mode: self.mode,
            mask: self.mask,
            ease: self.ease,
            flow: self.flow,
            morph_fallback: self.morph_fallback,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
