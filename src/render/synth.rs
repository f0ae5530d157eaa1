use std::borrow::Cow;

use crate::{
    animation::ease::Ease,
    effects::{
        composite::{composite_masked, crossfade},
        depth_warp::{WarpDirection, depth_warp},
        flow::FlowParams,
        mask::{MaskStyle, generate_mask},
        morph::Morpher,
    },
    foundation::{
        core::FrameIndex,
        error::{DollyError, DollyResult},
        pixel::{DepthMap, Image, Sample},
    },
};

/// Default number of frames in one transition (one second at 30 fps).
pub const DEFAULT_FRAME_COUNT: u64 = 30;

/// How source and destination are combined per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlendMode {
    /// Uniform linear blend, depth maps ignored.
    Crossfade,
    /// Depth-proportional parallax on both ends, blended through a mask.
    #[default]
    DepthWarp,
    /// Optical-flow morph.
    Morph,
    /// Source until the midpoint, destination afterwards.
    Cut,
}

impl BlendMode {
    /// Parse a mode name. Unknown names degrade to [`BlendMode::Cut`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "crossfade" => Self::Crossfade,
            "depth_warp" | "depth-warp" | "depthwarp" => Self::DepthWarp,
            "morph" => Self::Morph,
            "cut" | "hard_cut" => Self::Cut,
            other => {
                tracing::warn!(mode = other, "unknown blend mode, falling back to hard cut");
                Self::Cut
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crossfade => "crossfade",
            Self::DepthWarp => "depth_warp",
            Self::Morph => "morph",
            Self::Cut => "cut",
        }
    }
}

impl From<String> for BlendMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<BlendMode> for String {
    fn from(m: BlendMode) -> Self {
        m.as_str().to_string()
    }
}

/// What to do when a morph cannot estimate its flow field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphFallback {
    /// Fail the transition.
    #[default]
    Abort,
    /// Render the whole transition as a crossfade instead.
    Crossfade,
}

/// Start and end state of one transition.
///
/// Each image must match its own depth map's dimensions; the two images are checked against each
/// other only by modes that blend them.
#[derive(Clone, Debug)]
pub struct TransitionPair<P = u8, D = u8> {
    source: Image<P>,
    source_depth: DepthMap<D>,
    dest: Image<P>,
    dest_depth: DepthMap<D>,
}

impl<P: Sample, D: Sample> TransitionPair<P, D> {
    pub fn new(
        source: Image<P>,
        source_depth: DepthMap<D>,
        dest: Image<P>,
        dest_depth: DepthMap<D>,
    ) -> DollyResult<Self> {
        if source_depth.shape() != source.shape() {
            return Err(DollyError::shape_mismatch(
                "source depth vs source image",
                source.shape(),
                source_depth.shape(),
            ));
        }
        if dest_depth.shape() != dest.shape() {
            return Err(DollyError::shape_mismatch(
                "destination depth vs destination image",
                dest.shape(),
                dest_depth.shape(),
            ));
        }
        Ok(Self {
            source,
            source_depth,
            dest,
            dest_depth,
        })
    }

    pub fn source(&self) -> &Image<P> {
        &self.source
    }

    pub fn source_depth(&self) -> &DepthMap<D> {
        &self.source_depth
    }

    pub fn dest(&self) -> &Image<P> {
        &self.dest
    }

    pub fn dest_depth(&self) -> &DepthMap<D> {
        &self.dest_depth
    }
}

/// Options for one transition.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthOpts {
    pub frame_count: u64,
    pub mode: BlendMode,
    /// Mask used by [`BlendMode::DepthWarp`].
    pub mask: MaskStyle,
    pub ease: Ease,
    pub flow: FlowParams,
    pub morph_fallback: MorphFallback,
}

impl Default for SynthOpts {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            mode: BlendMode::default(),
            mask: MaskStyle::default(),
            ease: Ease::default(),
            flow: FlowParams::default(),
            morph_fallback: MorphFallback::default(),
        }
    }
}

/// Progress of a [`Frames`] iterator through one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthPhase {
    /// No frame produced yet.
    Initializing,
    /// Displacing the end images for the current frame.
    Warping,
    /// Blending the displaced images into the current frame.
    Compositing,
    /// Every frame has been produced, or a frame failed.
    Done,
}

enum Plan {
    Crossfade,
    DepthWarp,
    Morph(Morpher),
    Cut,
}

enum Stage<'a, P: Sample> {
    Blend {
        a: Cow<'a, Image<P>>,
        b: Cow<'a, Image<P>>,
        mask: Option<MaskStyle>,
    },
    Final(Cow<'a, Image<P>>),
}

/// Renders the frames of one [`TransitionPair`].
///
/// Any per-pair precomputation (the morph flow field) happens once in [`Synthesizer::new`];
/// afterwards frames can be rendered in any order, from any thread.
pub struct Synthesizer<'a, P = u8, D = u8> {
    pair: &'a TransitionPair<P, D>,
    opts: SynthOpts,
    plan: Plan,
}

impl<'a, P: Sample, D: Sample> Synthesizer<'a, P, D> {
    #[tracing::instrument(skip(pair), fields(mode = opts.mode.as_str(), frames = opts.frame_count))]
    pub fn new(pair: &'a TransitionPair<P, D>, opts: SynthOpts) -> DollyResult<Self> {
        if opts.frame_count < 1 {
            return Err(DollyError::DegenerateFrameCount(opts.frame_count));
        }
        if opts.mode != BlendMode::Cut {
            let (a, b) = (pair.source(), pair.dest());
            if a.shape() != b.shape() {
                return Err(DollyError::shape_mismatch(
                    "destination image vs source image",
                    a.shape(),
                    b.shape(),
                ));
            }
            if a.channels() != b.channels() {
                return Err(DollyError::validation(format!(
                    "source has {} channels, destination has {}",
                    a.channels(),
                    b.channels()
                )));
            }
        }

        let plan = match opts.mode {
            BlendMode::Crossfade => Plan::Crossfade,
            BlendMode::DepthWarp => Plan::DepthWarp,
            BlendMode::Cut => Plan::Cut,
            BlendMode::Morph => match Morpher::prepare(pair.source(), pair.dest(), &opts.flow) {
                Ok(m) => Plan::Morph(m),
                Err(err) if opts.morph_fallback == MorphFallback::Crossfade => {
                    tracing::warn!(error = %err, "flow estimation failed, rendering as crossfade");
                    Plan::Crossfade
                }
                Err(err) => return Err(err),
            },
        };

        Ok(Self { pair, opts, plan })
    }

    pub fn pair(&self) -> &'a TransitionPair<P, D> {
        self.pair
    }

    pub fn opts(&self) -> &SynthOpts {
        &self.opts
    }

    pub fn frame_count(&self) -> u64 {
        self.opts.frame_count
    }

    /// Eased progress of frame `idx`.
    pub fn progress_at(&self, idx: FrameIndex) -> f32 {
        self.opts.ease.at(idx, self.opts.frame_count) as f32
    }

    /// Render frame `idx` (must be below the frame count).
    pub fn render_frame(&self, idx: FrameIndex) -> DollyResult<Image<P>> {
        let stage = self.displace(idx)?;
        self.compose(stage, self.progress_at(idx))
    }

    /// Lazily render every frame in ascending index order.
    pub fn frames(&self) -> Frames<'_, 'a, P, D> {
        Frames {
            synth: self,
            next: 0,
            phase: SynthPhase::Initializing,
        }
    }

    fn displace(&self, idx: FrameIndex) -> DollyResult<Stage<'_, P>> {
        if idx.0 >= self.opts.frame_count {
            return Err(DollyError::validation(format!(
                "frame {} out of range for a {}-frame transition",
                idx.0, self.opts.frame_count
            )));
        }
        let eased = self.progress_at(idx);
        let pair = self.pair;

        Ok(match &self.plan {
            Plan::Crossfade => Stage::Blend {
                a: Cow::Borrowed(pair.source()),
                b: Cow::Borrowed(pair.dest()),
                mask: None,
            },
            Plan::DepthWarp => Stage::Blend {
                a: Cow::Owned(depth_warp(
                    pair.source(),
                    pair.source_depth(),
                    eased,
                    WarpDirection::Forward,
                )?),
                b: Cow::Owned(depth_warp(
                    pair.dest(),
                    pair.dest_depth(),
                    1.0 - eased,
                    WarpDirection::Backward,
                )?),
                mask: Some(self.opts.mask),
            },
            Plan::Morph(m) => Stage::Final(Cow::Owned(m.frame_at(
                pair.source(),
                pair.dest(),
                eased,
            )?)),
            Plan::Cut => Stage::Final(Cow::Borrowed(if eased < 0.5 {
                pair.source()
            } else {
                pair.dest()
            })),
        })
    }

    fn compose(&self, stage: Stage<'_, P>, eased: f32) -> DollyResult<Image<P>> {
        match stage {
            Stage::Final(img) => Ok(img.into_owned()),
            Stage::Blend { a, b, mask: None } => crossfade(&a, &b, eased),
            Stage::Blend {
                a,
                b,
                mask: Some(style),
            } => {
                let mask = generate_mask(a.shape(), eased, style);
                composite_masked(&a, &b, &mask)
            }
        }
    }
}

/// Iterator over the frames of a [`Synthesizer`], stopping after the first error.
pub struct Frames<'s, 'a, P = u8, D = u8> {
    synth: &'s Synthesizer<'a, P, D>,
    next: u64,
    phase: SynthPhase,
}

impl<P: Sample, D: Sample> Frames<'_, '_, P, D> {
    pub fn phase(&self) -> SynthPhase {
        self.phase
    }
}

impl<P: Sample, D: Sample> Iterator for Frames<'_, '_, P, D> {
    type Item = DollyResult<Image<P>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == SynthPhase::Done {
            return None;
        }
        if self.next >= self.synth.frame_count() {
            self.phase = SynthPhase::Done;
            return None;
        }

        let idx = FrameIndex(self.next);
        self.phase = SynthPhase::Warping;
        let stage = match self.synth.displace(idx) {
            Ok(s) => s,
            Err(e) => {
                self.phase = SynthPhase::Done;
                return Some(Err(e));
            }
        };

        self.phase = SynthPhase::Compositing;
        let frame = self.synth.compose(stage, self.synth.progress_at(idx));
        if frame.is_err() {
            self.phase = SynthPhase::Done;
        }
        self.next += 1;
        tracing::trace!(frame = idx.0, "synthesized frame");
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.phase == SynthPhase::Done {
            return (0, Some(0));
        }
        let left = self.synth.frame_count().saturating_sub(self.next) as usize;
        (0, Some(left))
    }
}

/// Render every frame of `pair` with `opts`, in order.
#[tracing::instrument(skip(pair))]
pub fn synthesize_with<P: Sample, D: Sample>(
    pair: &TransitionPair<P, D>,
    opts: &SynthOpts,
) -> DollyResult<Vec<Image<P>>> {
    Synthesizer::new(pair, opts.clone())?.frames().collect()
}

/// Render `frame_count` frames of `pair` in `mode` with default mask, easing and flow settings.
pub fn synthesize<P: Sample, D: Sample>(
    pair: &TransitionPair<P, D>,
    frame_count: u64,
    mode: BlendMode,
) -> DollyResult<Vec<Image<P>>> {
    synthesize_with(
        pair,
        &SynthOpts {
            frame_count,
            mode,
            ..SynthOpts::default()
        },
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/synth.rs"]
mod tests;
