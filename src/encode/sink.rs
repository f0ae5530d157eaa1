use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{DollyError, DollyResult};
use crate::foundation::pixel::{Image, Sample};

/// Configuration provided to a [`FrameSink`] before the first frame of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Transition display name, used for output naming.
    pub name: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Samples per pixel.
    pub channels: usize,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
    /// Playback rate for sinks that produce video.
    pub fps: Fps,
}

/// Sink contract for consuming synthesized frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, starting
/// at 0.
pub trait FrameSink<P = u8>: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> DollyResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Image<P>) -> DollyResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> DollyResult<()>;
}

/// Reject frames that arrive out of order or with the wrong geometry.
pub(crate) fn check_frame<P: Sample>(
    cfg: &SinkConfig,
    last: Option<FrameIndex>,
    idx: FrameIndex,
    frame: &Image<P>,
) -> DollyResult<()> {
    if let Some(last) = last
        && idx.0 <= last.0
    {
        return Err(DollyError::encode(format!(
            "sink received out-of-order frame index {} after {}",
            idx.0, last.0
        )));
    }
    if frame.width() != cfg.width || frame.height() != cfg.height {
        return Err(DollyError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            cfg.width,
            cfg.height
        )));
    }
    if frame.channels() != cfg.channels {
        return Err(DollyError::validation(format!(
            "frame has {} channels, expected {}",
            frame.channels(),
            cfg.channels
        )));
    }
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug)]
pub struct InMemorySink<P = u8> {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Image<P>)>,
    finished: bool,
}

impl<P> Default for InMemorySink<P> {
    fn default() -> Self {
        Self {
            cfg: None,
            frames: Vec::new(),
            finished: false,
        }
    }
}

impl<P: Sample> InMemorySink<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Image<P>)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<P: Sample> FrameSink<P> for InMemorySink<P> {
    fn begin(&mut self, cfg: SinkConfig) -> DollyResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image<P>) -> DollyResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| DollyError::encode("in-memory sink not started"))?;
        check_frame(cfg, self.frames.last().map(|(i, _)| *i), idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> DollyResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
