use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{DollyError, DollyResult};
use crate::foundation::pixel::Image;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Optional capabilities detected once at startup and passed down as plain values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderCapabilities {
    /// The `ffmpeg` binary can be invoked from `PATH`.
    pub ffmpeg: bool,
}

impl EncoderCapabilities {
    /// Detect optional encoders on this system.
    pub fn detect() -> Self {
        let caps = Self {
            ffmpeg: is_ffmpeg_on_path(),
        };
        tracing::debug!(ffmpeg = caps.ffmpeg, "detected encoder capabilities");
        caps
    }
}

/// Video encoding options.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoOpts {
    pub enabled: bool,
    /// Integer playback rate.
    pub fps: u32,
    /// `ffmpeg` video codec name.
    pub codec: String,
    /// Quality on a 0..=10 scale (10 is best); `None` leaves the codec default.
    pub quality: Option<u8>,
    /// Output pixel format.
    pub pixel_format: String,
    /// Overwrite existing output files.
    pub overwrite: bool,
}

impl Default for VideoOpts {
    fn default() -> Self {
        Self {
            enabled: true,
            fps: 30,
            codec: "libx264".to_string(),
            quality: Some(8),
            pixel_format: "yuv420p".to_string(),
            overwrite: true,
        }
    }
}

impl VideoOpts {
    pub fn fps(&self) -> DollyResult<Fps> {
        Fps::integer(self.fps)
    }

    /// Whether frames of `width x height` can be encoded with the configured pixel format.
    ///
    /// `yuv420p` subsamples chroma 2x2, so both sides must be even.
    pub fn accepts_size(&self, width: u32, height: u32) -> bool {
        self.pixel_format != "yuv420p" || (width.is_multiple_of(2) && height.is_multiple_of(2))
    }

    /// Codec arguments for the configured quality.
    ///
    /// x264 takes a CRF in `0..=51`; other codecs take `-qscale:v` in `1..=31`.
    pub fn quality_args(&self) -> Vec<String> {
        let Some(q) = self.quality else {
            return Vec::new();
        };
        let loss = 1.0 - f64::from(q.min(10)) / 10.0;
        if self.codec == "libx264" {
            vec!["-crf".to_string(), ((loss * 51.0) as u32).to_string()]
        } else {
            vec!["-qscale:v".to_string(), (1 + (loss * 30.0) as u32).to_string()]
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    out_path: PathBuf,
    opts: VideoOpts,
    caps: EncoderCapabilities,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(out_path: impl Into<PathBuf>, opts: VideoOpts, caps: EncoderCapabilities) -> Self {
        Self {
            out_path: out_path.into(),
            opts,
            caps,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Full `ffmpeg` argument list for a stream described by `cfg`.
    pub fn command_args(&self, cfg: &SinkConfig) -> DollyResult<Vec<String>> {
        let pix_in = match cfg.channels {
            1 => "gray",
            3 => "rgb24",
            4 => "rgba",
            n => {
                return Err(DollyError::validation(format!(
                    "ffmpeg sink cannot encode {n}-channel frames"
                )));
            }
        };

        let mut args: Vec<String> = vec![
            if self.opts.overwrite { "-y" } else { "-n" }.to_string(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            pix_in.into(),
            "-s".into(),
            format!("{}x{}", cfg.width, cfg.height),
            // For rawvideo input, `-r` before `-i` sets the input framerate.
            "-r".into(),
            format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i".into(),
            "pipe:0".into(),
            "-an".into(),
            "-c:v".into(),
            self.opts.codec.clone(),
        ];
        args.extend(self.opts.quality_args());
        args.extend([
            "-pix_fmt".to_string(),
            self.opts.pixel_format.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]);
        args.push(self.out_path.to_string_lossy().into_owned());
        Ok(args)
    }
}

impl FrameSink<u8> for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> DollyResult<()> {
        if !self.caps.ffmpeg {
            return Err(DollyError::unavailable(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(DollyError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !self.opts.accepts_size(cfg.width, cfg.height) {
            return Err(DollyError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        ensure_parent_dir(&self.out_path)?;
        if !self.opts.overwrite && self.out_path.exists() {
            return Err(DollyError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }

        let args = self.command_args(&cfg)?;
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DollyError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DollyError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DollyError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image<u8>) -> DollyResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| DollyError::encode("ffmpeg sink not started"))?;
        check_frame(cfg, self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(DollyError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(frame.as_slice()).map_err(|e| {
            DollyError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> DollyResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| DollyError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| DollyError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| DollyError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| DollyError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(DollyError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(path = %self.out_path.display(), "video encoded");
        self.cfg = None;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> DollyResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
