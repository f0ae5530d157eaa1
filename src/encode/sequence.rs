use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{DollyError, DollyResult};
use crate::foundation::pixel::Image;

/// File format of numbered frame images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceFormat {
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
}

impl SequenceFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Options for [`ImageSequenceSink`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SequenceOpts {
    pub enabled: bool,
    pub format: SequenceFormat,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for SequenceOpts {
    fn default() -> Self {
        Self {
            enabled: true,
            format: SequenceFormat::Jpg,
            jpeg_quality: 95,
        }
    }
}

/// Writes each frame as `{dir}/{name}_{index:04}.{ext}`.
pub struct ImageSequenceSink {
    dir: PathBuf,
    opts: SequenceOpts,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: Vec<PathBuf>,
}

impl ImageSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, opts: SequenceOpts) -> Self {
        Self {
            dir: dir.into(),
            opts,
            cfg: None,
            last_idx: None,
            written: Vec::new(),
        }
    }

    /// Paths written since the last `begin`, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// File name of frame `idx` of the transition called `name`.
pub fn frame_file_name(name: &str, idx: FrameIndex, format: SequenceFormat) -> String {
    format!("{name}_{:04}.{}", idx.0, format.extension())
}

fn color_type(channels: usize) -> DollyResult<image::ColorType> {
    match channels {
        1 => Ok(image::ColorType::L8),
        3 => Ok(image::ColorType::Rgb8),
        4 => Ok(image::ColorType::Rgba8),
        n => Err(DollyError::validation(format!(
            "cannot write {n}-channel frames as images"
        ))),
    }
}

fn write_frame(path: &Path, frame: &Image<u8>, opts: &SequenceOpts) -> DollyResult<()> {
    let color = color_type(frame.channels())?;
    match opts.format {
        SequenceFormat::Jpg => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("create '{}'", path.display()))?;
            let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
                BufWriter::new(file),
                opts.jpeg_quality.clamp(1, 100),
            );
            enc.encode(frame.as_slice(), frame.width(), frame.height(), color.into())
                .with_context(|| format!("write jpeg '{}'", path.display()))?;
        }
        SequenceFormat::Png => {
            image::save_buffer_with_format(
                path,
                frame.as_slice(),
                frame.width(),
                frame.height(),
                color,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", path.display()))?;
        }
    }
    Ok(())
}

impl FrameSink<u8> for ImageSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> DollyResult<()> {
        color_type(cfg.channels)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create sequence directory '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image<u8>) -> DollyResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| DollyError::encode("image sequence sink not started"))?;
        check_frame(cfg, self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        let path = self
            .dir
            .join(frame_file_name(&cfg.name, idx, self.opts.format));
        write_frame(&path, frame, &self.opts)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> DollyResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| DollyError::encode("image sequence sink not started"))?;
        tracing::debug!(
            name = %cfg.name,
            frames = self.written.len(),
            dir = %self.dir.display(),
            "wrote image sequence"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
