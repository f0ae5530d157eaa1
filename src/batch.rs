use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::{
    assets::decode::{load_depth, load_panorama, resize_image_to},
    config::TransitionConfig,
    encode::{
        ffmpeg::{EncoderCapabilities, FfmpegSink},
        sequence::ImageSequenceSink,
        sink::FrameSink,
    },
    foundation::error::{DollyError, DollyResult},
    pairs::discovery::{TransitionJob, find_transition_pairs, is_file_safe_name},
    render::{
        pipeline::render_to_sinks,
        synth::{Synthesizer, TransitionPair},
    },
};

/// Files produced for one transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutput {
    pub name: String,
    pub frames: u64,
    pub sequence_dir: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

/// Outcome of [`generate_all_transitions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<TransitionOutput>,
    /// `(pair name, reason)` for every pair that failed.
    pub failed: Vec<(String, String)>,
    /// Pairs dropped during discovery because a file was missing.
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn sequence_dir(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join("sequences").join(name)
}

pub fn video_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join("videos").join(format!("{name}.mp4"))
}

/// Load, synthesize and persist one transition.
///
/// The destination panorama is resized to the source's dimensions when they differ; each depth
/// map is resized to its panorama.
#[tracing::instrument(skip(job, config, caps), fields(pair = %job.name))]
pub fn generate_transition(
    job: &TransitionJob,
    config: &TransitionConfig,
    out_dir: &Path,
    caps: &EncoderCapabilities,
) -> DollyResult<TransitionOutput> {
    let started = Instant::now();
    if !is_file_safe_name(&job.name) {
        return Err(DollyError::validation(format!(
            "transition name '{}' is not usable as a file name",
            job.name
        )));
    }

    let source = load_panorama(&job.pano1)?;
    let mut dest = load_panorama(&job.pano2)?;
    if dest.shape() != source.shape() {
        tracing::debug!(from = %dest.shape(), to = %source.shape(), "resizing destination panorama");
        dest = resize_image_to(&dest, source.shape())?;
    }
    let source_depth = load_depth(&job.depth1, source.shape())?;
    let dest_depth = load_depth(&job.depth2, dest.shape())?;
    let pair = TransitionPair::new(source, source_depth, dest, dest_depth)?;
    let synth = Synthesizer::new(&pair, config.synth_opts())?;

    let mut sequence = config.sequence.enabled.then(|| {
        ImageSequenceSink::new(sequence_dir(out_dir, &job.name), config.sequence.clone())
    });
    let shape = pair.source().shape();
    let want_video = config.video.enabled
        && if !caps.ffmpeg {
            tracing::warn!("ffmpeg not found on PATH, skipping video");
            false
        } else if !config.video.accepts_size(shape.width, shape.height) {
            tracing::warn!(
                size = %shape,
                pixel_format = %config.video.pixel_format,
                "frame size not encodable in this pixel format, skipping video"
            );
            false
        } else {
            true
        };
    let mut video = want_video.then(|| {
        FfmpegSink::new(video_path(out_dir, &job.name), config.video.clone(), *caps)
    });

    let mut sinks: Vec<&mut dyn FrameSink<u8>> = Vec::new();
    if let Some(s) = sequence.as_mut() {
        sinks.push(s);
    }
    if let Some(v) = video.as_mut() {
        sinks.push(v);
    }
    if sinks.is_empty() {
        tracing::warn!("sequence and video output are both disabled");
    }

    let stats = render_to_sinks(
        &synth,
        &job.name,
        config.video.fps()?,
        &mut sinks,
        &config.threading,
    )?;

    tracing::info!(
        frames = stats.frames_total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "transition done"
    );
    Ok(TransitionOutput {
        name: job.name.clone(),
        frames: stats.frames_total,
        sequence_dir: sequence.map(|_| sequence_dir(out_dir, &job.name)),
        video: video.map(|_| video_path(out_dir, &job.name)),
    })
}

/// Generate every transition found in `panoramas_dir`.
///
/// A failing pair is logged and recorded in the report; the remaining pairs still run.
#[tracing::instrument(skip(config, caps))]
pub fn generate_all_transitions(
    panoramas_dir: &Path,
    depth_dir: &Path,
    out_dir: &Path,
    config: &TransitionConfig,
    caps: &EncoderCapabilities,
) -> DollyResult<BatchReport> {
    let discovery = find_transition_pairs(panoramas_dir, depth_dir)?;
    if discovery.jobs.is_empty() {
        tracing::warn!(
            panoramas = %panoramas_dir.display(),
            depth = %depth_dir.display(),
            "no valid panorama pairs found"
        );
    }

    let mut report = BatchReport {
        skipped: discovery.skipped,
        ..BatchReport::default()
    };
    for job in &discovery.jobs {
        match generate_transition(job, config, out_dir, caps) {
            Ok(out) => report.succeeded.push(out),
            Err(err) => {
                tracing::error!(pair = %job.name, error = %err, "transition failed");
                report.failed.push((job.name.clone(), err.to_string()));
            }
        }
    }

    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}
