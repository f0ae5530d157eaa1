use rayon::prelude::*;

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{Fps, FrameIndex},
        error::{DollyError, DollyResult},
        pixel::{Image, Sample},
    },
    render::synth::Synthesizer,
};

/// Threading and chunking for frame rendering.
///
/// Frames are rendered in chunks of `chunk_size`; within a chunk they may run in parallel, but
/// sinks always receive them in ascending index order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    pub parallel: bool,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
    pub chunk_size: usize,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            chunk_size: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub chunks: u64,
}

/// Render every frame of `synth` into memory, in ascending index order.
pub fn render_frames<P: Sample, D: Sample>(
    synth: &Synthesizer<'_, P, D>,
    threading: &RenderThreading,
) -> DollyResult<Vec<Image<P>>> {
    if !threading.parallel {
        return synth.frames().collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut out = Vec::with_capacity(synth.frame_count().min(4096) as usize);
    let mut chunk_start = 0;
    while chunk_start < synth.frame_count() {
        let chunk_end = (chunk_start + chunk_size).min(synth.frame_count());
        out.extend(render_chunk(synth, chunk_start, chunk_end, Some(&pool))?);
        chunk_start = chunk_end;
    }
    Ok(out)
}

/// Render `synth` and stream its frames to every sink.
///
/// Each sink sees `begin`, then every frame in ascending order, then `end`.
#[tracing::instrument(skip(synth, sinks, threading), fields(frames = synth.frame_count(), sinks = sinks.len()))]
pub fn render_to_sinks<P: Sample, D: Sample>(
    synth: &Synthesizer<'_, P, D>,
    name: &str,
    fps: Fps,
    sinks: &mut [&mut dyn FrameSink<P>],
    threading: &RenderThreading,
) -> DollyResult<RenderStats> {
    let source = synth.pair().source();
    let cfg = SinkConfig {
        name: name.to_string(),
        width: source.width(),
        height: source.height(),
        channels: source.channels(),
        frame_count: synth.frame_count(),
        fps,
    };
    for sink in sinks.iter_mut() {
        sink.begin(cfg.clone())?;
    }

    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };
    let chunk_size = normalized_chunk_size(threading.chunk_size);

    let mut stats = RenderStats::default();
    let mut chunk_start = 0;
    while chunk_start < synth.frame_count() {
        let chunk_end = (chunk_start + chunk_size).min(synth.frame_count());
        let frames = render_chunk(synth, chunk_start, chunk_end, pool.as_ref())?;

        for (offset, frame) in frames.iter().enumerate() {
            let idx = FrameIndex(chunk_start + offset as u64);
            for sink in sinks.iter_mut() {
                sink.push_frame(idx, frame)?;
            }
        }

        stats.frames_total += frames.len() as u64;
        stats.chunks += 1;
        chunk_start = chunk_end;
    }

    for sink in sinks.iter_mut() {
        sink.end()?;
    }
    Ok(stats)
}

fn render_chunk<P: Sample, D: Sample>(
    synth: &Synthesizer<'_, P, D>,
    start: u64,
    end: u64,
    pool: Option<&rayon::ThreadPool>,
) -> DollyResult<Vec<Image<P>>> {
    let Some(pool) = pool else {
        return (start..end)
            .map(|f| synth.render_frame(FrameIndex(f)))
            .collect();
    };

    let indices: Vec<u64> = (start..end).collect();
    let rendered = pool.install(|| {
        indices
            .par_iter()
            .map(|&f| synth.render_frame(FrameIndex(f)))
            .collect::<Vec<_>>()
    });
    rendered.into_iter().collect()
}

fn build_thread_pool(threads: Option<usize>) -> DollyResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DollyError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DollyError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
