use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::pixel::DepthMap;
use crate::render::synth::{BlendMode, SynthOpts, TransitionPair};

fn pair() -> TransitionPair {
    let a = Image::from_fn(24, 12, 3, |x, y, c| ((x * 10 + y * 3 + c as u32 * 60) % 256) as u8)
        .unwrap();
    let b = Image::from_fn(24, 12, 3, |x, y, c| ((x * 2 + y * 17 + c as u32 * 30) % 256) as u8)
        .unwrap();
    let da = DepthMap::from_fn(24, 12, |x, _| (x * 10) as u8);
    let db = DepthMap::from_fn(24, 12, |_, y| (y * 20) as u8);
    TransitionPair::new(a, da, b, db).unwrap()
}

fn opts(frame_count: u64) -> SynthOpts {
    SynthOpts {
        frame_count,
        mode: BlendMode::DepthWarp,
        ..SynthOpts::default()
    }
}

#[test]
fn parallel_matches_sequential() {
    let pair = pair();
    let synth = Synthesizer::new(&pair, opts(11)).unwrap();

    let sequential = render_frames(
        &synth,
        &RenderThreading {
            parallel: false,
            ..RenderThreading::default()
        },
    )
    .unwrap();
    let parallel = render_frames(
        &synth,
        &RenderThreading {
            parallel: true,
            threads: Some(3),
            chunk_size: 4,
        },
    )
    .unwrap();

    assert_eq!(sequential.len(), 11);
    assert_eq!(sequential, parallel);
}

#[test]
fn sinks_receive_every_frame_in_order() {
    let pair = pair();
    let synth = Synthesizer::new(&pair, opts(7)).unwrap();
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    let mut sinks: [&mut dyn FrameSink<u8>; 2] = [&mut a, &mut b];

    let stats = render_to_sinks(
        &synth,
        "p_to_q",
        Fps::integer(30).unwrap(),
        &mut sinks,
        &RenderThreading {
            chunk_size: 3,
            ..RenderThreading::default()
        },
    )
    .unwrap();

    assert_eq!(stats.frames_total, 7);
    assert_eq!(stats.chunks, 3);
    for sink in [&a, &b] {
        assert!(sink.is_finished());
        let cfg = sink.config().unwrap();
        assert_eq!((cfg.width, cfg.height, cfg.channels), (24, 12, 3));
        let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
        assert_eq!(idx, (0..7).collect::<Vec<_>>());
    }
    assert_eq!(&a.frames()[0].1, pair.source());
    assert_eq!(&a.frames()[6].1, pair.dest());
}

#[test]
fn zero_chunk_size_is_treated_as_one() {
    let pair = pair();
    let synth = Synthesizer::new(&pair, opts(2)).unwrap();
    let frames = render_frames(
        &synth,
        &RenderThreading {
            chunk_size: 0,
            ..RenderThreading::default()
        },
    )
    .unwrap();
    assert_eq!(frames.len(), 2);
}

#[test]
fn zero_threads_is_rejected() {
    let pair = pair();
    let synth = Synthesizer::new(&pair, opts(2)).unwrap();
    let err = render_frames(
        &synth,
        &RenderThreading {
            threads: Some(0),
            ..RenderThreading::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, DollyError::Validation(_)));
}

#[test]
fn threading_defaults_fill_missing_json_fields() {
    let t: RenderThreading = serde_json::from_str(r#"{"threads": 2}"#).unwrap();
    assert!(t.parallel);
    assert_eq!(t.threads, Some(2));
    assert_eq!(t.chunk_size, 16);
}
