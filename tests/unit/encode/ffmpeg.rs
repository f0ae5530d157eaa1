use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        name: "t".to_string(),
        width,
        height,
        channels: 3,
        frame_count: 2,
        fps: Fps::integer(30).unwrap(),
    }
}

#[test]
fn quality_maps_like_imageio() {
    let opts = VideoOpts::default();
    assert_eq!(opts.quality_args(), vec!["-crf", "10"]);

    let mpeg4 = VideoOpts {
        codec: "mpeg4".to_string(),
        quality: Some(10),
        ..VideoOpts::default()
    };
    assert_eq!(mpeg4.quality_args(), vec!["-qscale:v", "1"]);

    let none = VideoOpts {
        quality: None,
        ..VideoOpts::default()
    };
    assert!(none.quality_args().is_empty());
}

#[test]
fn command_line_streams_rgb24_at_fixed_rate() {
    let sink = FfmpegSink::new("out/v.mp4", VideoOpts::default(), EncoderCapabilities::default());
    let args = sink.command_args(&cfg(64, 32)).unwrap();
    let joined = args.join(" ");
    assert!(joined.starts_with("-y "));
    assert!(joined.contains("-pix_fmt rgb24 -s 64x32 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-c:v libx264 -crf 10 -pix_fmt yuv420p"));
    assert!(joined.ends_with("v.mp4"));
}

#[test]
fn missing_encoder_is_reported_as_unavailable() {
    let mut sink = FfmpegSink::new(
        PathBuf::from("target").join("unit_ffmpeg").join("x.mp4"),
        VideoOpts::default(),
        EncoderCapabilities { ffmpeg: false },
    );
    assert!(matches!(
        sink.begin(cfg(4, 4)),
        Err(DollyError::Unavailable(_))
    ));
}

#[test]
fn odd_dimensions_are_rejected_for_yuv420p() {
    let mut sink = FfmpegSink::new(
        PathBuf::from("target").join("unit_ffmpeg").join("odd.mp4"),
        VideoOpts::default(),
        EncoderCapabilities { ffmpeg: true },
    );
    assert!(matches!(
        sink.begin(cfg(5, 4)),
        Err(DollyError::Validation(_))
    ));
}

#[test]
fn even_sides_are_only_required_for_yuv420p() {
    let opts = VideoOpts::default();
    assert!(opts.accepts_size(32, 16));
    assert!(!opts.accepts_size(33, 16));
    assert!(!opts.accepts_size(32, 15));

    let rgb = VideoOpts {
        pixel_format: "rgb24".to_string(),
        ..VideoOpts::default()
    };
    assert!(rgb.accepts_size(33, 15));
}

#[test]
fn encodes_when_ffmpeg_is_available() {
    let caps = EncoderCapabilities::detect();
    if !caps.ffmpeg {
        return;
    }
    let out = PathBuf::from("target").join("unit_ffmpeg").join("enc.mp4");
    let mut sink = FfmpegSink::new(&out, VideoOpts::default(), caps);
    sink.begin(cfg(16, 16)).unwrap();
    for i in 0..2u64 {
        let v = (i * 100) as u8;
        sink.push_frame(FrameIndex(i), &Image::filled(16, 16, &[v, v, v]).unwrap())
            .unwrap();
    }
    sink.end().unwrap();
    assert!(out.is_file());
}
