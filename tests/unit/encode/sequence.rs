use super::*;
use crate::foundation::core::Fps;

fn cfg(name: &str) -> SinkConfig {
    SinkConfig {
        name: name.to_string(),
        width: 4,
        height: 2,
        channels: 3,
        frame_count: 2,
        fps: Fps::integer(30).unwrap(),
    }
}

#[test]
fn file_names_are_zero_padded() {
    assert_eq!(
        frame_file_name("a_to_b", FrameIndex(7), SequenceFormat::Jpg),
        "a_to_b_0007.jpg"
    );
    assert_eq!(
        frame_file_name("x", FrameIndex(12345), SequenceFormat::Png),
        "x_12345.png"
    );
}

#[test]
fn writes_png_frames_that_decode_back() {
    let dir = PathBuf::from("target").join("unit_sequence_png");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = ImageSequenceSink::new(
        &dir,
        SequenceOpts {
            format: SequenceFormat::Png,
            ..SequenceOpts::default()
        },
    );
    sink.begin(cfg("p")).unwrap();
    let frame = Image::from_fn(4, 2, 3, |x, y, c| (x * 50 + y * 7 + c as u32) as u8).unwrap();
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 2);
    let decoded = image::open(dir.join("p_0001.png")).unwrap().to_rgb8();
    assert_eq!(decoded.as_raw(), frame.as_slice());
}

#[test]
fn writes_jpeg_frames() {
    let dir = PathBuf::from("target").join("unit_sequence_jpg");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = ImageSequenceSink::new(&dir, SequenceOpts::default());
    sink.begin(cfg("j")).unwrap();
    sink.push_frame(FrameIndex(0), &Image::filled(4, 2, &[200u8, 100, 50]).unwrap())
        .unwrap();
    sink.end().unwrap();

    let decoded = image::open(dir.join("j_0000.jpg")).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (4, 2));
    let px = decoded.get_pixel(1, 1).0;
    assert!((i32::from(px[0]) - 200).abs() <= 6);
}

#[test]
fn format_parses_jpeg_alias() {
    let f: SequenceFormat = serde_json::from_str("\"jpeg\"").unwrap();
    assert_eq!(f, SequenceFormat::Jpg);
}

#[test]
fn two_channel_frames_are_rejected() {
    let mut sink = ImageSequenceSink::new(
        PathBuf::from("target").join("unit_sequence_bad"),
        SequenceOpts::default(),
    );
    let mut c = cfg("bad");
    c.channels = 2;
    assert!(sink.begin(c).is_err());
}
