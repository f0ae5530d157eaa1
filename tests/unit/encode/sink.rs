use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        name: "a_to_b".to_string(),
        width: 2,
        height: 2,
        channels: 3,
        frame_count: 3,
        fps: Fps::integer(30).unwrap(),
    }
}

fn frame(v: u8) -> Image<u8> {
    Image::filled(2, 2, &[v, v, v]).unwrap()
}

#[test]
fn captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    for i in 0..3u8 {
        sink.push_frame(FrameIndex(u64::from(i)), &frame(i)).unwrap();
    }
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 3);
    assert_eq!(sink.frames()[2].1, frame(2));
    assert_eq!(sink.config().unwrap().name, "a_to_b");
}

#[test]
fn rejects_out_of_order_and_wrong_size() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(1), &frame(0)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame(0)).is_err());

    let big = Image::filled(3, 2, &[0u8, 0, 0]).unwrap();
    assert!(sink.push_frame(FrameIndex(2), &big).is_err());

    let gray = Image::filled(2, 2, &[0u8]).unwrap();
    assert!(sink.push_frame(FrameIndex(2), &gray).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = InMemorySink::<u8>::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(0)).is_err());
}
