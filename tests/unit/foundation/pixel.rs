use super::*;

#[test]
fn u8_from_f32_rounds_and_saturates() {
    assert_eq!(u8::from_f32(127.5), 128);
    assert_eq!(u8::from_f32(-3.0), 0);
    assert_eq!(u8::from_f32(300.0), 255);
    assert_eq!(u16::from_f32(70000.0), 65535);
    assert_eq!(f32::from_f32(0.25), 0.25);
}

#[test]
fn image_rejects_wrong_buffer_length() {
    assert!(Image::<u8>::new(2, 2, 3, vec![0; 11]).is_err());
    assert!(Image::<u8>::new(2, 2, 0, vec![]).is_err());
    assert!(Image::<u8>::new(2, 2, 3, vec![0; 12]).is_ok());
}

#[test]
fn filled_and_pixel_agree() {
    let img = Image::filled(3, 2, &[10u8, 20, 30]).unwrap();
    assert_eq!(img.channels(), 3);
    assert_eq!(img.shape(), Shape::new(3, 2));
    assert_eq!(img.pixel(2, 1), &[10, 20, 30]);
}

#[test]
fn from_fn_is_row_major_interleaved() {
    let img = Image::from_fn(2, 2, 2, |x, y, c| (y * 100 + x * 10) as u8 + c as u8).unwrap();
    assert_eq!(img.as_slice(), &[0, 1, 10, 11, 100, 101, 110, 111]);
}

#[test]
fn nearness_is_normalized_by_full_scale() {
    let d = DepthMap::<u8>::new(2, 1, vec![0, 255]).unwrap();
    assert_eq!(d.nearness(0, 0), 0.0);
    assert_eq!(d.nearness(1, 0), 1.0);

    let d16 = DepthMap::<u16>::filled(1, 1, 65535);
    assert_eq!(d16.nearness(0, 0), 1.0);

    let df = DepthMap::<f32>::filled(1, 1, 2.0);
    assert_eq!(df.nearness(0, 0), 1.0);
}

#[test]
fn depth_rejects_wrong_buffer_length() {
    assert!(DepthMap::<u8>::new(4, 4, vec![0; 15]).is_err());
}

#[test]
fn same_layout_compares_size_and_channels() {
    let rgb = Image::filled(3, 2, &[1u8, 2, 3]).unwrap();
    assert!(rgb.same_layout(&Image::filled(3, 2, &[9u8, 9, 9]).unwrap()));
    assert!(!rgb.same_layout(&Image::filled(3, 2, &[9u8]).unwrap()));
    assert!(!rgb.same_layout(&Image::filled(2, 3, &[9u8, 9, 9]).unwrap()));
}
