use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::integer(30).unwrap(), Fps { num: 30, den: 1 });
}

#[test]
fn shape_displays_as_width_by_height() {
    let s = Shape::new(2048, 1024);
    assert_eq!(s.to_string(), "2048x1024");
    assert_eq!(s.pixel_count(), 2048 * 1024);
    assert!(!s.is_empty());
    assert!(Shape::new(0, 4).is_empty());
}
