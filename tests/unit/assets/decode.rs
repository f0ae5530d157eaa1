use std::io::Cursor;

use super::*;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn panorama_drops_alpha() {
    let rgba = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 7]).unwrap();
    let img = decode_panorama(&encode_png(image::DynamicImage::ImageRgba8(rgba))).unwrap();
    assert_eq!(img.channels(), 3);
    assert_eq!(img.as_slice(), &[100, 50, 200]);
}

#[test]
fn depth_is_converted_to_luma() {
    let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([90, 90, 90]));
    let depth = decode_depth(
        &encode_png(image::DynamicImage::ImageRgb8(rgb)),
        Shape::new(2, 2),
    )
    .unwrap();
    assert!(depth.as_slice().iter().all(|&v| v == 90));
}

#[test]
fn depth_is_resized_to_image_shape() {
    let luma = image::GrayImage::from_pixel(4, 2, image::Luma([200]));
    let depth = decode_depth(
        &encode_png(image::DynamicImage::ImageLuma8(luma)),
        Shape::new(8, 4),
    )
    .unwrap();
    assert_eq!(depth.shape(), Shape::new(8, 4));
    assert!(depth.as_slice().iter().all(|&v| v == 200));
}

#[test]
fn resize_keeps_uniform_color() {
    let img = Image::filled(6, 3, &[10u8, 20, 30]).unwrap();
    let out = resize_image_to(&img, Shape::new(4, 2)).unwrap();
    assert_eq!(out.shape(), Shape::new(4, 2));
    assert!(out.as_slice().chunks_exact(3).all(|p| p == [10, 20, 30]));

    let same = resize_image_to(&img, img.shape()).unwrap();
    assert_eq!(same, img);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_panorama(b"not an image").is_err());
}
