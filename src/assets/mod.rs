/// Panorama and depth-map decoding.
pub mod decode;
