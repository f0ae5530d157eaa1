use super::*;

fn texture(dx: f32, dy: f32) -> Image<u8> {
    Image::from_fn(64, 64, 3, |x, y, _| {
        let fx = x as f32 - dx;
        let fy = y as f32 - dy;
        (128.0 + 55.0 * (fx * 0.3).sin() + 55.0 * (fy * 0.25).cos()).round() as u8
    })
    .unwrap()
}

fn mean_in(flow: &FlowField, x0: u32, y0: u32, x1: u32, y1: u32) -> [f32; 2] {
    let mut sum = [0.0f64; 2];
    let mut n = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let [u, v] = flow.at(x, y);
            sum[0] += f64::from(u);
            sum[1] += f64::from(v);
            n += 1;
        }
    }
    [(sum[0] / n as f64) as f32, (sum[1] / n as f64) as f32]
}

#[test]
fn identical_images_have_zero_flow() {
    let img = texture(0.0, 0.0);
    let flow = estimate_flow(&img, &img, &FlowParams::default()).unwrap();
    assert_eq!(flow.shape(), img.shape());
    assert!(flow.vectors().iter().all(|v| *v == [0.0, 0.0]));
}

#[test]
fn recovers_a_global_translation() {
    let a = texture(0.0, 0.0);
    let b = texture(2.0, 1.0);
    let flow = estimate_flow(&a, &b, &FlowParams::default()).unwrap();
    let [u, v] = mean_in(&flow, 16, 16, 48, 48);
    assert!((u - 2.0).abs() < 0.5, "u = {u}");
    assert!((v - 1.0).abs() < 0.5, "v = {v}");
}

#[test]
fn flat_images_do_not_fail() {
    let a = Image::filled(32, 32, &[90u8, 90, 90]).unwrap();
    let b = Image::filled(32, 32, &[120u8, 120, 120]).unwrap();
    let flow = estimate_flow(&a, &b, &FlowParams::default()).unwrap();
    assert!(flow.vectors().iter().all(|v| *v == [0.0, 0.0]));
}

#[test]
fn shape_mismatch_is_an_error() {
    let a = texture(0.0, 0.0);
    let b = Image::filled(32, 64, &[0u8, 0, 0]).unwrap();
    assert!(matches!(
        estimate_flow(&a, &b, &FlowParams::default()),
        Err(DollyError::InputShapeMismatch { .. })
    ));
}

#[test]
fn tiny_images_fail_estimation() {
    let a = Image::filled(1, 5, &[0u8, 0, 0]).unwrap();
    assert!(matches!(
        estimate_flow(&a, &a, &FlowParams::default()),
        Err(DollyError::FlowEstimation(_))
    ));
}

#[test]
fn invalid_params_are_rejected() {
    let img = texture(0.0, 0.0);
    for params in [
        FlowParams {
            window: 4,
            ..FlowParams::default()
        },
        FlowParams {
            levels: 0,
            ..FlowParams::default()
        },
        FlowParams {
            iterations: 0,
            ..FlowParams::default()
        },
        FlowParams {
            pyr_scale: 1.0,
            ..FlowParams::default()
        },
    ] {
        assert!(matches!(
            estimate_flow(&img, &img, &params),
            Err(DollyError::Validation(_))
        ));
    }
}

#[test]
fn gray_uses_luma_weights_on_a_255_scale() {
    let img = Image::filled(1, 1, &[255u8, 0, 0]).unwrap();
    assert!((to_gray(&img)[0] - 0.299 * 255.0).abs() < 1e-3);

    let f = Image::filled(1, 1, &[1.0f32]).unwrap();
    assert_eq!(to_gray(&f)[0], 255.0);
}

#[test]
fn box_sum_counts_replicated_edges() {
    let ones = vec![1.0f32; 5 * 4];
    let s = box_sum(&ones, 5, 4, 1);
    assert!(s.iter().all(|&v| v == 9.0));

    let ramp: Vec<f32> = (0..5).map(|x| x as f32).collect();
    let s = box_sum(&ramp, 5, 1, 1);
    // rows replicate vertically, so each column sums 3x its horizontal window
    assert_eq!(s, vec![3.0, 9.0, 18.0, 27.0, 33.0]);
}

#[test]
fn params_deserialize_with_defaults() {
    let p: FlowParams = serde_json::from_str(r#"{ "levels": 4 }"#).unwrap();
    assert_eq!(p.levels, 4);
    assert_eq!(p.window, 15);
}
