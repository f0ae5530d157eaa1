use super::*;

#[test]
fn empty_object_gives_defaults() {
    let cfg = TransitionConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, TransitionConfig::default());
    assert_eq!(cfg.frames, 30);
    assert_eq!(cfg.mode, BlendMode::DepthWarp);
    assert_eq!(cfg.video.codec, "libx264");
    assert_eq!(cfg.video.quality, Some(8));
    assert_eq!(cfg.sequence.jpeg_quality, 95);
    assert_eq!(cfg.threading.chunk_size, 16);
    assert_eq!(cfg.flow.window, 15);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = TransitionConfig::from_reader(
        r#"{"frames": 12, "mode": "morph", "mask": "radial", "ease": "linear",
            "morph_fallback": "crossfade", "video": {"enabled": false}, "sequence": {"format": "png"}}"#
            .as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.frames, 12);
    assert_eq!(cfg.mode, BlendMode::Morph);
    assert_eq!(cfg.mask, MaskStyle::Radial);
    assert!(!cfg.video.enabled);
    assert_eq!(cfg.video.fps, 30);
    assert!(cfg.sequence.enabled);

    let opts = cfg.synth_opts();
    assert_eq!(opts.frame_count, 12);
    assert_eq!(opts.ease, Ease::Linear);
    assert_eq!(opts.morph_fallback, MorphFallback::Crossfade);
}

#[test]
fn unknown_mode_degrades_to_cut() {
    let cfg = TransitionConfig::from_reader(r#"{"mode": "spin"}"#.as_bytes()).unwrap();
    assert_eq!(cfg.mode, BlendMode::Cut);
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{"frames": 0}"#,
        r#"{"video": {"fps": 0}}"#,
        r#"{"video": {"quality": 11}}"#,
        r#"{"sequence": {"jpeg_quality": 0}}"#,
        r#"{"threading": {"threads": 0}}"#,
        r#"{"flow": {"window": 4}}"#,
    ] {
        assert!(TransitionConfig::from_reader(json.as_bytes()).is_err(), "{json}");
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = TransitionConfig::from_reader("{frames".as_bytes()).unwrap_err();
    assert!(matches!(err, DollyError::Serde(_)));
}

#[test]
fn missing_file_is_reported() {
    let err = TransitionConfig::from_path("target/no_such_config.json").unwrap_err();
    assert!(matches!(err, DollyError::Other(_)));
    assert!(err.to_string().contains("no_such_config.json"));
}
