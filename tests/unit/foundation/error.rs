use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DollyError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DollyError::flow("x")
            .to_string()
            .contains("flow estimation failed:")
    );
    assert!(
        DollyError::unavailable("x")
            .to_string()
            .contains("feature unavailable:")
    );
    assert!(DollyError::encode("x").to_string().contains("encode error:"));
    assert!(
        DollyError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        DollyError::DegenerateFrameCount(0)
            .to_string()
            .contains("degenerate frame count: 0")
    );
}

#[test]
fn shape_mismatch_names_both_shapes() {
    let err = DollyError::shape_mismatch("depth map", Shape::new(8, 4), Shape::new(4, 2));
    let msg = err.to_string();
    assert!(msg.contains("depth map"));
    assert!(msg.contains("8x4"));
    assert!(msg.contains("4x2"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DollyError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
