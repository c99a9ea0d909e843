use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FractalError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FractalError::codec("x").to_string().contains("codec error:"));
    assert!(
        FractalError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk on fire");
    let err = FractalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk on fire"));
}
