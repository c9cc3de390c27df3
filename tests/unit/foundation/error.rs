use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VatError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        VatError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        VatError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VatError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn range_exceeded_names_site_once_attached() {
    let bare = VatError::RangeExceeded {
        site: TexelSite::default(),
        delta: [9.0, 0.0, 0.0],
        level: 4,
    };
    let msg = bare.to_string();
    assert!(msg.starts_with("range exceeded:"));
    assert!(msg.contains("level 4"));

    let located = bare.at(TexelSite::new(FrameNumber(3), 150));
    let msg = located.to_string();
    assert!(msg.contains("at frame 3, vertex 150"), "{msg}");
    assert!(located.is_encoding_failure());
}

#[test]
fn at_leaves_other_variants_alone() {
    let err = VatError::validation("bad").at(TexelSite::new(FrameNumber(1), 0));
    assert!(matches!(err, VatError::Validation(ref m) if m == "bad"));
    assert!(!err.is_encoding_failure());
}
