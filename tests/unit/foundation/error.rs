use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SplinalError::value("x").to_string().contains("value error:"));
    assert!(
        SplinalError::name("foo")
            .to_string()
            .contains("name error: unknown identifier \"foo\"")
    );
    assert!(
        SplinalError::backend_unavailable("x")
            .to_string()
            .contains("backend unavailable:")
    );
    assert!(
        SplinalError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn resolve_context_is_rendered_and_skipped_by_kind() {
    let err = SplinalError::Resolve {
        spline: "pos".to_owned(),
        channel: "y".to_owned(),
        position: 0.25,
        expression: Some("x * 2".to_owned()),
        source: Box::new(SplinalError::name("x")),
    };
    let msg = err.to_string();
    assert!(msg.contains("pos.y"));
    assert!(msg.contains("0.25"));
    assert!(msg.contains("\"x * 2\""));
    assert_eq!(err.kind(), ErrorKind::Name);
    assert!(matches!(err.root(), SplinalError::Name { name } if name == "x"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SplinalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
