use wl_core::errors::{ErrorInfo, WlError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("energy", "-3.20")
        .with_context("bound", 10)
}

#[test]
fn domain_error_surface() {
    let err = WlError::Domain(sample_info("energy-above-window", "walk left window"));
    assert_eq!(err.info().code, "energy-above-window");
    assert_eq!(err.info().context.get("bound").map(String::as_str), Some("10"));
}

#[test]
fn move_set_error_surface() {
    let err = WlError::MoveSet(sample_info("no-moves", "no neighbours"));
    assert_eq!(err.info().code, "no-moves");
    assert!(err.info().context.contains_key("energy"));
}

#[test]
fn config_error_surface() {
    let err = WlError::Config(sample_info("lowest-bin-empty", "no reference").with_hint("use fewer bins"));
    assert_eq!(err.info().hint.as_deref(), Some("use fewer bins"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = WlError::Resource(
        ErrorInfo::new("enumeration-too-long", "sequence too long")
            .with_context("length", 80)
            .with_hint("shorten the sequence"),
    );
    let text = err.to_string();
    assert!(text.starts_with("resource error: sequence too long (code: enumeration-too-long)"));
    assert!(text.contains("length=80"));
    assert!(text.ends_with("hint: shorten the sequence"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = WlError::Model(ErrorInfo::new("invalid-base", "bad base"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Model");
    assert_eq!(json["detail"]["code"], "invalid-base");
    let back: WlError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
