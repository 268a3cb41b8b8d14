//! Error taxonomy tests

use rsm_domain::Error;

#[test]
fn test_no_attribute_found_names_both_attributes() {
    let err = Error::no_attribute_found("todo:1", Some("::todo".to_string()), "<li id=\"a\">");
    let message = err.to_string();
    assert!(message.contains("'todo:1'"));
    assert!(message.contains("'::todo'"));
    assert!(message.contains("<li id=\"a\">"));
}

#[test]
fn test_no_attribute_found_without_secondary() {
    let err = Error::no_attribute_found("todo:1", None, "#0");
    assert_eq!(err.to_string(), "No attribute 'todo:1' found starting at #0");
}

#[test]
fn test_errors_are_cloneable_and_comparable() {
    let err = Error::module_load("file:///a.js", "boom");
    assert_eq!(err.clone(), err);
}

#[test]
fn test_not_found_classification() {
    assert!(Error::no_listener_found("open", "on:open", "#1").is_not_found());
    assert!(Error::node_not_found("#9").is_not_found());
    assert!(!Error::overridden_constructor("todo").is_not_found());
    assert!(!Error::missing_event_type("builtin:/events").is_not_found());
}

#[test]
fn test_json_error_conversion() {
    let err: Error = serde_json::from_str::<u32>("x").unwrap_err().into();
    assert!(matches!(err, Error::Json { .. }));
}
