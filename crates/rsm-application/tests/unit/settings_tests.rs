//! Tests for runtime settings

use rsm_application::{RuntimeSettings, ScopeBoundary};

#[test]
fn test_defaults() {
    let settings = RuntimeSettings::default();
    assert_eq!(settings.base_uri.as_str(), "file:///");
    assert_eq!(settings.boundary, ScopeBoundary::Marker("q:host".to_string()));
    assert!(settings.protocols.is_empty());
}

#[test]
fn test_attribute_names() {
    let settings = RuntimeSettings::default();
    assert_eq!(settings.event_attribute("dblClick"), "on:dbl-click");
    assert_eq!(settings.event_attribute("open"), "on:open");
    assert_eq!(settings.factory_attribute("todo"), "::todo");
}

#[test]
fn test_protocol_base_becomes_directory() {
    let settings = RuntimeSettings::default()
        .with_protocol("ui", "https://cdn.example/app")
        .unwrap();
    assert_eq!(settings.protocols["ui"].as_str(), "https://cdn.example/app/");
}

#[test]
fn test_invalid_base_uri_is_a_config_error() {
    let err = RuntimeSettings::default()
        .with_base_uri("not a url")
        .unwrap_err();
    assert!(err.to_string().contains("not a url"));
}
