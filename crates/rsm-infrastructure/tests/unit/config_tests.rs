//! Configuration Loader Tests

use rsm_application::ScopeBoundary;
use rsm_domain::error::Error;
use rsm_infrastructure::config::{
    AppConfig, BoundaryKind, ConfigLoader, RuntimeConfig, validate_app_config,
};
use rsm_infrastructure::constants::{DEFAULT_LOG_LEVEL, REGISTRY_LOADER};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("rsm.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();

    assert_eq!(config.runtime.base_uri, "file:///");
    assert_eq!(config.runtime.event_prefix, "on:");
    assert_eq!(config.runtime.factory_prefix, "::");
    assert_eq!(config.runtime.scope.boundary, BoundaryKind::Marker);
    assert_eq!(config.modules.loader, REGISTRY_LOADER);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    assert!(validate_app_config(&config).is_ok());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[runtime]
base_uri = "https://app.example/"
event_prefix = "data-on-"

[runtime.scope]
boundary = "element"

[runtime.protocols]
ui = "https://cdn.example/ui"

[modules]
max_cached = 64

[logging]
level = "debug"
json_format = true
"#,
    );

    let config = ConfigLoader::new().with_config_path(&path).load().unwrap();

    assert_eq!(config.runtime.base_uri, "https://app.example/");
    assert_eq!(config.runtime.event_prefix, "data-on-");
    assert_eq!(config.runtime.factory_prefix, "::");
    assert_eq!(config.runtime.scope.boundary, BoundaryKind::Element);
    assert_eq!(config.runtime.protocols["ui"], "https://cdn.example/ui");
    assert_eq!(config.modules.max_cached, Some(64));
    assert!(config.logging.json_format);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"debug\"\n");

    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("RSMENVTEST__LOGGING__LEVEL", "warn") };
    let config = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("RSMENVTEST")
        .load();
    unsafe { std::env::remove_var("RSMENVTEST__LOGGING__LEVEL") };

    assert_eq!(config.unwrap().logging.level, "warn");
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    for contents in [
        "[runtime]\nbase_uri = \"not a url\"\n",
        "[runtime]\nevent_prefix = \"\"\n",
        "[runtime.protocols]\n\"1bad\" = \"https://cdn.example/\"\n",
        "[modules]\nloader = \"http\"\n",
        "[modules]\nmax_cached = 0\n",
        "[logging]\nlevel = \"loud\"\n",
    ] {
        let path = write_config(&dir, contents);
        let result = ConfigLoader::new().with_config_path(&path).load();
        assert!(
            matches!(result, Err(Error::Config { .. })),
            "accepted: {contents}"
        );
    }
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");
    let mut config = AppConfig::default();
    config.runtime.base_attribute = "data-base".to_string();
    config.modules.max_cached = Some(8);

    let loader = ConfigLoader::new().with_config_path(&path);
    loader.save_to_file(&config, &path).unwrap();
    let loaded = loader.load().unwrap();

    assert_eq!(loaded.runtime, config.runtime);
    assert_eq!(loaded.modules, config.modules);
    assert_eq!(loader.config_path(), Some(path.as_path()));
}

#[test]
fn test_runtime_config_to_settings() {
    let mut runtime = RuntimeConfig::default();
    runtime.factory_prefix = "new:".to_string();
    runtime.scope.marker_attribute = "data-host".to_string();
    runtime
        .protocols
        .insert("ui".to_string(), "https://cdn.example/ui".to_string());

    let settings = runtime.to_settings().unwrap();

    assert_eq!(settings.factory_attribute("todo"), "new:todo");
    assert_eq!(settings.event_attribute("dblClick"), "on:dbl-click");
    assert_eq!(
        settings.boundary,
        ScopeBoundary::Marker("data-host".to_string())
    );
    assert_eq!(
        settings.protocols["ui"].as_str(),
        "https://cdn.example/ui/"
    );

    runtime.scope.boundary = BoundaryKind::Element;
    assert_eq!(runtime.to_settings().unwrap().boundary, ScopeBoundary::Element);
}
