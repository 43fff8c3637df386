//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Project: `ignore` UNIONS with negation support, `extensions`
//!   REPLACES (ordered probe list)
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test project config merging with defaults.

use std::fs;

use tempfile::TempDir;

use nodelink::config::{RawSettings, Settings};

// ============================================================
// Settings::load() project config union merge tests
// ============================================================

/// Test that the project `ignore` array UNIONS with current config
/// (defaults when no global).
#[test]
fn given_project_config_with_ignore_when_load_then_unions_with_current() {
    // Arrange
    let project_dir = TempDir::new().unwrap();
    let project_path = project_dir.path();

    let project_config = r#"
ignore = ["electron", "fsevents"]
"#;
    fs::write(project_path.join(".nodelink.toml"), project_config).unwrap();

    // Act
    let settings = Settings::load(Some(project_path)).expect("load settings");

    // Assert: defaults carry no ignores, so the union is the project list
    assert!(settings.ignore.contains(&"electron".to_string()));
    assert!(settings.ignore.contains(&"fsevents".to_string()));
    assert_eq!(settings.ignore.len(), 2);
}

/// Test that negation prefix removes items from the current config.
#[test]
fn given_project_config_with_negation_when_load_then_removes_negated_item() {
    // Arrange: project removes one entry it also brought in, which mimics
    // a global baseline being trimmed per project
    let project_dir = TempDir::new().unwrap();
    let project_path = project_dir.path();

    let project_config = r#"
ignore = ["electron", "mockfs", "!electron"]
"#;
    fs::write(project_path.join(".nodelink.toml"), project_config).unwrap();

    // Act
    let settings = Settings::load(Some(project_path)).expect("load settings");

    // Assert
    assert!(
        !settings.ignore.contains(&"electron".to_string()),
        "'electron' should be removed by !electron"
    );
    assert!(settings.ignore.contains(&"mockfs".to_string()));
    assert_eq!(settings.ignore.len(), 1);
}

/// Test that scalar values from project config override defaults.
#[test]
fn given_project_config_with_scalars_when_load_then_overrides_scalars() {
    // Arrange
    let project_dir = TempDir::new().unwrap();
    let project_path = project_dir.path();

    let project_config = r#"
main_file = "app.js"
registry_dir = "web_modules"
"#;
    fs::write(project_path.join(".nodelink.toml"), project_config).unwrap();

    // Act
    let settings = Settings::load(Some(project_path)).expect("load settings");

    // Assert
    assert_eq!(settings.main_file, "app.js");
    assert_eq!(settings.registry_dir, "web_modules");
    // arrays untouched
    assert_eq!(settings.extensions, vec![".js", ".json", ".node"]);
}

/// Test that unspecified fields in project config inherit from current config.
#[test]
fn given_project_config_without_arrays_when_load_then_inherits_current() {
    // Arrange
    let project_dir = TempDir::new().unwrap();
    let project_path = project_dir.path();

    let project_config = r#"
main_file = "server.js"
"#;
    fs::write(project_path.join(".nodelink.toml"), project_config).unwrap();

    // Act
    let settings = Settings::load(Some(project_path)).expect("load settings");

    // Assert
    assert_eq!(settings.main_file, "server.js");
    assert_eq!(settings.registry_dir, "node_modules");
    assert!(settings.ignore.is_empty());
    assert_eq!(settings.extensions, vec![".js", ".json", ".node"]);
}

/// Test that `extensions` REPLACES instead of unioning: the list is an
/// ordered probe sequence and a sorted union would scramble it.
#[test]
fn given_project_config_with_extensions_when_load_then_replaces_in_order() {
    // Arrange
    let project_dir = TempDir::new().unwrap();
    let project_path = project_dir.path();

    let project_config = r#"
extensions = [".mjs", ".js"]
"#;
    fs::write(project_path.join(".nodelink.toml"), project_config).unwrap();

    // Act
    let settings = Settings::load(Some(project_path)).expect("load settings");

    // Assert: wholesale replacement, order preserved
    assert_eq!(settings.extensions, vec![".mjs", ".js"]);
}

/// Test that a directory without project config falls back to defaults.
#[test]
fn given_no_project_config_when_load_then_defaults() {
    // Arrange
    let project_dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(project_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.main_file, "index.js");
    assert_eq!(settings.registry_dir, "node_modules");
    assert!(settings.ignore.is_empty());
}

// ============================================================
// Template and serialization
// ============================================================

/// Test that the generated template is valid TOML with every option
/// commented out.
#[test]
fn given_template_when_parsing_then_valid_and_all_commented() {
    // Act
    let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");

    // Assert
    assert!(raw.main_file.is_none());
    assert!(raw.registry_dir.is_none());
    assert!(raw.ignore.is_none());
    assert!(raw.extensions.is_none());
}

/// Test that the effective config round-trips through its TOML rendering.
#[test]
fn given_settings_when_rendering_toml_then_parses_back() {
    // Arrange
    let settings = Settings {
        ignore: vec!["electron".to_string()],
        ..Settings::default()
    };

    // Act
    let rendered = settings.to_toml().expect("render toml");
    let parsed: Settings = toml::from_str(&rendered).expect("parse rendered toml");

    // Assert
    assert_eq!(parsed, settings);
}
