//! Integration tests for Settings loading with layered precedence.
//!
//! Note: These tests assume no global config file exists, so the explicit
//! file layers directly onto compiled defaults. Only the env override test
//! touches `render.empty_label`; the other tests stay clear of it because
//! environment variables are process wide.

use std::fs;

use tempfile::TempDir;

use hierarchy::config::Settings;
use hierarchy::{HierarchyBuilder, TreeDisplay, TreeError};

#[test]
fn given_config_file_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hierarchy.toml");
    fs::write(&path, "[builder]\nmax_depth = 2\n\n[render]\nmax_depth = 1\n").unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.builder.max_depth, Some(2));
    assert_eq!(settings.render.max_depth, Some(1));
}

#[test]
fn given_missing_config_file_when_load_then_errors() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(&dir.path().join("absent.toml")));

    assert!(matches!(result, Err(TreeError::Config(_))));
}

#[test]
fn given_malformed_config_file_when_load_then_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hierarchy.toml");
    fs::write(&path, "[builder\nmax_depth = ").unwrap();

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(TreeError::Config(_))));
}

#[test]
fn given_env_var_when_load_then_env_wins() {
    std::env::set_var("HIERARCHY_RENDER__EMPTY_LABEL", "(nothing)");

    let settings = Settings::load(None).expect("load settings");

    std::env::remove_var("HIERARCHY_RENDER__EMPTY_LABEL");
    assert_eq!(settings.render.empty_label, "(nothing)");
}

#[test]
fn given_loaded_settings_when_building_and_rendering_then_limits_apply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hierarchy.toml");
    fs::write(&path, "[builder]\nmax_depth = 2\n\n[render]\nmax_depth = 0\n").unwrap();
    let settings = Settings::load(Some(&path)).unwrap();

    let rows = vec![(1, 0), (2, 1), (3, 2)];
    let builder = HierarchyBuilder::new(|r: &(i32, i32)| r.0, |r: &(i32, i32)| r.1);
    assert_eq!(
        builder
            .with_settings(settings.builder)
            .build_hierarchy(rows, 0)
            .unwrap_err(),
        TreeError::DepthLimitExceeded { max_depth: 2 }
    );

    let mut tree = hierarchy::Tree::new();
    let root = tree.insert(1);
    tree.insert_child(root, 2).unwrap();
    assert_eq!(tree.render(&settings.render).trim_end(), "1");
}
