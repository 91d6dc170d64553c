//! Layered settings: defaults, local file, environment

use std::fs;

use rstest::rstest;
use tempfile::tempdir;
use treelink::config::{Settings, SettingsError};
use treelink::domain::Tree;

fn env(pairs: &[(&str, &str)]) -> config::Environment {
    let map: config::Map<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::environment().source(Some(map))
}

#[rstest]
fn given_no_sources_when_loading_then_defaults() {
    let settings = Settings::load_with(None, env(&[])).unwrap();
    assert_eq!(settings, Settings::default());
}

#[rstest]
fn given_local_file_when_loading_then_file_values_win() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treelink.toml");
    fs::write(
        &path,
        "strict = false\n\n[layout]\nsibling_separation = 2.0\nx_offset = -1.5\n",
    )
    .unwrap();

    let settings = Settings::load_with(Some(&path), env(&[])).unwrap();

    assert!(!settings.strict);
    assert_eq!(settings.layout.sibling_separation, 2.0);
    assert_eq!(settings.layout.x_offset, -1.5);
    assert_eq!(settings.layout.level_separation, 1.0);
}

#[rstest]
fn given_env_and_file_when_loading_then_env_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treelink.toml");
    fs::write(&path, "[layout]\nlevel_separation = 4.0\n").unwrap();

    let settings = Settings::load_with(
        Some(&path),
        env(&[
            ("TREELINK__LAYOUT__LEVEL_SEPARATION", "2.5"),
            ("TREELINK__STRICT", "false"),
        ]),
    )
    .unwrap();

    assert_eq!(settings.layout.level_separation, 2.5);
    assert!(!settings.strict);
}

#[rstest]
fn given_missing_local_file_when_loading_then_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let result = Settings::load_with(Some(&path), env(&[]));
    assert!(matches!(result, Err(SettingsError::NotFound(p)) if p == path));
}

#[rstest]
fn given_negative_separation_in_file_when_loading_then_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treelink.toml");
    fs::write(&path, "[layout]\nsubtree_separation = -1.0\n").unwrap();
    let result = Settings::load_with(Some(&path), env(&[]));
    assert!(matches!(
        result,
        Err(SettingsError::Invalid {
            key: "layout.subtree_separation",
            ..
        })
    ));
}

#[rstest]
fn given_malformed_file_when_loading_then_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treelink.toml");
    fs::write(&path, "[layout\nsibling_separation = ").unwrap();
    let result = Settings::load_with(Some(&path), env(&[]));
    assert!(matches!(result, Err(SettingsError::Config(_))));
}

#[rstest]
#[case::strict(true)]
#[case::lenient(false)]
fn given_settings_when_creating_forest_then_strict_flag_applied(#[case] strict: bool) {
    let settings = Settings {
        strict,
        ..Settings::default()
    };
    let tree: Tree = settings.forest();
    assert_eq!(tree.strict(), strict);
    assert!(tree.is_empty());
}
