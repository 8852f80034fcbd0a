//! Integration tests for Settings loading.
//!
//! These tests write config files into temp directories and never touch the
//! global config location, so they exercise defaults plus an explicit file.
//! Environment overrides live in `config_env_test.rs`, in their own process.

use std::fs;

use tempfile::TempDir;

use nodetree::{Backend, IndexedTree, NodeTree, Settings, TreeError};

#[test]
fn given_no_file_when_using_defaults_then_linked_with_cycle_checks() {
    let settings = Settings::default();
    assert_eq!(settings.backend, Backend::Linked);
    assert_eq!(settings.capacity, 64);
    assert!(settings.check_cycles);
}

#[test]
fn given_partial_file_when_loading_then_merges_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    fs::write(&path, "backend = \"indexed\"\n").unwrap();

    let settings = Settings::from_file(&path).expect("load settings");

    assert_eq!(settings.backend, Backend::Indexed);
    assert_eq!(settings.capacity, 64);
    assert!(settings.check_cycles);
}

#[test]
fn given_local_file_when_layered_load_then_local_values_win() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.toml");
    fs::write(&path, "capacity = 3\ncheck_cycles = false\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.capacity, 3);
    assert!(!settings.check_cycles);
}

#[test]
fn given_missing_local_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, TreeError::Config { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn given_unknown_backend_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "backend = \"skiplist\"\n").unwrap();

    let err = Settings::from_file(&path).unwrap_err();
    assert!(matches!(err, TreeError::Config { .. }));
}

#[test]
fn given_cycle_checks_disabled_when_building_tree_then_moves_still_link() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    fs::write(&path, "check_cycles = false\n").unwrap();
    let settings = Settings::from_file(&path).unwrap();

    let mut tree = IndexedTree::with_settings(&settings);
    let root = tree.insert("root");
    let leaf = tree.insert("leaf");
    tree.append(root, &[leaf]).unwrap();
    tree.prepend(root, &[leaf]).unwrap();
    assert_eq!(tree.children_slice(root), &[leaf]);
}

#[test]
fn given_settings_when_rendered_then_file_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundtrip.toml");
    let settings = Settings {
        backend: Backend::Indexed,
        capacity: 7,
        check_cycles: false,
    };
    fs::write(&path, settings.to_toml().unwrap()).unwrap();

    assert_eq!(Settings::from_file(&path).unwrap(), settings);
}
