//! Unit tests for configuration and graceful degradation
//!
//! Covers:
//! - Missing config files never cause termination
//! - Priority order for root folder resolution (CLI > env > TOML > default)
//! - Automatic directory creation
//! - TOML parsing of partial files
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TANDEM_ROOT_FOLDER or TANDEM_ROOT are marked with
//! #[serial] so they run sequentially.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tandem_common::config::{
    load_toml_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
    DEFAULT_PORT, DEFAULT_SESSION_TTL_SECS,
};
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var("TANDEM_ROOT_FOLDER");
    env::remove_var("TANDEM_ROOT");
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.to_string_lossy().contains("tandem"));
    assert_eq!(defaults.port, DEFAULT_PORT);
    assert_eq!(defaults.bind, "127.0.0.1");
    assert_eq!(defaults.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();

    let resolver = RootFolderResolver::new("test-module").with_toml_config(TomlConfig::default());
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_tandem_root_folder() {
    clear_root_env();
    let test_path = "/tmp/tandem-test-env-folder";
    env::set_var("TANDEM_ROOT_FOLDER", test_path);

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from(test_path));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_var_tandem_root() {
    clear_root_env();
    let test_path = "/tmp/tandem-test-env-root";
    env::set_var("TANDEM_ROOT", test_path);

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from(test_path));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_var_takes_precedence() {
    clear_root_env();
    env::set_var("TANDEM_ROOT_FOLDER", "/tmp/tandem-priority-1");
    env::set_var("TANDEM_ROOT", "/tmp/tandem-priority-2");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/tandem-priority-1"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    clear_root_env();
    env::set_var("TANDEM_ROOT_FOLDER", "/tmp/tandem-from-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/tandem-from-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/tandem-from-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_toml_used_when_no_env() {
    clear_root_env();

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/tandem-from-toml")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_config(config)
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/tandem-from-toml"));
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/tandem-test-root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert_eq!(initializer.database_path(), root.join("tandem.db"));
}

#[test]
fn test_initializer_database_exists() {
    let initializer = RootFolderInitializer::new(PathBuf::from("/tmp/tandem-test-nonexistent"));
    assert!(!initializer.database_exists());
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(initializer.ensure_directory_exists().is_ok());

    assert!(root.is_dir());
}

#[test]
fn test_load_full_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/tandem"
port = 8080
bind = "0.0.0.0"
session_ttl_secs = 3600

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/tandem")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.session_ttl_secs, Some(3600));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_partial_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = 9000\n").unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.port, Some(9000));
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_malformed_toml_config_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"\n").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, tandem_common::Error::Config(_)));
}

#[test]
fn test_load_missing_toml_config_is_io_error() {
    let err = load_toml_config(&PathBuf::from("/tmp/tandem-no-such-config.toml")).unwrap_err();
    assert!(matches!(err, tandem_common::Error::Io(_)));
}
