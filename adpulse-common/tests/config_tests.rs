//! Configuration resolution tests
//!
//! Tests touching ADPULSE_* environment variables are marked #[serial] so
//! they never run concurrently.

use adpulse_common::config::{
    load_toml_config, CliOverrides, Settings, TomlConfig, DEFAULT_API_PORT, ENV_API_PORT,
    ENV_DB_PATH, ENV_REPORTS_DIR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var(ENV_DB_PATH);
    env::remove_var(ENV_REPORTS_DIR);
    env::remove_var(ENV_API_PORT);
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());

    assert_eq!(settings.api_port, DEFAULT_API_PORT);
    assert_eq!(settings.api_host, "127.0.0.1");
    assert_eq!(settings.reports_dir, PathBuf::from("reports"));
    assert!(settings.db_path.ends_with("adpulse.db"));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_DB_PATH, "/tmp/adpulse-env.db");

    let toml_config = TomlConfig {
        db_path: Some(PathBuf::from("/tmp/adpulse-toml.db")),
        reports_dir: Some(PathBuf::from("/tmp/adpulse-toml-reports")),
        ..Default::default()
    };
    let settings = Settings::resolve(&CliOverrides::default(), &toml_config);

    assert_eq!(settings.db_path, PathBuf::from("/tmp/adpulse-env.db"));
    assert_eq!(settings.reports_dir, PathBuf::from("/tmp/adpulse-toml-reports"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_API_PORT, "9001");

    let cli = CliOverrides {
        api_port: Some(9500),
        ..Default::default()
    };
    let settings = Settings::resolve(&cli, &TomlConfig::default());
    assert_eq!(settings.api_port, 9500);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_port_env_falls_through() {
    clear_env();
    env::set_var(ENV_API_PORT, "not-a-port");

    let toml_config = TomlConfig {
        api_port: Some(8123),
        ..Default::default()
    };
    let settings = Settings::resolve(&CliOverrides::default(), &toml_config);
    assert_eq!(settings.api_port, 8123);

    clear_env();
}

#[test]
fn test_load_toml_config_reads_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "db_path = \"/srv/adpulse/adpulse.db\"\nreports_dir = \"/srv/adpulse/reports\"\napi_host = \"0.0.0.0\"\napi_port = 8080\n",
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.db_path, Some(PathBuf::from("/srv/adpulse/adpulse.db")));
    assert_eq!(config.api_host.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.api_port, Some(8080));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_port = \"eighty\"\n").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
}
