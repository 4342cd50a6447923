//! Unit tests for configuration loading and validation
//!
//! Tests that touch the real process environment are serialized.

use db_auto_backup::config::{load_config, load_config_from_env, ConfigError, DEFAULT_BACKUP_DIR};
use db_auto_backup::managers::notification::resolve_hook_url;
use serial_test::serial;
use std::path::PathBuf;
use std::time::Duration;
use test_utils::{Compression, EnvLookup};

fn load(vars: &[(&str, &str)]) -> Result<test_utils::Config, ConfigError> {
    let env = EnvLookup::new(vars);
    load_config(|key| env.get(key))
}

#[test]
fn test_defaults() {
    let config = load(&[]).unwrap();

    assert_eq!(config.backup_dir, PathBuf::from(DEFAULT_BACKUP_DIR));
    assert_eq!(config.compression, Compression::Plain);
    assert!(config.schedule.is_none());
    assert!(!config.notifications.include_logs);
    assert_eq!(resolve_hook_url(&config.notifications), None);
}

#[test]
fn test_all_settings() {
    let config = load(&[
        ("BACKUP_DIR", "/srv/backups"),
        ("SCHEDULE", "0 3 * * *"),
        ("COMPRESSION", "bz2"),
        ("INCLUDE_LOGS", "1"),
        ("CLEAN", "yes"),
        ("DOCKER_TIMEOUT", "15"),
        ("HEALTHCHECKS_ID", "abcd"),
        ("HEALTHCHECKS_HOST", "hc.example.com"),
    ])
    .unwrap();

    assert_eq!(config.backup_dir, PathBuf::from("/srv/backups"));
    assert!(config.schedule.is_some());
    assert_eq!(config.compression, Compression::Bzip2);
    assert!(config.notifications.include_logs);
    assert!(config.dump_options.clean);
    assert_eq!(config.docker_timeout, Duration::from_secs(15));
    assert_eq!(
        resolve_hook_url(&config.notifications).as_deref(),
        Some("https://hc.example.com/abcd")
    );
}

#[test]
fn test_empty_schedule_means_single_run() {
    let config = load(&[("SCHEDULE", "  ")]).unwrap();
    assert!(config.schedule.is_none());
}

#[test]
fn test_invalid_values_fail() {
    assert!(matches!(
        load(&[("COMPRESSION", "zip")]),
        Err(ConfigError::UnknownCompression(_))
    ));
    assert!(matches!(
        load(&[("SCHEDULE", "every night")]),
        Err(ConfigError::InvalidSchedule { .. })
    ));
    assert!(matches!(
        load(&[("DOCKER_TIMEOUT", "soon")]),
        Err(ConfigError::InvalidValue { name: "DOCKER_TIMEOUT", .. })
    ));
}

#[test]
fn test_reads_every_setting_once() {
    let env = EnvLookup::new(&[]);
    load_config(|key| env.get(key)).unwrap();

    let reads = env.reads();
    for key in ["BACKUP_DIR", "SCHEDULE", "COMPRESSION", "INCLUDE_LOGS", "CLEAN", "DOCKER_TIMEOUT"] {
        assert_eq!(reads.iter().filter(|k| *k == key).count(), 1, "{}", key);
    }
}

#[test]
#[serial]
fn test_load_from_process_env() {
    std::env::set_var("BACKUP_DIR", "/tmp/from-env");
    std::env::set_var("COMPRESSION", "gzip");

    let config = load_config_from_env();

    std::env::remove_var("BACKUP_DIR");
    std::env::remove_var("COMPRESSION");

    let config = config.unwrap();
    assert_eq!(config.backup_dir, PathBuf::from("/tmp/from-env"));
    assert_eq!(config.compression, Compression::Gzip);
}

#[test]
#[serial]
fn test_unknown_compression_from_process_env() {
    std::env::set_var("COMPRESSION", "rar");
    let result = load_config_from_env();
    std::env::remove_var("COMPRESSION");

    let err = result.unwrap_err();
    assert!(err.to_string().contains("rar"));
}
