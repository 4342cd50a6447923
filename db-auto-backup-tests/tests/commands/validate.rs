//! Tests for the 'validate' command
//!
//! Validation loads the configuration and reports any bad value before a
//! container is touched.

use db_auto_backup::config::{load_config, ConfigError};
use db_auto_backup::managers::notification::{resolve_hook_url, NotificationManager};
use test_utils::{EnvLookup, ResultAssertions};

fn validate(vars: &[(&str, &str)]) -> Result<test_utils::Config, ConfigError> {
    let env = EnvLookup::new(vars);
    load_config(|key| env.get(key))
}

#[test]
fn test_validate_minimal() {
    validate(&[]).assert_ok();
}

#[test]
fn test_validate_rejects_bad_compression() {
    validate(&[("COMPRESSION", "bogus")]).assert_err_contains("bogus");
}

#[test]
fn test_validate_rejects_bad_schedule() {
    validate(&[("SCHEDULE", "61 * * * *")]).assert_err_contains("InvalidSchedule");
}

#[test]
fn test_validate_rejects_zero_timeout() {
    validate(&[("DOCKER_TIMEOUT", "0")]).assert_err_contains("DOCKER_TIMEOUT");
}

#[test]
fn test_validate_hook_precedence() {
    let config = validate(&[
        ("SUCCESS_HOOK_URL", "https://example.com/hook"),
        ("HEALTHCHECKS_ID", "1234"),
        ("UPTIME_KUMA_URL", "https://kuma.example.com/api/push/x"),
    ])
    .assert_ok();

    assert_eq!(
        resolve_hook_url(&config.notifications).as_deref(),
        Some("https://example.com/hook")
    );

    let manager = NotificationManager::from_config(&config.notifications).unwrap();
    assert_eq!(manager.url(), "https://example.com/hook");
}

#[test]
fn test_validate_uptime_kuma_only() {
    let config = validate(&[("UPTIME_KUMA_URL", "https://kuma.example.com/api/push/x")]).assert_ok();

    assert_eq!(
        resolve_hook_url(&config.notifications).as_deref(),
        Some("https://kuma.example.com/api/push/x")
    );
}
