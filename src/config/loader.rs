use super::types::*;
use crate::providers::DumpOptions;
use crate::utils::compression::{Compression, UnknownCompression};
use crate::utils::cron::parse_schedule;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    UnknownCompression(#[from] UnknownCompression),

    #[error("Invalid schedule '{schedule}': {source}")]
    InvalidSchedule {
        schedule: String,
        #[source]
        source: cron::error::Error,
    },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("docker CLI not found: {0}")]
    DockerNotFound(#[from] which::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load configuration from the process environment
pub fn load_config_from_env() -> Result<Config> {
    load_config(|key| std::env::var(key).ok())
}

/// Load configuration through a variable lookup
///
/// Empty values are treated as unset. Every value is validated here so that a
/// bad setting fails before any container is touched.
pub fn load_config<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let backup_dir = get("BACKUP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));

    let compression = match get("COMPRESSION") {
        Some(token) => token.parse::<Compression>()?,
        None => Compression::default(),
    };

    let schedule = get("SCHEDULE")
        .map(|expr| {
            parse_schedule(&expr).map_err(|source| ConfigError::InvalidSchedule {
                schedule: expr.clone(),
                source,
            })
        })
        .transpose()?;

    let docker_timeout = match get("DOCKER_TIMEOUT") {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue {
                    name: "DOCKER_TIMEOUT",
                    value,
                })
            }
        },
        None => Duration::from_secs(DEFAULT_DOCKER_TIMEOUT_SECS),
    };

    let notifications = NotificationConfig {
        success_hook_url: get("SUCCESS_HOOK_URL"),
        healthchecks_id: get("HEALTHCHECKS_ID"),
        healthchecks_host: get("HEALTHCHECKS_HOST"),
        uptime_kuma_url: get("UPTIME_KUMA_URL"),
        include_logs: get("INCLUDE_LOGS").is_some_and(|v| is_truthy(&v)),
    };

    let dump_options = DumpOptions {
        clean: get("CLEAN").is_some_and(|v| is_truthy(&v)),
    };

    Ok(Config {
        backup_dir,
        schedule,
        compression,
        dump_options,
        notifications,
        docker_timeout,
        lock_file: default_lock_file(),
    })
}

/// Make sure the docker CLI can be found before starting a pass
pub fn ensure_docker_available() -> Result<PathBuf> {
    Ok(which::which("docker")?)
}

/// Flags are on when set, unless explicitly switched off
fn is_truthy(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "0" | "false" | "no" | "off")
}
