use crate::providers::DumpOptions;
use crate::utils::compression::Compression;
use crate::utils::cron::CrontabSchedule;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKUP_DIR: &str = "/var/backups";
pub const DEFAULT_HEALTHCHECKS_HOST: &str = "hc-ping.com";
pub const DEFAULT_DOCKER_TIMEOUT_SECS: u64 = 60;
pub const LOCK_FILE_NAME: &str = "db-auto-backup.lock";

/// Root configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the dump files are written to
    pub backup_dir: PathBuf,

    /// Cron schedule; `None` runs a single pass
    pub schedule: Option<CrontabSchedule>,

    /// Compression applied to every dump
    pub compression: Compression,

    /// Options passed to the dump commands
    pub dump_options: DumpOptions,

    /// Success hook settings
    pub notifications: NotificationConfig,

    /// Timeout for docker inspection commands (not for dumps)
    pub docker_timeout: Duration,

    /// Lock file preventing overlapping passes across processes
    pub lock_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            schedule: None,
            compression: Compression::default(),
            dump_options: DumpOptions::default(),
            notifications: NotificationConfig::default(),
            docker_timeout: Duration::from_secs(DEFAULT_DOCKER_TIMEOUT_SECS),
            lock_file: default_lock_file(),
        }
    }
}

/// Success hook configuration
///
/// Only one target is used; see `managers::notification::resolve_hook_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    pub success_hook_url: Option<String>,
    pub healthchecks_id: Option<String>,
    pub healthchecks_host: Option<String>,
    pub uptime_kuma_url: Option<String>,

    /// POST the names of backed-up containers instead of a bare GET
    pub include_logs: bool,
}

pub fn default_lock_file() -> PathBuf {
    std::env::temp_dir().join(LOCK_FILE_NAME)
}
