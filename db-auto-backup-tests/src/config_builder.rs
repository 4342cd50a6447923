//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations whose paths
//! all live inside a temporary directory.

use db_auto_backup::config::{Config, NotificationConfig};
use db_auto_backup::providers::DumpOptions;
use db_auto_backup::utils::compression::Compression;
use db_auto_backup::utils::cron::parse_schedule;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    config: Config,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with defaults rooted in a temp dir
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            backup_dir: temp_dir.path().join("backups"),
            lock_file: temp_dir.path().join("db-auto-backup.lock"),
            ..Config::default()
        };

        Self { temp_dir, config }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    /// Set the schedule from a cron expression
    pub fn with_schedule(mut self, expression: &str) -> Self {
        self.config.schedule = Some(parse_schedule(expression).expect("Invalid test schedule"));
        self
    }

    pub fn with_clean(mut self) -> Self {
        self.config.dump_options = DumpOptions { clean: true };
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.docker_timeout = Duration::from_secs(seconds);
        self
    }

    pub fn with_backup_dir(mut self, path: &Path) -> Self {
        self.config.backup_dir = path.to_path_buf();
        self
    }

    pub fn with_success_hook(mut self, url: &str, include_logs: bool) -> Self {
        self.config.notifications = NotificationConfig {
            success_hook_url: Some(url.to_string()),
            include_logs,
            ..NotificationConfig::default()
        };
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationConfig) -> Self {
        self.config.notifications = notifications;
        self
    }

    /// Get the temp dir path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.config.backup_dir.clone()
    }

    /// Build the config (temp dir is dropped, so paths stop existing)
    pub fn build(self) -> Config {
        self.config
    }

    /// Build the config and keep its temp dir alive
    pub fn persist(self) -> (Config, TempDir) {
        (self.config, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
