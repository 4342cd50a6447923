//! Test context and harness for backup pass testing
//!
//! Provides a unified context that owns the temporary backup directory and
//! offers helpers for inspecting what a pass left behind.

use crate::config_builder::ConfigBuilder;
use anyhow::Result;
use db_auto_backup::config::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory holding backups and the lock file
    temp_dir: TempDir,
    /// The test configuration
    config: Config,
}

impl TestContext {
    /// Create a test context with the default configuration
    pub fn new() -> Self {
        Self::from_builder(ConfigBuilder::new())
    }

    /// Create a test context from a ConfigBuilder
    pub fn from_builder(builder: ConfigBuilder) -> Self {
        let (config, temp_dir) = builder.persist();
        Self { temp_dir, config }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backup_dir(&self) -> &Path {
        &self.config.backup_dir
    }

    pub fn backup_path(&self, name: &str) -> PathBuf {
        self.config.backup_dir.join(name)
    }

    /// Names of all entries in the backup directory, sorted
    ///
    /// Includes hidden files, so leftover temp files show up.
    pub fn backup_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.config.backup_dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Read a backup file
    pub fn read_backup(&self, name: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.backup_path(name))?)
    }

    /// Unix permission bits of a backup file
    #[cfg(unix)]
    pub fn backup_mode(&self, name: &str) -> Result<u32> {
        use std::os::unix::fs::PermissionsExt;
        Ok(std::fs::metadata(self.backup_path(name))?.permissions().mode() & 0o777)
    }

    /// Create a file in the backup directory
    pub fn create_backup_file(&self, name: &str, content: &[u8]) -> PathBuf {
        std::fs::create_dir_all(&self.config.backup_dir).expect("Failed to create backup dir");
        let path = self.backup_path(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and the error message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> ResultAssertions<T> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = format!("{:?}", e);
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}

/// Extension trait for Option assertions
pub trait OptionAssertions<T> {
    /// Assert that the option is Some and return the value
    fn assert_some(self) -> T;

    /// Assert that the option is None
    fn assert_none(self);
}

impl<T: std::fmt::Debug> OptionAssertions<T> for Option<T> {
    fn assert_some(self) -> T {
        match self {
            Some(v) => v,
            None => panic!("Expected Some, got None"),
        }
    }

    fn assert_none(self) {
        if let Some(v) = self {
            panic!("Expected None, got Some: {:?}", v);
        }
    }
}
