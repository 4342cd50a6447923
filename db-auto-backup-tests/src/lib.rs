//! Test utilities for db-auto-backup
//!
//! This crate provides shared fixtures, a configuration builder and a test
//! context for exercising backup passes against mocked Docker operations.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockDockerOps, postgres_container};
//!
//! #[test]
//! fn my_test() {
//!     let (config, _dir) = ConfigBuilder::new().persist();
//!     let docker = MockDockerOps::new().with_container(postgres_container("db"));
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{OptionAssertions, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use db_auto_backup::config::{Config, NotificationConfig};
pub use db_auto_backup::managers::backup::{BackupManager, BackupReport};
pub use db_auto_backup::providers::{DumpOptions, Provider};
pub use db_auto_backup::utils::compression::Compression;
pub use db_auto_backup::utils::docker::ContainerInfo;

// Re-export mock implementations from the main crate
pub use db_auto_backup::utils::docker_ops::mock::{DockerCall, MockDockerOps};
pub use db_auto_backup::utils::docker_ops::DockerOperations;
pub use db_auto_backup::utils::executor::mock::{MockExecutor, MockResponse};
pub use db_auto_backup::utils::executor::CommandExecutor;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
