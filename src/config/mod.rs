//! Configuration module for db-auto-backup
//!
//! All settings come from environment variables and are read once, at
//! startup, into a [`Config`] that is passed down explicitly.
//!
//! ## Example Usage
//!
//! ```no_run
//! use db_auto_backup::config;
//!
//! let config = config::load_config_from_env()?;
//! println!("Backing up to {}", config.backup_dir.display());
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{ensure_docker_available, load_config, load_config_from_env, ConfigError, Result};
pub use types::*;
