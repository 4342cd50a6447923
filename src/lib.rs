//! Database Auto Backup Library
//!
//! Discovers database containers on the local Docker host and dumps each one
//! into a backup directory, optionally compressed.

pub mod config;
pub mod managers;
pub mod providers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, load_config_from_env, Config};
pub use managers::backup::{BackupManager, BackupReport};
pub use managers::logging::{init_logging, LogFormat};
pub use managers::notification::NotificationManager;
pub use providers::{resolve_provider, Provider};
