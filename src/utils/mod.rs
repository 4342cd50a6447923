pub mod command;
pub mod compression;
pub mod cron;
pub mod docker;
pub mod image;
pub mod locker;

// Trait-based abstractions for testability
pub mod executor;
pub mod docker_ops;

// Re-export commonly used types and traits (used by test crate)
pub use compression::Compression;
pub use docker::ContainerInfo;
pub use docker_ops::{DockerOperations, RealDockerOps};
pub use executor::{CommandExecutor, RealExecutor};
