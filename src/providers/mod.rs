//! Database providers
//!
//! A provider pairs the image name patterns of one database engine family with
//! the command that dumps it. Registry order matters: the first provider (and
//! the first pattern within it) that matches a container wins.

pub mod commands;

use glob::Pattern;
use std::collections::HashMap;
use std::fmt;

pub use commands::{CredentialError, DumpOptions};

/// Supported database engine families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Postgres,
    Mysql,
    Redis,
}

/// All providers, in match order
pub const PROVIDERS: &[Provider] = &[Provider::Postgres, Provider::Mysql, Provider::Redis];

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Postgres => "postgres",
            Provider::Mysql => "mysql",
            Provider::Redis => "redis",
        }
    }

    /// Glob patterns matched against a container's candidate names
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Provider::Postgres => &[
                "postgres",
                "tensorchord/pgvecto-rs",
                "nextcloud/aio-postgresql",
                "timescale/timescaledb",
                "pgvector/pgvector",
                "pgautoupgrade/pgautoupgrade",
                "immich-app/postgres",
            ],
            Provider::Mysql => &["mysql", "mariadb", "linuxserver/mariadb"],
            Provider::Redis => &["redis"],
        }
    }

    /// Extension of the dump file, without compression suffix
    pub fn file_extension(&self) -> &'static str {
        match self {
            Provider::Postgres | Provider::Mysql => "sql",
            Provider::Redis => "rdb",
        }
    }

    /// Build the shell command that writes the dump to stdout
    ///
    /// `env` is the container's running environment, not the image's.
    pub fn build_command(
        &self,
        env: &HashMap<String, String>,
        options: &DumpOptions,
    ) -> Result<String, CredentialError> {
        match self {
            Provider::Postgres => Ok(commands::postgres(env, options)),
            Provider::Mysql => commands::mysql(env, options),
            Provider::Redis => Ok(commands::redis()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.patterns().iter().any(|pattern| {
            Pattern::new(pattern)
                .map(|p| p.matches(name))
                .unwrap_or(false)
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the provider for a container's candidate names
///
/// Candidates are tried in order against every provider before moving on to
/// the next candidate.
pub fn resolve_provider<S: AsRef<str>>(names: &[S]) -> Option<Provider> {
    names.iter().find_map(|name| {
        PROVIDERS
            .iter()
            .copied()
            .find(|provider| provider.matches(name.as_ref()))
    })
}
