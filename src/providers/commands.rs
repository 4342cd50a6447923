//! Dump commands for each provider
//!
//! Commands are executed with `sh -c` inside the target container.

use std::collections::HashMap;

/// Variables holding the root password, in order of preference
pub const MYSQL_PASSWORD_VARS: &[&str] = &["MARIADB_ROOT_PASSWORD", "MYSQL_ROOT_PASSWORD"];

const DEFAULT_POSTGRES_USER: &str = "postgres";

/// Location of the snapshot written by `SAVE` in the official redis image
const REDIS_DUMP_PATH: &str = "/data/dump.rdb";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no root password in container environment (expected one of: {})", MYSQL_PASSWORD_VARS.join(", "))]
    MissingPassword,
}

/// Options shared by all dump commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Emit statements that drop existing objects before recreating them
    pub clean: bool,
}

pub fn postgres(env: &HashMap<String, String>, options: &DumpOptions) -> String {
    let user = env
        .get("POSTGRES_USER")
        .filter(|u| !u.is_empty())
        .map(String::as_str)
        .unwrap_or(DEFAULT_POSTGRES_USER);

    let mut command = format!("pg_dumpall --username={}", shell_quote(user));
    if options.clean {
        command.push_str(" --clean --if-exists");
    }
    command
}

/// The password is referenced by variable name and expanded by the container's shell
pub fn mysql(env: &HashMap<String, String>, options: &DumpOptions) -> Result<String, CredentialError> {
    let password_var = MYSQL_PASSWORD_VARS
        .iter()
        .find(|var| env.contains_key(**var))
        .ok_or(CredentialError::MissingPassword)?;

    let mut command = format!(
        "\"$(command -v mariadb-dump || echo mysqldump)\" --all-databases --user=root --password=\"${}\"",
        password_var
    );
    if options.clean {
        command.push_str(" --add-drop-database");
    }
    Ok(command)
}

/// `SAVE` blocks writes on the server until the snapshot is on disk
pub fn redis() -> String {
    format!("redis-cli SAVE > /dev/null && cat {}", REDIS_DUMP_PATH)
}

/// Quote a value for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Parse `env` output into a map
pub fn parse_env(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
