//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for command execution,
//! enabling dependency injection and mocking for tests.

use anyhow::Result;
use std::io::Write;
use std::process::Output;
use std::time::Duration;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command with optional timeout
    fn run_command(&self, program: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output>;

    /// Run a command and return stdout as string
    fn run_command_stdout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<String> {
        let output = self.run_command(program, args, timeout)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command, streaming stdout into `sink`
    fn stream_command(&self, program: &str, args: &[&str], sink: &mut dyn Write) -> Result<u64>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run_command(&self, program: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
        super::command::run_command(program, args, timeout)
    }

    fn stream_command(&self, program: &str, args: &[&str], sink: &mut dyn Write) -> Result<u64> {
        super::command::stream_command(program, args, sink)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
    }

    impl CommandCall {
        /// Program and arguments joined with spaces
        pub fn command_line(&self) -> String {
            std::iter::once(self.program.as_str())
                .chain(self.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String, stderr: String },
        Failure { stderr: String, exit_code: i32 },
        Timeout,
    }

    impl MockResponse {
        /// Successful response with the given stdout
        pub fn stdout(stdout: impl Into<String>) -> Self {
            MockResponse::Success {
                stdout: stdout.into(),
                stderr: String::new(),
            }
        }
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    /// Mock executor for testing
    ///
    /// Responses are keyed by a command-line prefix such as `docker ps`; the
    /// longest matching prefix wins.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: command-line prefix -> response
        responses: Arc<Mutex<Vec<(String, MockResponse)>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for commands starting with `prefix`
        pub fn expect(self, prefix: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push((prefix.to_string(), response));
            self
        }

        /// Set the default response for unconfigured commands
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a command starting with `prefix` was run
        pub fn was_called(&self, prefix: &str) -> bool {
            self.call_count(prefix) > 0
        }

        /// Get number of commands starting with `prefix`
        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.command_line().starts_with(prefix))
                .count()
        }

        fn record_call(&self, program: &str, args: &[&str]) -> CommandCall {
            let call = CommandCall {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            };
            self.calls.lock().unwrap().push(call.clone());
            call
        }

        fn get_response(&self, call: &CommandCall) -> MockResponse {
            let line = call.command_line();
            self.responses
                .lock()
                .unwrap()
                .iter()
                .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
                .max_by_key(|(prefix, _)| prefix.len())
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
        }

        fn execute_response(&self, response: MockResponse) -> Result<Output> {
            match response {
                MockResponse::Success { stdout, stderr } => Ok(Output {
                    status: std::process::ExitStatus::default(),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                MockResponse::Failure { stderr, exit_code } => {
                    anyhow::bail!("Command failed with exit code {:?}: {}", exit_code, stderr)
                }
                MockResponse::Timeout => {
                    anyhow::bail!("Command timed out")
                }
            }
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run_command(
            &self,
            program: &str,
            args: &[&str],
            _timeout: Option<Duration>,
        ) -> Result<Output> {
            let call = self.record_call(program, args);
            let response = self.get_response(&call);
            self.execute_response(response)
        }

        fn stream_command(&self, program: &str, args: &[&str], sink: &mut dyn Write) -> Result<u64> {
            let call = self.record_call(program, args);
            let response = self.get_response(&call);
            let output = self.execute_response(response)?;
            sink.write_all(&output.stdout)?;
            Ok(output.stdout.len() as u64)
        }
    }
}
