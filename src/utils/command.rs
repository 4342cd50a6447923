//! Utilities for running commands with proper error handling and timeouts

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

/// Run a command with optional timeout
pub fn run_command(program: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!("Running command: {} {}", program, args.join(" "));

    let output = if let Some(timeout_duration) = timeout {
        // The pass itself is synchronous, so a throwaway runtime drives the timeout
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime for command timeout")?;

        runtime.block_on(async {
            let mut cmd = tokio::process::Command::from(cmd);
            cmd.kill_on_drop(true);

            match tokio::time::timeout(timeout_duration, cmd.output()).await {
                Ok(output) => output.context(format!("Failed to execute {}", program)),
                Err(_) => Err(anyhow::anyhow!("Command timed out after {:?}", timeout_duration)),
            }
        })?
    } else {
        cmd.output()
            .context(format!("Failed to execute {}", program))?
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("Command failed: {} {}: {}", program, args.join(" "), stderr.trim());
        anyhow::bail!(
            "Command failed with exit code {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
    }

    Ok(output)
}

/// Run a command and return stdout as string
pub fn run_command_stdout(program: &str, args: &[&str], timeout: Option<Duration>) -> Result<String> {
    let output = run_command(program, args, timeout)?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a command, copying its stdout into `sink` as it arrives
///
/// Stderr is collected separately and only used for the error message.
/// Returns the number of bytes copied.
pub fn stream_command(program: &str, args: &[&str], sink: &mut dyn Write) -> Result<u64> {
    debug!("Streaming command: {} {}", program, args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context(format!("Failed to spawn {}", program))?;

    let mut stdout = child.stdout.take().context("Failed to capture stdout")?;
    let mut stderr = child.stderr.take().context("Failed to capture stderr")?;

    // Drain stderr concurrently, a full stderr pipe would stall the child
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        buf
    });

    let copied = io::copy(&mut stdout, sink);

    // Reap the child even if the copy failed
    if copied.is_err() {
        let _ = child.kill();
    }
    let status = child.wait().context(format!("Failed to wait for {}", program))?;
    let stderr = stderr_reader.join().unwrap_or_default();

    let bytes = copied.context("Failed to copy command output")?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        error!("Command failed: {} {}", program, args.join(" "));
        anyhow::bail!(
            "Command failed with exit code {:?}: {}",
            status.code(),
            stderr.trim()
        );
    }

    Ok(bytes)
}
