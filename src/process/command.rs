//! Subprocess execution with captured output.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Why a subprocess did not succeed.
#[derive(Debug, Error)]
pub enum CommandCause {
    #[error("failed to spawn: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("exited with {0}")]
    Exit(ExitStatus),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A subprocess failure with its command line and combined output.
#[derive(Debug, Error)]
#[error("command `{command}` failed: {cause}{}", format_output(.output))]
pub struct CommandError {
    pub command: String,
    pub output: String,
    #[source]
    pub cause: CommandCause,
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Program plus arguments, kept for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run a command to completion and return its combined stdout and stderr.
///
/// With a timeout the child is killed once the deadline passes.
pub async fn run_command(
    command: &CommandLine,
    timeout: Option<Duration>,
) -> Result<String, CommandError> {
    tracing::debug!(command = %command, "Running command");

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| CommandError {
        command: command.to_string(),
        output: String::new(),
        cause: CommandCause::Spawn(e),
    })?;

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(CommandError {
                    command: command.to_string(),
                    output: String::new(),
                    cause: CommandCause::TimedOut(limit),
                });
            }
        },
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| CommandError {
        command: command.to_string(),
        output: String::new(),
        cause: CommandCause::Spawn(e),
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(combined)
    } else {
        Err(CommandError {
            command: command.to_string(),
            output: combined,
            cause: CommandCause::Exit(output.status),
        })
    }
}

/// Run a command that may leave daemonized children behind.
///
/// Output is inherited rather than captured, so only the exit status of the
/// launched process is awaited.
pub async fn run_inherited(
    command: &CommandLine,
    timeout: Option<Duration>,
) -> Result<(), CommandError> {
    tracing::debug!(command = %command, "Running command with inherited output");
    let failure = |cause| CommandError {
        command: command.to_string(),
        output: String::new(),
        cause,
    };

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| failure(CommandCause::Spawn(e)))?;

    let status = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait())
            .await
            .map_err(|_| failure(CommandCause::TimedOut(limit)))?,
        None => child.wait().await,
    }
    .map_err(|e| failure(CommandCause::Spawn(e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(failure(CommandCause::Exit(status)))
    }
}
