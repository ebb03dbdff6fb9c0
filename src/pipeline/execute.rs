//! Process execution: run the assembled command and capture its outcome.
//!
//! Execution sits behind [`CommandExecutor`] so the request logic can be
//! exercised without Ghostscript installed. [`SystemExecutor`] is the real
//! thing: it spawns the program with the raw argv tokens directly (no
//! shell), waits for it, and keeps stderr for diagnostics. There is no
//! timeout; a hung Ghostscript blocks the caller.

use crate::command::RenderCommand;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// What a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Everything the process wrote to stdout.
    pub stdout: String,
    /// Everything the process wrote to stderr.
    pub stderr: String,
}

impl ExecOutput {
    /// Only an exit code of exactly zero counts as success.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a [`RenderCommand`] synchronously.
///
/// Implementations must be `Send + Sync` so a request can be moved onto a
/// blocking thread by [`crate::RenderRequest::render_async`].
pub trait CommandExecutor: Send + Sync {
    /// Run `command` with `program` as the executable and block until it
    /// exits. An `Err` means the process never ran.
    fn execute(&self, program: &Path, command: &RenderCommand) -> io::Result<ExecOutput>;
}

/// Spawns the command as a child process of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &Path, command: &RenderCommand) -> io::Result<ExecOutput> {
        debug!("Spawning: {}", command);

        let output = Command::new(program)
            .args(command.argv_os())
            .stdin(Stdio::null())
            .output()?;

        Ok(ExecOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
