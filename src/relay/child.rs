//! Shared handle to the relayed child process
//!
//! Wraps the spawned interpreter behind a cloneable handle so both relay
//! directions can query liveness, the input direction can write lines, and
//! the shutdown path can release stdin and reap, without concurrent access
//! to the underlying process handle.

use std::process::ExitStatus;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::{RelayConfig, RelayError, Result};

/// Handle to the relayed child process
///
/// Cheap to clone. Liveness queries go through the process handle's own
/// `try_wait` rather than a separate flag, so every clone observes the same
/// status. The child's stdin lives behind its own lock and is released
/// (dropped, closing the pipe) exactly once via [`RelayChild::release_stdin`].
#[derive(Debug, Clone)]
pub struct RelayChild {
    child: Arc<Mutex<tokio::process::Child>>,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
    command_line: String,
}

impl RelayChild {
    /// Spawn the configured child with all three stdio streams piped
    ///
    /// Returns the handle plus the stdout/stderr read ends, which the caller
    /// moves into its reader tasks. Spawn and missing-pipe errors are fatal
    /// startup errors.
    pub fn spawn(config: &RelayConfig) -> Result<(Self, ChildStdout, ChildStderr)> {
        let mut child = config
            .command()
            .spawn()
            .map_err(|e| RelayError::spawn_failed(config.command_line(), e))?;

        let stdin = child.stdin.take().ok_or(RelayError::StdinUnavailable)?;
        let stdout = child.stdout.take().ok_or(RelayError::StdoutUnavailable)?;
        let stderr = child.stderr.take().ok_or(RelayError::StderrUnavailable)?;

        debug!(pid = ?child.id(), command = %config.command_line(), "Spawned child process");

        let handle = Self {
            child: Arc::new(Mutex::new(child)),
            stdin: Arc::new(Mutex::new(Some(stdin))),
            command_line: config.command_line(),
        };
        Ok((handle, stdout, stderr))
    }

    /// Check whether the child is still running
    pub async fn is_alive(&self) -> bool {
        let mut child = self.child.lock().await;
        matches!(child.try_wait(), Ok(None))
    }

    /// Write one line plus terminator to the child's stdin and flush
    ///
    /// Flushing per line keeps each line visible to the child before the
    /// next one is read from the terminal.
    pub async fn write_line(&self, line: &str) -> Result<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(RelayError::StdinClosed)?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Drop the child's stdin write end, closing the pipe
    ///
    /// The first call closes; later calls find nothing to release. Writes
    /// after release fail with [`RelayError::StdinClosed`].
    pub async fn release_stdin(&self) {
        if self.stdin.lock().await.take().is_some() {
            debug!("Released child stdin");
        }
    }

    /// Forcibly terminate the child and reap it
    ///
    /// Idempotent: an already-exited or already-reaped child is success.
    pub async fn terminate(&self) -> Result<()> {
        let mut child = self.child.lock().await;
        if matches!(child.try_wait(), Ok(Some(_))) {
            return Ok(());
        }
        match child.start_kill() {
            Ok(()) => {}
            // InvalidInput here means the child was already reaped
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        child.wait().await?;
        debug!(command = %self.command_line, "Terminated child process");
        Ok(())
    }

    /// Wait for the child to exit and return its status
    pub async fn wait(&self) -> Result<ExitStatus> {
        let status = self.child.lock().await.wait().await?;
        Ok(status)
    }
}
