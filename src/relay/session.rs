//! Bidirectional line relay between a terminal and the child process
//!
//! Two independent directions run concurrently:
//!
//! - a spawned task reads terminal input lines and writes each one to the
//!   child's stdin, flushing per line;
//! - the main path receives child output lines and writes them to the
//!   terminal. The child's stdout and stderr are merged at line granularity
//!   by one reader task per pipe feeding a single channel.
//!
//! The relay ends when the merged output stream does. Shutdown then
//! terminates the child (a no-op when it already exited), releases its stdin
//! exactly once, and reaps it.

use std::process::ExitStatus;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::relay::child::RelayChild;
use crate::tracing::ErrorTraceExt;
use crate::types::{RelayConfig, Result};

/// Fixed notice printed on the terminal after a failed write forces the
/// child down
pub const CHILD_TERMINATED_NOTICE: &str = "Python program terminated.";

/// Run the relay against the configured child until its output ends
///
/// Spawns `<interpreter> <script> [args...]`, relays `input` lines to the
/// child's stdin and the child's merged stdout/stderr lines to `output`,
/// and returns the child's exit status once its output stream closes.
///
/// Spawn problems surface as startup errors before anything is relayed. A
/// failed write to the child mid-session is recovered inside the input
/// direction: the error message and [`CHILD_TERMINATED_NOTICE`] are printed
/// to `output` and the child is terminated.
///
/// If `input` ends while the child is alive, the input direction stops but
/// the child's stdin stays open and its output keeps being relayed until the
/// child exits on its own.
pub async fn run<R, W>(config: &RelayConfig, input: R, output: W) -> Result<ExitStatus>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    info!(command = %config.command_line(), "Starting relay");
    let (child, stdout, stderr) = RelayChild::spawn(config)?;

    // Small capacity keeps backpressure close to the OS pipes instead of
    // buffering child output in memory.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
    spawn_output_reader("stdout", stdout, line_tx.clone());
    spawn_output_reader("stderr", stderr, line_tx);

    let terminal = Arc::new(Mutex::new(output));
    spawn_input_relay(child.clone(), input, Arc::clone(&terminal));

    // Main path: drain the merged output stream. The channel closes once
    // both pipe readers hit end-of-stream, which is also how a spontaneous
    // child exit is observed.
    while let Some(line) = line_rx.recv().await {
        if let Err(e) = write_terminal_line(&terminal, &line).await {
            warn!(error = %e, "Terminal write failed, stopping output relay");
            break;
        }
    }
    debug!("Merged output stream ended");

    // Terminate before releasing stdin: a write blocked on a full stdin
    // pipe holds the stdin lock until the kill fails the write.
    if let Err(e) = child.terminate().await {
        warn!(error = %e, "Failed to terminate child at shutdown");
    }
    child.release_stdin().await;
    let status = child.wait().await?;
    info!(?status, "Child process exited");

    Ok(status)
}

/// Forward lines from one child output pipe into the merged channel
fn spawn_output_reader<S>(stream_name: &'static str, stream: S, tx: mpsc::Sender<String>)
where
    S: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                warn!(stream = stream_name, "Merged output channel closed");
                break;
            }
        }
        debug!(stream = stream_name, "Output reader finished");
    });
}

/// Relay terminal input lines to the child's stdin
///
/// Liveness is checked before each blocking read, so a child that dies while
/// this task waits for input is only discovered by the failed write that
/// follows, which is reported on the terminal.
fn spawn_input_relay<R, W>(child: RelayChild, input: R, terminal: Arc<Mutex<W>>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        loop {
            if !child.is_alive().await {
                debug!("Child no longer alive, stopping input relay");
                break;
            }
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    // Input closed while the child lives: stop relaying input
                    // but leave the child's stdin open so it sees no EOF.
                    debug!("Terminal input closed, stopping input relay");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Terminal input read failed, stopping input relay");
                    break;
                }
            };
            if let Err(e) = child.write_line(&line).await {
                e.trace_error();
                if let Err(report_err) = write_terminal_line(&terminal, &e.to_string()).await {
                    warn!(error = %report_err, "Failed to report write failure on terminal");
                }
                if let Err(term_err) = child.terminate().await {
                    warn!(error = %term_err, "Failed to terminate child after write failure");
                }
                if let Err(report_err) =
                    write_terminal_line(&terminal, CHILD_TERMINATED_NOTICE).await
                {
                    warn!(error = %report_err, "Failed to print terminated notice");
                }
                break;
            }
        }
    });
}

/// Write one line plus terminator to the shared terminal sink and flush
///
/// The lock is held for the whole line, so lines from the two directions
/// never interleave mid-line. Ordering across directions stays unspecified.
async fn write_terminal_line<W>(terminal: &Mutex<W>, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = terminal.lock().await;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
