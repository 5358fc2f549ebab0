//! Error types for the relay

use thiserror::Error;

/// Main error type for the relay
#[derive(Debug, Error)]
pub enum RelayError {
    // === Startup errors ===
    /// Child process could not be spawned
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Child stdin pipe was not available after spawn
    #[error("Child process has no stdin pipe")]
    StdinUnavailable,

    /// Child stdout pipe was not available after spawn
    #[error("Child process has no stdout pipe")]
    StdoutUnavailable,

    /// Child stderr pipe was not available after spawn
    #[error("Child process has no stderr pipe")]
    StderrUnavailable,

    // === Relay errors ===
    /// Write attempted after the child's stdin was released
    #[error("Child stdin is closed")]
    StdinClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the relay
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Check if this error occurred before the relay could start
    ///
    /// Startup errors are fatal: they propagate to the caller and the
    /// program exits without relaying anything. Everything else is a
    /// per-direction failure recovered inside the relay.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            RelayError::Spawn { .. }
                | RelayError::StdinUnavailable
                | RelayError::StdoutUnavailable
                | RelayError::StderrUnavailable
        )
    }

    /// Check if this error is a failed write to the child's stdin
    pub fn is_write_failure(&self) -> bool {
        matches!(self, RelayError::StdinClosed | RelayError::Io(_))
    }

    // === Constructor helpers ===

    /// Create a spawn error carrying the attempted command line
    pub fn spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        RelayError::Spawn {
            command: command.into(),
            source,
        }
    }
}
