//! Error tracing extensions
//!
//! Provides utilities for enriching error handling with tracing context.

use crate::types::RelayError;
use std::error::Error as StdError;

/// Extension trait for adding tracing context to errors
pub trait ErrorTraceExt {
    /// Log error with full context including classification and error chain
    fn trace_error(&self) -> &Self;
}

impl ErrorTraceExt for RelayError {
    fn trace_error(&self) -> &Self {
        let is_startup = self.is_startup();
        let is_write_failure = self.is_write_failure();

        // Collect the source chain for the log record
        let mut error_chain = Vec::new();
        let mut current_source = self.source();
        while let Some(source) = current_source {
            error_chain.push(source.to_string());
            current_source = source.source();
        }

        tracing::error!(
            error = %self,
            is_startup = is_startup,
            is_write_failure = is_write_failure,
            error_chain_len = error_chain.len(),
            error_chain = ?error_chain,
            "Error occurred with full context"
        );

        self
    }
}

/// Extension trait for Result types
pub trait ResultTraceExt<T, E>: Sized {
    /// Convert error to RelayError and log with context
    fn trace_context(self) -> Result<T, RelayError>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultTraceExt<T, E> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
    RelayError: From<E>,
{
    fn trace_context(self) -> Result<T, RelayError> {
        self.map_err(|e| {
            let relay_error = RelayError::from(e);
            relay_error.trace_error();
            relay_error
        })
    }
}
