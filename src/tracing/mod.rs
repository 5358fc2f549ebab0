//! Tracing helpers
//!
//! Extensions used at the points where errors are logged before being
//! swallowed or propagated.

mod error_ext;

pub use error_ext::{ErrorTraceExt, ResultTraceExt};
