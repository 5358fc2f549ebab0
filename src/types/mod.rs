//! Public types for the relay
//!
//! This module contains all the shared types used across the crate.

mod config;
mod error;

pub use config::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT, RelayConfig};
pub use error::{RelayError, Result};
