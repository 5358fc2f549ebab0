//! Line relay implementation
//!
//! This module provides the relay core that handles:
//! - Spawning the interpreter child with piped stdio
//! - The two concurrent relay directions (terminal input to the child,
//!   child output back to the terminal)
//! - Write-failure recovery, shutdown ordering and child reaping

mod child;
mod runner;
mod session;

pub use child::RelayChild;
pub use runner::{run_relay, run_relay_with_cli};
pub use session::{CHILD_TERMINATED_NOTICE, run};
