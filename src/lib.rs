//! pyrelay
//!
//! A line-oriented terminal relay for a Python child process: lines typed on
//! the terminal are forwarded to the child's stdin, and lines the child
//! writes (stdout and stderr, merged) are forwarded back to the terminal.
//!
//! ## Features
//!
//! - Two independent relay directions running concurrently
//! - Child stderr merged into the relayed output at line granularity
//! - Write-failure recovery with an on-terminal error message and notice
//! - Idempotent child termination and clean reaping on shutdown
//!
//! ## Quick Start
//!
//! ```no_run
//! use pyrelay::run_relay;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let status = run_relay().await?;
//!     println!("child exited: {status}");
//!     Ok(())
//! }
//! ```
//!
//! Or with an explicit invocation and your own streams:
//!
//! ```no_run
//! use pyrelay::{RelayConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::new("python3", "bot.py");
//!     run(&config, tokio::io::stdin(), tokio::io::stdout()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! - `PYRELAY_PYTHON`: Interpreter binary (same as `--python`)
//! - `RUST_LOG`: Log filter, takes priority over `-v`/`-q`

pub mod cli;
pub mod relay;
pub mod tracing;
pub mod types;

pub use cli::Cli;
pub use relay::{CHILD_TERMINATED_NOTICE, RelayChild, run, run_relay, run_relay_with_cli};
pub use types::{RelayConfig, RelayError, Result};
