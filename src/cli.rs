//! Command-line interface definitions
//!
//! Provides CLI argument parsing using clap for the relay binary.

use std::path::PathBuf;

use clap::Parser;

use crate::types::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT, RelayConfig};

/// pyrelay - Run a Python program behind a line-oriented terminal relay
#[derive(Parser, Debug, Clone)]
#[command(name = "pyrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Python script to run
    #[arg(value_name = "SCRIPT", default_value = DEFAULT_SCRIPT)]
    pub script: PathBuf,

    /// Arguments passed through to the script (after `--`)
    #[arg(value_name = "ARGS", last = true)]
    pub script_args: Vec<String>,

    /// Python interpreter to run the script with
    #[arg(
        short,
        long,
        value_name = "BIN",
        default_value = DEFAULT_INTERPRETER,
        env = "PYRELAY_PYTHON"
    )]
    pub python: PathBuf,

    /// Working directory for the child process
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable diagnostic mode (auto-log to temp file)
    #[arg(short, long)]
    pub diagnostic: bool,

    /// Log directory (implies diagnostic mode)
    #[arg(short = 'l', long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log file name (implies diagnostic mode)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub log_file: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    /// Note: RUST_LOG env var takes priority over this flag
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors)
    /// Note: RUST_LOG env var takes priority over this flag
    #[arg(short, long)]
    pub quiet: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            script: PathBuf::from(DEFAULT_SCRIPT),
            script_args: Vec::new(),
            python: PathBuf::from(DEFAULT_INTERPRETER),
            cwd: None,
            diagnostic: false,
            log_dir: None,
            log_file: None,
            verbose: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Build the child invocation settings from the parsed arguments
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            interpreter: self.python.clone(),
            script: self.script.clone(),
            script_args: self.script_args.clone(),
            cwd: self.cwd.clone(),
        }
    }

    /// Check if diagnostic mode is enabled (output to file)
    ///
    /// Returns true if `--diagnostic` is set, or if `--log-dir` or `--log-file` is specified.
    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic || self.log_dir.is_some() || self.log_file.is_some()
    }

    /// Get the log level based on CLI arguments
    ///
    /// - `--quiet`: ERROR
    /// - default: INFO
    /// - `-v`: DEBUG
    /// - `-vv` or more: TRACE
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else {
            match self.verbose {
                0 => tracing::Level::INFO,
                1 => tracing::Level::DEBUG,
                _ => tracing::Level::TRACE,
            }
        }
    }

    /// Get the log file path for diagnostic mode
    ///
    /// Uses the specified log directory and file name, or defaults to:
    /// - Directory: system temp directory
    /// - File: `pyrelay-{timestamp}.log`
    pub fn log_path(&self) -> PathBuf {
        let dir = self.log_dir.clone().unwrap_or_else(std::env::temp_dir);

        let filename = self.log_file.clone().unwrap_or_else(|| {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            format!("pyrelay-{timestamp}.log")
        });

        dir.join(filename)
    }
}
