//! pyrelay binary
//!
//! Run with: cargo run
//!
//! For help: cargo run -- --help

use clap::Parser;
use pyrelay::{cli::Cli, run_relay_with_cli};
use std::io::IsTerminal;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Run the relay with graceful shutdown on SIGTERM/SIGINT. Dropping the
    // relay future takes the child down with it (kill_on_drop).
    let result = tokio::select! {
        result = run_relay_with_cli(&cli) => result,
        _ = signal::ctrl_c() => {
            eprintln!("Received SIGINT, shutting down...");
            Ok(())
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler");
                sigterm.recv().await
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await
            }
        } => {
            eprintln!("Received SIGTERM, shutting down...");
            Ok(())
        }
    };

    if let Err(e) = result {
        // Output error to stderr (stdout carries relayed child output)
        eprintln!("Error: {}", e);

        // If running in interactive mode, show more details
        if std::io::stdin().is_terminal() {
            eprintln!("\nFor debugging, run with --diagnostic to log to a file.");
            eprintln!("Or use -v/-vv/-vvv for more verbose logging.");
        }

        std::process::exit(1);
    }

    Ok(())
}
