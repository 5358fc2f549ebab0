//! Relay runner
//!
//! Entry point wiring the CLI to a relay session on process stdio.

use std::process::ExitStatus;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::session;
use crate::cli::Cli;
use crate::tracing::ResultTraceExt;
use crate::types::RelayConfig;

/// Build an EnvFilter based on CLI args and RUST_LOG environment variable
///
/// Priority: RUST_LOG environment variable > CLI arguments (-v, -vv, -q)
fn build_env_filter(cli: &Cli) -> tracing_subscriber::EnvFilter {
    // Check if RUST_LOG is set and non-empty
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            // RUST_LOG takes priority - use it directly
            return tracing_subscriber::EnvFilter::new(rust_log);
        }
    }

    // No RUST_LOG set, use CLI arguments to determine level
    let level = cli.log_level();
    tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into())
}

/// Initialize logging with file output (diagnostic mode)
fn init_logging_to_file(cli: &Cli) -> anyhow::Result<()> {
    let filter = build_env_filter(cli);

    let log_path = cli.log_path();

    // Ensure directory exists
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(&log_path)?;

    // Output log file location to stderr (user needs to know)
    eprintln!("Diagnostic mode: logging to {}", log_path.display());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Initialize logging with stderr output (normal mode)
///
/// Stdout carries relayed child output only, so logs go to stderr.
fn init_logging_to_stderr(cli: &Cli) {
    let filter = build_env_filter(cli);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Initialize logging based on CLI arguments
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    if cli.is_diagnostic() {
        init_logging_to_file(cli)
    } else {
        init_logging_to_stderr(cli);
        Ok(())
    }
}

/// Run the relay with CLI arguments
///
/// This is the main entry point when using CLI argument parsing.
/// It initializes logging based on CLI args and runs the relay session on
/// process stdin/stdout.
pub async fn run_relay_with_cli(cli: &Cli) -> anyhow::Result<()> {
    let startup_time = std::time::Instant::now();

    // Initialize logging first (must happen before any tracing)
    init_logging(cli)?;

    if cli.is_diagnostic() {
        tracing::info!(
            log_path = %cli.log_path().display(),
            "Diagnostic mode enabled"
        );
    }

    let init_elapsed = startup_time.elapsed();
    tracing::debug!(
        init_elapsed_ms = init_elapsed.as_millis(),
        "Logging initialized"
    );

    let config = cli.relay_config();
    let status = run_relay_session(&config).await?;
    tracing::debug!(?status, "Relay finished");

    Ok(())
}

/// Run the relay with the default invocation and default logging
///
/// Library entry point without CLI parsing: spawns `python human_sim.py`
/// and relays process stdin/stdout. For CLI usage with argument parsing,
/// use `run_relay_with_cli()` instead.
pub async fn run_relay() -> crate::types::Result<ExitStatus> {
    // Initialize tracing with default settings
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_relay_session(&RelayConfig::default()).await
}

/// Internal session runner
///
/// Contains the banner and the actual relay call, shared by both
/// `run_relay()` and `run_relay_with_cli()`.
async fn run_relay_session(config: &RelayConfig) -> crate::types::Result<ExitStatus> {
    let session_start_time = std::time::Instant::now();

    // Check if running in interactive terminal
    let is_tty = atty::is(atty::Stream::Stdin);

    // Print startup banner for easy log identification
    let start_time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

    tracing::info!(
        "================================================================================"
    );
    tracing::info!("  pyrelay - Relay Session Start");
    tracing::info!(
        "--------------------------------------------------------------------------------"
    );
    tracing::info!("  Version:    {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("  Start Time: {}", start_time);
    tracing::info!("  PID:        {}", std::process::id());
    tracing::info!("  Command:    {}", config.command_line());
    tracing::info!(
        "  TTY Mode:   {}",
        if is_tty { "interactive" } else { "piped" }
    );
    tracing::info!(
        "================================================================================"
    );

    // Log environment info
    tracing::debug!(
        rust_log = ?std::env::var("RUST_LOG").ok(),
        cwd = ?std::env::current_dir().ok(),
        "Environment configuration"
    );

    let result = session::run(config, tokio::io::stdin(), tokio::io::stdout())
        .await
        .trace_context();

    if let Ok(ref status) = result {
        let uptime = session_start_time.elapsed();
        tracing::info!(
            uptime_secs = uptime.as_secs(),
            uptime_ms = uptime.as_millis(),
            ?status,
            "Relay shutting down gracefully"
        );
    }

    result
}
