//! `caseflow-tui` — terminal browser for humanitarian case-management
//! registries.
//!
//! Built on [ratatui](https://ratatui.rs) over `caseflow-core` list views.
//! Screens are navigable via number keys (1-4): Grievances, Households,
//! Individuals, and Payment Plans; each carries its own draft/applied
//! filter state.
//!
//! Logs are written to a file (default `/tmp/caseflow-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge forwards view
//! snapshots from the core engines into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod fmt;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use caseflow_core::Session;

use crate::app::App;

/// Terminal browser for case-management registries.
#[derive(Parser, Debug)]
#[command(name = "caseflow-tui", version, about)]
struct Cli {
    /// Profile from the shared config file (defaults to the configured one)
    #[arg(short, long, env = "CASEFLOW_PROFILE")]
    profile: Option<String>,

    /// Log file path (defaults to /tmp/caseflow-tui.log)
    #[arg(long, default_value = "/tmp/caseflow-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("caseflow_tui={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("caseflow-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Build a [`Session`] from the shared config file.
fn build_session(cli: &Cli) -> Result<(Session, String)> {
    let cfg = caseflow_config::load_config()?;
    let (name, profile) = cfg.profile(cli.profile.as_deref())?;
    let session_config = caseflow_config::profile_to_session_config(profile, name, &cfg.defaults)?;
    Ok((Session::new(session_config)?, name.to_owned()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    // Resolve the profile before touching the terminal so config problems
    // come out as a plain message, not a garbled alternate screen.
    let (session, profile) = match build_session(&cli) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("caseflow-tui: {err}");
            eprintln!();
            eprintln!(
                "No usable profile. Run `caseflow config init` to create one (config: {}).",
                caseflow_config::config_path().display()
            );
            std::process::exit(2);
        }
    };

    info!(profile = %profile, "starting caseflow-tui");

    let mut app = App::new(session, profile);
    app.run().await?;

    Ok(())
}
