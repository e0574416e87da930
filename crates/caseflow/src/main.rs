mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use caseflow_core::{Session, SessionConfig, TlsVerification};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "caseflow", &mut std::io::stdout());
            Ok(())
        }

        // All other commands run against a session. Handlers decide
        // whether to connect: `--link` renders without touching the
        // network at all.
        cmd => {
            let session_config = build_session_config(&cli.global)?;
            let session = Session::new(session_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &session, &cli.global).await;
            session.close();
            result
        }
    }
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
fn build_session_config(global: &cli::GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return config::resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let url_str = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config::config_path().display().to_string(),
    })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let business_area = global
        .business_area
        .clone()
        .ok_or_else(|| CliError::Validation {
            field: "business_area".into(),
            reason: "pass --business-area or configure a profile".into(),
        })?;

    let Some(token) = global.token.clone() else {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    let defaults = config::Defaults::default();
    Ok(SessionConfig {
        url,
        token: SecretString::from(token),
        business_area,
        program: global.program.clone(),
        tls,
        timeout: std::time::Duration::from_secs(global.timeout.unwrap_or(defaults.timeout)),
        page_size: defaults.page_size,
        web_url: None,
    })
}
