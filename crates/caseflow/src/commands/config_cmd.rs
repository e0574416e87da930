//! Config subcommand handlers.
//!
//! Everything here works without a server connection.

use std::collections::HashMap;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// `--profile` flag, else the active profile from flags + config.
fn target_profile(flag: Option<String>, global: &GlobalOpts, cfg: &Config) -> String {
    flag.unwrap_or_else(|| config::active_profile_name(global, cfg))
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("caseflow — configuration wizard");
            eprintln!("  Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Server URL")
                .interact_text()
                .map_err(prompt_err)?;

            let business_area: String = Input::new()
                .with_prompt("Business area slug")
                .interact_text()
                .map_err(prompt_err)?;

            let program: String = Input::new()
                .with_prompt("Program slug (empty for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let program = (!program.is_empty()).then_some(program);

            let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "API token cannot be empty".into(),
                });
            }

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API token?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let token_field = if store_selection == 0 {
                config::store_token(&profile_name, &SecretString::from(token))?;
                eprintln!("  {} API token stored in system keyring", output::ok_mark(&global.color));
                None
            } else {
                Some(token)
            };

            let profile = Profile {
                server,
                business_area,
                program,
                token: token_field,
                token_env: None,
                ca_cert: None,
                insecure: None,
                timeout: None,
                page_size: None,
                web_url: None,
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Default::default(),
                profiles,
            };
            config::save_config(&cfg)?;

            let mark = output::ok_mark(&global.color);
            eprintln!("\n{mark} Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: caseflow grievances list");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = target_profile(profile, global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "API token cannot be empty".into(),
                });
            }

            config::store_token(&profile_name, &SecretString::from(token))?;
            eprintln!(
                "{} Token stored in system keyring for profile '{profile_name}'",
                output::ok_mark(&global.color)
            );
            Ok(())
        }

        // ── EraseToken ──────────────────────────────────────────────
        ConfigCommand::EraseToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = target_profile(profile, global, &cfg);

            config::erase_token(&profile_name)?;
            eprintln!(
                "{} Token removed from system keyring for profile '{profile_name}'",
                output::ok_mark(&global.color)
            );
            Ok(())
        }
    }
}
