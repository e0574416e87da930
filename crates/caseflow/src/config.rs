//! CLI configuration — thin wrapper around `caseflow_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --token, ...).

use std::time::Duration;

use secrecy::SecretString;

use caseflow_core::{SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use caseflow_config::{
    Config, Defaults, Profile, config_path, erase_token, load_config_or_default, save_config,
    store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `SessionConfig`.
///
/// CLI flag overrides beat profile values, which beat `[defaults]`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let url_str = global.server.as_deref().unwrap_or(&profile.server);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Business area and program
    let business_area = global
        .business_area
        .as_deref()
        .unwrap_or(&profile.business_area);
    if business_area.is_empty() {
        return Err(CliError::Validation {
            field: "business_area".into(),
            reason: "a business area slug is required".into(),
        });
    }
    let program = global.program.clone().or_else(|| profile.program.clone());

    // 3. Token (flag > env var > keyring > plaintext)
    let token = resolve_token_with_flag(profile, profile_name, global)?;

    // 4. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 5. Timeout and page size
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    let page_size = profile.page_size.unwrap_or(defaults.page_size);

    // 6. Web link base
    let web_url = match profile.web_url.as_deref() {
        Some(raw) => Some(raw.parse().map_err(|_| CliError::Validation {
            field: "web_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?),
        None => None,
    };

    Ok(SessionConfig {
        url,
        token,
        business_area: business_area.to_owned(),
        program,
        tls,
        timeout,
        page_size,
        web_url,
    })
}

/// Resolve the API token with CLI flag override, then fall through to
/// the shared chain (env var, keyring, plaintext).
fn resolve_token_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }
    Ok(caseflow_config::resolve_token(profile, profile_name)?)
}
