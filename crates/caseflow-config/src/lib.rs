//! Shared configuration for the caseflow CLI and TUI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `caseflow_core::SessionConfig`. Both binaries
//! depend on this crate — the CLI adds `GlobalOpts`-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use caseflow_core::{SessionConfig, TlsVerification};

/// Keyring service name under which tokens are stored.
const KEYRING_SERVICE: &str = "caseflow";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found in {path}")]
    UnknownProfile { profile: String, path: PathBuf },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
                path: config_path(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    20
}

/// A named server profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://hope.example.org").
    pub server: String,

    /// Business area slug (e.g., "kenya").
    pub business_area: String,

    /// Program within the business area. Grievance tickets work without
    /// one; population and payment registries require it.
    pub program: Option<String>,

    /// API token (plaintext — prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override list page size.
    pub page_size: Option<u32>,

    /// Web app base URL for share links, when it differs from `server`.
    pub web_url: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "caseflow", "caseflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("caseflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from a specific file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CASEFLOW_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;

    // The file may hold a plaintext token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API token from the credential chain (no CLI flag step):
/// profile's `token_env` variable, then the system keyring, then the
/// plaintext `token` field.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for a profile.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(token.expose_secret())
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Remove a profile's token from the system keyring. Succeeds if no
/// token was stored.
pub fn erase_token(profile_name: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::Keyring(e.to_string())),
    }
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

// ── Profile → SessionConfig ─────────────────────────────────────────

/// Build a `SessionConfig` from a profile — no CLI flag overrides.
///
/// Suitable for the TUI and other non-CLI consumers. Falls back to the
/// `[defaults]` section for timeout, page size, and TLS laxness.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    if profile.business_area.is_empty() {
        return Err(ConfigError::Validation {
            field: "business_area".into(),
            reason: "must not be empty".into(),
        });
    }

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let web_url = match profile.web_url {
        Some(ref raw) => Some(raw.parse().map_err(|_| ConfigError::Validation {
            field: "web_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?),
        None => None,
    };

    Ok(SessionConfig {
        url,
        token,
        business_area: profile.business_area.clone(),
        program: profile.program.clone(),
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        page_size: profile.page_size.unwrap_or(defaults.page_size),
        web_url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            server: "https://hope.example.org".into(),
            business_area: "kenya".into(),
            program: Some("cash-2024".into()),
            token: Some("plaintext-token".into()),
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            page_size: None,
            web_url: None,
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let d = Defaults::default();
        assert_eq!(d.output, "table");
        assert_eq!(d.color, "auto");
        assert!(!d.insecure);
        assert_eq!(d.timeout, 30);
        assert_eq!(d.page_size, 20);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.profiles.insert("prod".into(), sample_profile());

        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.default_profile.as_deref(), Some("default"));
        let profile = &parsed.profiles["prod"];
        assert_eq!(profile.server, "https://hope.example.org");
        assert_eq!(profile.business_area, "kenya");
        assert_eq!(profile.program.as_deref(), Some("cash-2024"));
    }

    #[test]
    fn save_and_load_via_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("prod".into());
        cfg.profiles.insert("prod".into(), sample_profile());
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("prod"));
        assert!(loaded.profiles.contains_key("prod"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("does-not-exist.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn profile_lookup_falls_back_to_default() {
        let mut cfg = Config::default();
        cfg.default_profile = Some("prod".into());
        cfg.profiles.insert("prod".into(), sample_profile());

        let (name, _) = cfg.profile(None).unwrap();
        assert_eq!(name, "prod");
        let (name, _) = cfg.profile(Some("prod")).unwrap();
        assert_eq!(name, "prod");
        assert!(matches!(
            cfg.profile(Some("staging")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn plaintext_token_resolves() {
        let profile = sample_profile();
        let token = resolve_token(&profile, "prod").unwrap();
        assert_eq!(token.expose_secret(), "plaintext-token");
    }

    #[test]
    fn unset_token_env_falls_through_to_plaintext() {
        let mut profile = sample_profile();
        profile.token_env = Some("CASEFLOW_TEST_UNSET_TOKEN_VAR".into());
        let token = resolve_token(&profile, "prod").unwrap();
        assert_eq!(token.expose_secret(), "plaintext-token");
    }

    #[test]
    fn no_credentials_is_an_error() {
        let mut profile = sample_profile();
        profile.token = None;
        assert!(matches!(
            resolve_token(&profile, "prod"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn session_config_from_profile() {
        let cfg = profile_to_session_config(&sample_profile(), "prod", &Defaults::default()).unwrap();
        assert_eq!(cfg.url.as_str(), "https://hope.example.org/");
        assert_eq!(cfg.business_area, "kenya");
        assert_eq!(cfg.program.as_deref(), Some("cash-2024"));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.page_size, 20);
    }

    #[test]
    fn insecure_profile_skips_verification() {
        let mut profile = sample_profile();
        profile.insecure = Some(true);
        let cfg = profile_to_session_config(&profile, "prod", &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_server_url_is_a_validation_error() {
        let mut profile = sample_profile();
        profile.server = "not a url".into();
        assert!(matches!(
            profile_to_session_config(&profile, "prod", &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
