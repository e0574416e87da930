//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use caseflow_config::ConfigError;
use caseflow_core::CoreError;

/// Exit codes; scripts may rely on these.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to server at {url}: {reason}")]
    #[diagnostic(
        code(caseflow::connection_failed),
        help(
            "Check that the server is reachable.\n\
             URL: {url}\n\
             For staging instances with self-signed certificates, try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(caseflow::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(caseflow::auth),
        help(
            "Verify your API token.\n\
             Store one with: caseflow config set-token\n\
             Or set the CASEFLOW_TOKEN environment variable."
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(caseflow::permission),
        help("Your token lacks access to this registry or business area.")
    )]
    PermissionDenied { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(caseflow::no_credentials),
        help(
            "Store a token with: caseflow config set-token --profile {profile}\n\
             Or set the CASEFLOW_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{entity_type} '{identifier}' not found")]
    #[diagnostic(
        code(caseflow::not_found),
        help("Run: caseflow {list_command} to see available entries")
    )]
    NotFound {
        entity_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Scope ────────────────────────────────────────────────────────

    #[error("This registry is program-scoped and no program is selected")]
    #[diagnostic(
        code(caseflow::program_required),
        help("Pass --program <SLUG> or set `program` in the active profile.")
    )]
    ProgramRequired,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(caseflow::api))]
    Api { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(caseflow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(caseflow::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: caseflow config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(caseflow::no_config),
        help(
            "Create one with: caseflow config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(caseflow::keyring),
        help(
            "The system keyring may be locked or unavailable.\n\
             Use `token_env` in the profile or the CASEFLOW_TOKEN variable instead."
        )
    )]
    Keyring { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(caseflow::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::PermissionDenied { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProgramRequired => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                let list_command = match entity_type {
                    "grievance ticket" => "grievances list".to_owned(),
                    "household" => "households list".to_owned(),
                    "individual" => "individuals list".to_owned(),
                    "payment plan" => "payments list".to_owned(),
                    other => format!("{other}s list"),
                };
                Self::NotFound {
                    entity_type: entity_type.to_owned(),
                    identifier,
                    list_command,
                }
            }

            CoreError::PermissionDenied { message } => Self::PermissionDenied { message },

            CoreError::Filter(e) => Self::Validation {
                field: "filter".into(),
                reason: e.to_string(),
            },

            CoreError::Api {
                message,
                code,
                status: _,
            } => Self::Api {
                code: code.unwrap_or_default(),
                message,
            },

            CoreError::Config { message } => {
                if message.contains("program-scoped") {
                    Self::ProgramRequired
                } else {
                    Self::Config { message }
                }
            }

            CoreError::Internal(message) => Self::Api {
                code: "internal".into(),
                message,
            },
        }
    }
}

// Schema-violating filter edits are usage errors (exit 2), same as any
// other bad flag value.
impl From<caseflow_core::FilterError> for CliError {
    fn from(err: caseflow_core::FilterError) -> Self {
        Self::Validation {
            field: "filter".into(),
            reason: err.to_string(),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },

            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },

            ConfigError::UnknownProfile { profile, path: _ } => Self::ProfileNotFound {
                name: profile,
                available: String::new(),
            },

            ConfigError::Keyring(message) => Self::Keyring { message },

            ConfigError::Serialization(e) => Self::Config {
                message: e.to_string(),
            },

            ConfigError::Figment(e) => Self::Config {
                message: e.to_string(),
            },

            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
