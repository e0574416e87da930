// ── Core error types ──
//
// User-facing errors from caseflow-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<caseflow_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use crate::filter::FilterError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Filter errors ────────────────────────────────────────────────
    #[error(transparent)]
    Filter(#[from] FilterError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The server's machine-readable error code, if it sent one.
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if retrying without changing anything might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::ConnectionFailed { .. }
                | Self::Api {
                    status: Some(502..=504),
                    ..
                }
        )
    }

    /// Returns `true` if this error points at credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::PermissionDenied { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Api { status: Some(404), .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<caseflow_api::Error> for CoreError {
    fn from(err: caseflow_api::Error) -> Self {
        match err {
            caseflow_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "Invalid or expired API token".into(),
            },
            caseflow_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            caseflow_api::Error::PermissionDenied { message } => {
                CoreError::PermissionDenied { message }
            }
            caseflow_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        entity_type: "resource",
                        identifier: e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            caseflow_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            caseflow_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            caseflow_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            caseflow_api::Error::Server {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            caseflow_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
