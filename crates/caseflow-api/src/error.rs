use thiserror::Error;

/// Top-level error type for the `caseflow-api` crate.
///
/// Covers authentication, transport, and server-reported failures.
/// `caseflow-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected by the server (401).
    #[error("Invalid or expired API token")]
    InvalidToken,

    /// Token accepted but the account lacks access to the resource (403).
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// Token could not be installed as a header (contains control bytes etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// Structured error from the platform (parsed from the `{detail}` envelope).
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the token is bad and
    /// re-authenticating with a fresh one might resolve it.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::Authentication { .. } | Self::PermissionDenied { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Server { status, .. } => matches!(status, 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Server { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the server's machine-readable error code, if available.
    pub fn server_error_code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
