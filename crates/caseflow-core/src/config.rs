// ── Runtime session configuration ──
//
// These types describe *how* to connect to a platform instance. They carry
// credential data and connection tuning, but never touch disk. The CLI/TUI
// constructs a `SessionConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// System CA store (strict). Default — platform instances run on
    /// publicly trusted certificates.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed staging instances).
    DangerAcceptInvalid,
}

impl PartialEq for TlsVerification {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SystemDefaults, Self::SystemDefaults) => true,
            (Self::CustomCa(a), Self::CustomCa(b)) => a == b,
            (Self::DangerAcceptInvalid, Self::DangerAcceptInvalid) => true,
            _ => false,
        }
    }
}

impl Eq for TlsVerification {}

/// Configuration for one session against one platform instance.
///
/// Built by CLI/TUI, passed to `Session` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server URL (e.g., `https://hope.example.org`).
    pub url: Url,
    /// API token (DRF token auth).
    pub token: SecretString,
    /// Business area slug the session operates in (e.g., `kenya`).
    pub business_area: String,
    /// Program within the business area. Registries other than grievance
    /// tickets require one.
    pub program: Option<String>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// Default page size for list views.
    pub page_size: u32,
    /// Base URL of the web UI, for shareable links. Falls back to `url`.
    pub web_url: Option<Url>,
}

impl SessionConfig {
    /// Translate the TLS strategy into the api crate's transport mode.
    pub(crate) fn tls_mode(&self) -> caseflow_api::TlsMode {
        match &self.tls {
            TlsVerification::SystemDefaults => caseflow_api::TlsMode::System,
            TlsVerification::CustomCa(path) => caseflow_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => caseflow_api::TlsMode::DangerAcceptInvalid,
        }
    }

    /// The URL links should be built against.
    pub fn link_base(&self) -> &Url {
        self.web_url.as_ref().unwrap_or(&self.url)
    }
}
