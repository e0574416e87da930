// Hand-crafted async HTTP client for the platform REST API.
//
// Base path: /api/rest/
// Auth: `Authorization: Token <secret>` header (DRF token auth)

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::types::{
    GrievanceTicketDto, HouseholdDto, IndividualDto, Paged, PaymentPlanDto, ServerInfo,
};

// ── Error response shape from the platform ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the platform REST API.
///
/// Uses token authentication and communicates via JSON endpoints under
/// `/api/rest/`. All list endpoints return the standard paginated
/// envelope; query parameters are passed through verbatim so callers
/// own the filter vocabulary.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Token <secret>` as a default header on
    /// every request, marked sensitive so it never appears in logs.
    pub fn from_token(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Force the base URL onto the `/api/rest/` root.
    ///
    /// Accepts `https://host`, `https://host/`, or `https://host/api/rest`
    /// and always produces `https://host/api/rest/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        // Strip trailing slash for uniform handling
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/rest") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/rest/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"business-areas/kenya/households/"`)
    /// onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/api/rest/`, so joining works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();
        let detail = parsed.as_ref().and_then(|e| e.detail.clone());

        if status == reqwest::StatusCode::FORBIDDEN {
            return Error::PermissionDenied {
                message: detail.unwrap_or_else(|| status.to_string()),
            };
        }

        Error::Server {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            }),
            code: parsed.and_then(|e| e.code),
        }
    }

    // ── Path helpers ─────────────────────────────────────────────────

    /// `business-areas/{ba}/programs/{program}/{resource}/`
    fn program_path(business_area: &str, program: &str, resource: &str) -> String {
        format!("business-areas/{business_area}/programs/{program}/{resource}/")
    }

    /// Grievance tickets can be listed for one program or across the
    /// whole business area.
    fn grievance_path(business_area: &str, program: Option<&str>) -> String {
        match program {
            Some(p) => Self::program_path(business_area, p, "grievance-tickets"),
            None => format!("business-areas/{business_area}/grievance-tickets/"),
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Server info ──────────────────────────────────────────────────

    pub async fn server_info(&self) -> Result<ServerInfo, Error> {
        self.get("info/").await
    }

    // ── Households ───────────────────────────────────────────────────

    pub async fn list_households(
        &self,
        business_area: &str,
        program: &str,
        params: &[(String, String)],
    ) -> Result<Paged<HouseholdDto>, Error> {
        self.get_with_params(&Self::program_path(business_area, program, "households"), params)
            .await
    }

    pub async fn get_household(
        &self,
        business_area: &str,
        program: &str,
        id: &str,
    ) -> Result<HouseholdDto, Error> {
        let base = Self::program_path(business_area, program, "households");
        self.get(&format!("{base}{id}/")).await
    }

    // ── Individuals ──────────────────────────────────────────────────

    pub async fn list_individuals(
        &self,
        business_area: &str,
        program: &str,
        params: &[(String, String)],
    ) -> Result<Paged<IndividualDto>, Error> {
        self.get_with_params(&Self::program_path(business_area, program, "individuals"), params)
            .await
    }

    pub async fn get_individual(
        &self,
        business_area: &str,
        program: &str,
        id: &str,
    ) -> Result<IndividualDto, Error> {
        let base = Self::program_path(business_area, program, "individuals");
        self.get(&format!("{base}{id}/")).await
    }

    // ── Grievance tickets ────────────────────────────────────────────

    pub async fn list_grievance_tickets(
        &self,
        business_area: &str,
        program: Option<&str>,
        params: &[(String, String)],
    ) -> Result<Paged<GrievanceTicketDto>, Error> {
        self.get_with_params(&Self::grievance_path(business_area, program), params)
            .await
    }

    pub async fn get_grievance_ticket(
        &self,
        business_area: &str,
        program: Option<&str>,
        id: &str,
    ) -> Result<GrievanceTicketDto, Error> {
        let base = Self::grievance_path(business_area, program);
        self.get(&format!("{base}{id}/")).await
    }

    // ── Payment plans ────────────────────────────────────────────────

    pub async fn list_payment_plans(
        &self,
        business_area: &str,
        program: &str,
        params: &[(String, String)],
    ) -> Result<Paged<PaymentPlanDto>, Error> {
        self.get_with_params(
            &Self::program_path(business_area, program, "payment-plans"),
            params,
        )
        .await
    }

    pub async fn get_payment_plan(
        &self,
        business_area: &str,
        program: &str,
        id: &str,
    ) -> Result<PaymentPlanDto, Error> {
        let base = Self::program_path(business_area, program, "payment-plans");
        self.get(&format!("{base}{id}/")).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn normalize_appends_api_rest() {
        let url = RestClient::normalize_base_url("https://hope.example.org").unwrap();
        assert_eq!(url.as_str(), "https://hope.example.org/api/rest/");
    }

    #[test]
    fn normalize_tolerates_trailing_slash_and_existing_root() {
        let url = RestClient::normalize_base_url("https://hope.example.org/").unwrap();
        assert_eq!(url.as_str(), "https://hope.example.org/api/rest/");

        let url = RestClient::normalize_base_url("https://hope.example.org/api/rest").unwrap();
        assert_eq!(url.as_str(), "https://hope.example.org/api/rest/");

        let url = RestClient::normalize_base_url("https://hope.example.org/api/rest/").unwrap();
        assert_eq!(url.as_str(), "https://hope.example.org/api/rest/");
    }

    #[test]
    fn grievance_path_with_and_without_program() {
        assert_eq!(
            RestClient::grievance_path("kenya", Some("cash-2024")),
            "business-areas/kenya/programs/cash-2024/grievance-tickets/"
        );
        assert_eq!(
            RestClient::grievance_path("kenya", None),
            "business-areas/kenya/grievance-tickets/"
        );
    }
}
