// Wire types for the platform REST API.
//
// These mirror the JSON the server sends (camelCase keys); caseflow-core
// converts them into domain types. Keep them dumb: no methods beyond
// derives, no invariants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Standard paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// `GET info/` response — used to validate URL + token before any UI starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    #[serde(default)]
    pub environment: Option<String>,
}

// ── Registry rows ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdDto {
    pub id: Uuid,
    /// Human-readable registry code, e.g. "HH-23-0104.7712".
    pub code: String,
    #[serde(default)]
    pub head_of_household: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub admin2: Option<String>,
    #[serde(default)]
    pub residence_status: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDto {
    pub id: Uuid,
    pub code: String,
    pub full_name: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub household_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrievanceTicketDto {
    pub id: Uuid,
    pub code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub urgency: Option<u8>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub admin2: Option<String>,
    #[serde(default)]
    pub household_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlanDto {
    pub id: Uuid,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total_entitled_quantity: Option<f64>,
    #[serde(default)]
    pub dispersion_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub dispersion_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_follow_up: bool,
}
