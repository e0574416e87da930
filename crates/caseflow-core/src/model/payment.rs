// ── Payment plan domain types ──

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::entity_id::EntityId;
use crate::filter::{FieldSpec, FilterSchema};

/// Payment plan lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum PlanStatus {
    #[strum(serialize = "OPEN", to_string = "Open")]
    Open,
    #[strum(serialize = "LOCKED", to_string = "Locked")]
    Locked,
    #[strum(serialize = "IN_APPROVAL", to_string = "In Approval")]
    InApproval,
    #[strum(serialize = "ACCEPTED", to_string = "Accepted")]
    Accepted,
    #[strum(serialize = "FINISHED", to_string = "Finished")]
    Finished,
    #[strum(default)]
    Other(String),
}

impl PlanStatus {
    pub const CHOICES: [&'static str; 5] =
        ["OPEN", "LOCKED", "IN_APPROVAL", "ACCEPTED", "FINISHED"];

    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }

    /// The server's wire form of this value.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Open => "OPEN",
            Self::Locked => "LOCKED",
            Self::InApproval => "IN_APPROVAL",
            Self::Accepted => "ACCEPTED",
            Self::Finished => "FINISHED",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for PlanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// A payment plan as listed in the payment module.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPlan {
    pub id: EntityId,
    pub code: String,
    pub name: Option<String>,
    pub status: Option<PlanStatus>,
    pub currency: Option<String>,
    pub total_entitled: Option<f64>,
    pub dispersion_start: Option<NaiveDate>,
    pub dispersion_end: Option<NaiveDate>,
    pub is_follow_up: bool,
}

impl PaymentPlan {
    pub const RESOURCE: &'static str = "payment-plans";

    pub const VIEW_PATH: &'static str = "payment-module/payment-plans";

    pub fn filter_schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("status", "Status", &PlanStatus::CHOICES),
            FieldSpec::number_range("totalEntitled", "Total entitled"),
            FieldSpec::date_range("dispersionStart", "Dispersion start"),
            FieldSpec::date_range("dispersionEnd", "Dispersion end"),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plan_choices_all_parse() {
        for raw in PlanStatus::CHOICES {
            assert!(!matches!(PlanStatus::from_raw(raw), PlanStatus::Other(_)));
        }
    }

    #[test]
    fn two_independent_date_ranges_encode_separately() {
        use crate::filter::{FilterValue, codec};
        use chrono::NaiveDate;

        let schema = PaymentPlan::filter_schema();
        let mut state = schema.initial();
        state.insert(
            "dispersionStart".into(),
            FilterValue::DateRange {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: None,
            },
        );
        state.insert(
            "dispersionEnd".into(),
            FilterValue::DateRange {
                from: None,
                to: NaiveDate::from_ymd_opt(2024, 4, 30),
            },
        );
        assert_eq!(
            codec::encode_query(&schema, &state),
            "dispersionStartFrom=2024-03-01&dispersionEndTo=2024-04-30"
        );
    }
}
