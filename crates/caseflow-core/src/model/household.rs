// ── Household domain types ──

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::entity_id::EntityId;
use crate::filter::{FieldSpec, FilterSchema};

/// Residence status of a household, as registered.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum ResidenceStatus {
    #[strum(serialize = "IDP", to_string = "Displaced (IDP)")]
    Idp,
    #[strum(serialize = "REFUGEE", to_string = "Refugee")]
    Refugee,
    #[strum(serialize = "OTHERS_OF_CONCERN", to_string = "Others of Concern")]
    OthersOfConcern,
    #[strum(serialize = "HOST", to_string = "Host")]
    Host,
    #[strum(serialize = "NON_HOST", to_string = "Non-host")]
    NonHost,
    #[strum(serialize = "RETURNEE", to_string = "Returnee")]
    Returnee,
    #[strum(default)]
    Other(String),
}

impl ResidenceStatus {
    pub const CHOICES: [&'static str; 6] = [
        "IDP",
        "REFUGEE",
        "OTHERS_OF_CONCERN",
        "HOST",
        "NON_HOST",
        "RETURNEE",
    ];

    /// Parse a raw server value, keeping unknown values verbatim.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }

    /// The server's wire form of this value.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Idp => "IDP",
            Self::Refugee => "REFUGEE",
            Self::OthersOfConcern => "OTHERS_OF_CONCERN",
            Self::Host => "HOST",
            Self::NonHost => "NON_HOST",
            Self::Returnee => "RETURNEE",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for ResidenceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// A household as listed in the population registry.
#[derive(Debug, Clone, Serialize)]
pub struct Household {
    pub id: EntityId,
    pub code: String,
    pub head_of_household: Option<String>,
    pub size: Option<u32>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub residence_status: Option<ResidenceStatus>,
    pub status: Option<String>,
    pub registration_date: Option<NaiveDate>,
}

impl Household {
    pub const RESOURCE: &'static str = "households";

    pub const VIEW_PATH: &'static str = "population/household";

    pub fn filter_schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("residenceStatus", "Residence status", &ResidenceStatus::CHOICES),
            FieldSpec::multi("admin2", "Admin area", &[]),
            FieldSpec::number_range("size", "Household size"),
            FieldSpec::date_range("registrationDate", "Registration date"),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn residence_choices_all_parse() {
        for raw in ResidenceStatus::CHOICES {
            assert!(!matches!(
                ResidenceStatus::from_raw(raw),
                ResidenceStatus::Other(_)
            ));
        }
    }

    #[test]
    fn unknown_residence_status_preserved() {
        let status = ResidenceStatus::from_raw("MIGRANT");
        assert_eq!(status.to_string(), "MIGRANT");
    }

    #[test]
    fn schema_declares_expected_fields() {
        let schema = Household::filter_schema();
        assert!(schema.field("residenceStatus").is_some());
        assert!(schema.field("size").is_some());
        assert!(schema.field("registrationDate").is_some());
    }
}
