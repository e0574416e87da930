// ── Individual domain types ──

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::entity_id::EntityId;
use crate::filter::{FieldSpec, FilterSchema};

/// Registered sex of an individual.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum Sex {
    #[strum(serialize = "MALE", to_string = "Male")]
    Male,
    #[strum(serialize = "FEMALE", to_string = "Female")]
    Female,
    #[strum(default)]
    Other(String),
}

impl Sex {
    pub const CHOICES: [&'static str; 2] = ["MALE", "FEMALE"];

    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }

    /// The server's wire form of this value.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// An individual as listed in the population registry.
#[derive(Debug, Clone, Serialize)]
pub struct Individual {
    pub id: EntityId,
    pub code: String,
    pub full_name: String,
    pub sex: Option<Sex>,
    pub birth_date: Option<NaiveDate>,
    /// Relationship to the head of household; the server vocabulary here
    /// is open-ended, so it stays a plain string.
    pub relationship: Option<String>,
    pub phone: Option<String>,
    pub household_code: Option<String>,
}

impl Individual {
    pub const RESOURCE: &'static str = "individuals";

    pub const VIEW_PATH: &'static str = "population/individuals";

    pub fn filter_schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("sex", "Sex", &Sex::CHOICES),
            FieldSpec::number_range("age", "Age"),
            FieldSpec::multi("admin2", "Admin area", &[]),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn age_encodes_with_range_suffixes() {
        use crate::filter::{FilterValue, codec};

        let schema = Individual::filter_schema();
        let mut state = schema.initial();
        state.insert(
            "age".into(),
            FilterValue::NumberRange { min: Some(18.0), max: Some(59.0) },
        );
        assert_eq!(codec::encode_query(&schema, &state), "ageMin=18&ageMax=59");
    }

    #[test]
    fn sex_parses_and_displays() {
        assert_eq!(Sex::from_raw("FEMALE"), Sex::Female);
        assert_eq!(Sex::Female.to_string(), "Female");
    }
}
