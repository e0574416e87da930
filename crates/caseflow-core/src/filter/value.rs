// Filter field values as a closed union keyed by kind.
//
// UIs and the codec match exhaustively on this enum, so adding a kind
// forces every consumer to handle it.

use chrono::NaiveDate;

/// The kind of a filter field. Stored in the schema; every value carries
/// the kind it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FieldKind {
    /// Free text or a single choice from a vocabulary.
    Text,
    /// Zero or more choices from a vocabulary.
    Multi,
    /// Numeric interval, either side optional.
    NumberRange,
    /// Date interval, either side optional.
    DateRange,
}

/// A single filter field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Multi(Vec<String>),
    NumberRange {
        min: Option<f64>,
        max: Option<f64>,
    },
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Convenience constructor for multi-select values.
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    /// The kind this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Multi(_) => FieldKind::Multi,
            Self::NumberRange { .. } => FieldKind::NumberRange,
            Self::DateRange { .. } => FieldKind::DateRange,
        }
    }

    /// `true` when the value carries no constraint at all.
    ///
    /// Distinct from being at the schema default: a schema may default a
    /// text field to a non-empty vocabulary entry.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Multi(v) => v.is_empty(),
            Self::NumberRange { min, max } => min.is_none() && max.is_none(),
            Self::DateRange { from, to } => from.is_none() && to.is_none(),
        }
    }
}

impl std::fmt::Display for FilterValue {
    /// Human-readable summary for status lines and panels. Not the wire
    /// encoding — that lives in [`crate::filter::codec`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Multi(v) => f.write_str(&v.join(", ")),
            Self::NumberRange { min, max } => {
                if let Some(min) = min {
                    write!(f, "{min}")?;
                }
                f.write_str("..")?;
                if let Some(max) = max {
                    write!(f, "{max}")?;
                }
                Ok(())
            }
            Self::DateRange { from, to } => {
                if let Some(from) = from {
                    write!(f, "{from}")?;
                }
                f.write_str("..")?;
                if let Some(to) = to {
                    write!(f, "{to}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(FilterValue::text("x").kind(), FieldKind::Text);
        assert_eq!(FilterValue::multi(["a"]).kind(), FieldKind::Multi);
        assert_eq!(
            FilterValue::NumberRange { min: None, max: None }.kind(),
            FieldKind::NumberRange
        );
        assert_eq!(
            FilterValue::DateRange { from: None, to: None }.kind(),
            FieldKind::DateRange
        );
    }

    #[test]
    fn empty_detection() {
        assert!(FilterValue::text("").is_empty());
        assert!(!FilterValue::text("x").is_empty());
        assert!(FilterValue::Multi(vec![]).is_empty());
        assert!(FilterValue::NumberRange { min: None, max: None }.is_empty());
        assert!(!FilterValue::NumberRange { min: Some(1.0), max: None }.is_empty());
    }

    #[test]
    fn display_summaries() {
        assert_eq!(FilterValue::multi(["NEW", "CLOSED"]).to_string(), "NEW, CLOSED");
        assert_eq!(
            FilterValue::NumberRange { min: Some(2.0), max: Some(5.0) }.to_string(),
            "2..5"
        );
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            FilterValue::DateRange { from: Some(from), to: None }.to_string(),
            "2024-01-01.."
        );
    }
}
