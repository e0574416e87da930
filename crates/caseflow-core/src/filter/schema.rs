// Filter schemas: the static description of which fields a view filters on.
//
// Field names use the server's query-parameter vocabulary (camelCase), so
// the codec's output is also the request parameter set.

use indexmap::IndexMap;

use super::state::FilterState;
use super::value::{FieldKind, FilterValue};

/// One filter field: name, kind, default, and UI metadata.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    label: String,
    kind: FieldKind,
    default: FilterValue,
    /// Fixed vocabulary for Multi fields (and Text fields with a known
    /// option set). Purely a UI hint; the codec does not enforce it.
    options: Vec<String>,
}

impl FieldSpec {
    /// Free-text field defaulting to the empty string.
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind: FieldKind::Text,
            default: FilterValue::Text(String::new()),
            options: Vec::new(),
        }
    }

    /// Text field with a non-empty default. Encoded only when the value
    /// differs from that default.
    pub fn text_with_default(name: &str, label: &str, default: &str) -> Self {
        Self {
            default: FilterValue::text(default),
            ..Self::text(name, label)
        }
    }

    /// Multi-select field over a fixed vocabulary, defaulting to no
    /// selection.
    pub fn multi(name: &str, label: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind: FieldKind::Multi,
            default: FilterValue::Multi(Vec::new()),
            options: options.iter().map(|&o| o.to_owned()).collect(),
        }
    }

    /// Open numeric interval, both sides defaulting to unbounded.
    pub fn number_range(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind: FieldKind::NumberRange,
            default: FilterValue::NumberRange { min: None, max: None },
            options: Vec::new(),
        }
    }

    /// Open date interval, both sides defaulting to unbounded.
    pub fn date_range(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind: FieldKind::DateRange,
            default: FilterValue::DateRange { from: None, to: None },
            options: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn default(&self) -> &FilterValue {
        &self.default
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// Ordered collection of filter fields for one view.
///
/// Field order is presentation order and encoding order, so query strings
/// come out deterministic.
#[derive(Debug, Clone, Default)]
pub struct FilterSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl FilterSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The initial state: every field at its default.
    ///
    /// This is what `clear` restores — not an empty map.
    pub fn initial(&self) -> FilterState {
        let mut state = FilterState::default();
        for spec in self.fields.values() {
            state.insert(spec.name.clone(), spec.default.clone());
        }
        state
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("status", "Status", &["NEW", "CLOSED"]),
            FieldSpec::number_range("size", "Household size"),
        ])
    }

    #[test]
    fn initial_contains_every_field_at_default() {
        let initial = schema().initial();
        assert_eq!(initial.len(), 3);
        assert_eq!(initial.get("search"), Some(&FilterValue::Text(String::new())));
        assert_eq!(initial.get("status"), Some(&FilterValue::Multi(Vec::new())));
        assert_eq!(
            initial.get("size"),
            Some(&FilterValue::NumberRange { min: None, max: None })
        );
    }

    #[test]
    fn field_order_is_declaration_order() {
        let schema = schema();
        let names: Vec<&str> = schema.fields().map(FieldSpec::name).collect();
        assert_eq!(names, vec!["search", "status", "size"]);
    }

    #[test]
    fn non_empty_text_default() {
        let spec = FieldSpec::text_with_default("status", "Status", "ACTIVE");
        assert_eq!(spec.default(), &FilterValue::text("ACTIVE"));
        assert_eq!(spec.kind(), FieldKind::Text);
    }
}
