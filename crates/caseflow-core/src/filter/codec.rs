// URL query-string codec for filter state.
//
// Encoding is diff-based: only fields whose value differs from the schema
// default appear, so pristine views produce clean URLs. Decoding is total:
// unknown parameters are ignored and malformed values fall back to the
// field default, so a mangled shared link still opens the view.
//
// Conventions on the wire:
//   Text        name=value
//   Multi       name=a,b,c          (single comma-joined parameter)
//   NumberRange nameMin=2&nameMax=5 (either side may be absent)
//   DateRange   nameFrom=2024-01-01&nameTo=2024-02-01

use chrono::NaiveDate;

use super::schema::FilterSchema;
use super::state::FilterState;
use super::value::{FieldKind, FilterValue};

/// Encode the non-default fields of `state` as query parameter pairs,
/// in schema order. The same pairs serve as REST request parameters.
pub fn encode_pairs(schema: &FilterSchema, state: &FilterState) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for spec in schema.fields() {
        let Some(value) = state.get(spec.name()) else {
            continue;
        };
        if value == spec.default() {
            continue;
        }

        match value {
            FilterValue::Text(s) => {
                pairs.push((spec.name().to_owned(), s.clone()));
            }
            FilterValue::Multi(items) => {
                pairs.push((spec.name().to_owned(), items.join(",")));
            }
            FilterValue::NumberRange { min, max } => {
                if let Some(min) = min {
                    pairs.push((format!("{}Min", spec.name()), format_number(*min)));
                }
                if let Some(max) = max {
                    pairs.push((format!("{}Max", spec.name()), format_number(*max)));
                }
            }
            FilterValue::DateRange { from, to } => {
                if let Some(from) = from {
                    pairs.push((format!("{}From", spec.name()), from.to_string()));
                }
                if let Some(to) = to {
                    pairs.push((format!("{}To", spec.name()), to.to_string()));
                }
            }
        }
    }

    pairs
}

/// Encode as a percent-encoded query string (no leading `?`). Empty when
/// every field is at its default.
pub fn encode_query(schema: &FilterSchema, state: &FilterState) -> String {
    let pairs = encode_pairs(schema, state);
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    serializer.finish()
}

/// Decode a query string into a filter state. Total: never fails.
///
/// Starts from the schema's initial state, so absent fields keep their
/// defaults. A leading `?` is tolerated. When a parameter repeats, the
/// last occurrence wins.
pub fn decode(schema: &FilterSchema, query: &str) -> FilterState {
    let mut state = schema.initial();
    let trimmed = query.strip_prefix('?').unwrap_or(query);

    for (key, value) in url::form_urlencoded::parse(trimmed.as_bytes()) {
        apply_param(schema, &mut state, &key, &value);
    }

    state
}

/// Apply one `key=value` parameter to the state. Unknown keys and
/// malformed values are ignored.
fn apply_param(schema: &FilterSchema, state: &mut FilterState, key: &str, value: &str) {
    // Exact field names take priority over range-suffix interpretation,
    // so a text field literally named `createdFrom` still works.
    if let Some(spec) = schema.field(key) {
        match spec.kind() {
            FieldKind::Text => {
                state.insert(key.to_owned(), FilterValue::Text(value.to_owned()));
            }
            FieldKind::Multi => {
                let items: Vec<String> = value
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect();
                state.insert(key.to_owned(), FilterValue::Multi(items));
            }
            // Range fields are only addressable through their suffixed
            // parameters; a bare name is malformed and ignored.
            FieldKind::NumberRange | FieldKind::DateRange => {}
        }
        return;
    }

    if let Some(base) = key.strip_suffix("Min") {
        if let Some(parsed) = lookup_number_field(schema, base).and(parse_number(value)) {
            set_number_side(state, base, Some(parsed), true);
        }
        return;
    }
    if let Some(base) = key.strip_suffix("Max") {
        if let Some(parsed) = lookup_number_field(schema, base).and(parse_number(value)) {
            set_number_side(state, base, Some(parsed), false);
        }
        return;
    }
    if let Some(base) = key.strip_suffix("From") {
        if let Some(parsed) = lookup_date_field(schema, base).and(parse_date(value)) {
            set_date_side(state, base, Some(parsed), true);
        }
        return;
    }
    if let Some(base) = key.strip_suffix("To") {
        if let Some(parsed) = lookup_date_field(schema, base).and(parse_date(value)) {
            set_date_side(state, base, Some(parsed), false);
        }
    }
}

fn lookup_number_field(schema: &FilterSchema, base: &str) -> Option<()> {
    schema
        .field(base)
        .filter(|spec| spec.kind() == FieldKind::NumberRange)
        .map(|_| ())
}

fn lookup_date_field(schema: &FilterSchema, base: &str) -> Option<()> {
    schema
        .field(base)
        .filter(|spec| spec.kind() == FieldKind::DateRange)
        .map(|_| ())
}

fn set_number_side(state: &mut FilterState, base: &str, side: Option<f64>, is_min: bool) {
    let (mut min, mut max) = match state.get(base) {
        Some(FilterValue::NumberRange { min, max }) => (*min, *max),
        _ => (None, None),
    };
    if is_min {
        min = side;
    } else {
        max = side;
    }
    state.insert(base.to_owned(), FilterValue::NumberRange { min, max });
}

fn set_date_side(state: &mut FilterState, base: &str, side: Option<NaiveDate>, is_from: bool) {
    let (mut from, mut to) = match state.get(base) {
        Some(FilterValue::DateRange { from, to }) => (*from, *to),
        _ => (None, None),
    };
    if is_from {
        from = side;
    } else {
        to = side;
    }
    state.insert(base.to_owned(), FilterValue::DateRange { from, to });
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Integral values print without a fraction so `size=3` round-trips as
/// `3`, not `3.0`.
fn format_number(n: f64) -> String {
    if (n - n.trunc()).abs() < f64::EPSILON {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filter::schema::FieldSpec;

    fn schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("status", "Status", &["NEW", "IN_PROGRESS", "CLOSED"]),
            FieldSpec::multi("admin2", "District", &[]),
            FieldSpec::number_range("size", "Household size"),
            FieldSpec::date_range("created", "Created"),
        ])
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pristine_state_encodes_to_empty_query() {
        let schema = schema();
        assert_eq!(encode_query(&schema, &schema.initial()), "");
    }

    #[test]
    fn single_text_field() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert("search".into(), FilterValue::text("foo"));

        assert_eq!(encode_query(&schema, &state), "search=foo");
    }

    #[test]
    fn multi_joins_with_commas() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert("status".into(), FilterValue::multi(["NEW", "CLOSED"]));

        let pairs = encode_pairs(&schema, &state);
        assert_eq!(pairs, vec![("status".to_owned(), "NEW,CLOSED".to_owned())]);
    }

    #[test]
    fn ranges_encode_as_suffixed_pairs() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert(
            "size".into(),
            FilterValue::NumberRange { min: Some(2.0), max: Some(5.0) },
        );
        state.insert(
            "created".into(),
            FilterValue::DateRange { from: Some(date(2024, 1, 1)), to: None },
        );

        let pairs = encode_pairs(&schema, &state);
        assert_eq!(
            pairs,
            vec![
                ("sizeMin".to_owned(), "2".to_owned()),
                ("sizeMax".to_owned(), "5".to_owned()),
                ("createdFrom".to_owned(), "2024-01-01".to_owned()),
            ]
        );
    }

    #[test]
    fn field_reverted_to_default_is_omitted() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert("search".into(), FilterValue::text("foo"));
        state.insert("search".into(), FilterValue::text(""));

        assert_eq!(encode_query(&schema, &state), "");
    }

    #[test]
    fn clearing_a_non_empty_default_still_encodes() {
        // A field whose default is non-empty must encode its cleared
        // state, otherwise decode would silently restore the default.
        let schema = FilterSchema::new(vec![FieldSpec::text_with_default(
            "status", "Status", "ACTIVE",
        )]);
        let mut state = schema.initial();
        state.insert("status".into(), FilterValue::text(""));

        assert_eq!(encode_query(&schema, &state), "status=");
        assert_eq!(decode(&schema, "status="), state);
    }

    #[test]
    fn decode_single_field_keeps_other_defaults() {
        let schema = schema();
        let state = decode(&schema, "?status=NEW");

        assert_eq!(state.get("status"), Some(&FilterValue::multi(["NEW"])));
        assert_eq!(state.get("search"), Some(&FilterValue::Text(String::new())));
        assert_eq!(state.len(), schema.len());
    }

    #[test]
    fn decode_ignores_unknown_parameters() {
        let schema = schema();
        let state = decode(&schema, "search=foo&utm_source=mailer&tab=details");

        assert_eq!(state.get("search"), Some(&FilterValue::text("foo")));
        assert_eq!(state.len(), schema.len());
    }

    #[test]
    fn decode_malformed_values_keep_defaults() {
        let schema = schema();
        let state = decode(&schema, "sizeMin=abc&sizeMax=5&createdFrom=not-a-date");

        assert_eq!(
            state.get("size"),
            Some(&FilterValue::NumberRange { min: None, max: Some(5.0) })
        );
        assert_eq!(
            state.get("created"),
            Some(&FilterValue::DateRange { from: None, to: None })
        );
    }

    #[test]
    fn decode_rejects_non_finite_numbers() {
        let schema = schema();
        let state = decode(&schema, "sizeMin=inf&sizeMax=NaN");

        assert_eq!(
            state.get("size"),
            Some(&FilterValue::NumberRange { min: None, max: None })
        );
    }

    #[test]
    fn decode_last_occurrence_wins() {
        let schema = schema();
        let state = decode(&schema, "search=first&search=second");

        assert_eq!(state.get("search"), Some(&FilterValue::text("second")));
    }

    #[test]
    fn decode_empty_query_is_initial() {
        let schema = schema();
        assert_eq!(decode(&schema, ""), schema.initial());
        assert_eq!(decode(&schema, "?"), schema.initial());
    }

    #[test]
    fn bare_range_name_is_ignored() {
        let schema = schema();
        let state = decode(&schema, "size=3");

        assert_eq!(
            state.get("size"),
            Some(&FilterValue::NumberRange { min: None, max: None })
        );
    }

    #[test]
    fn round_trip_all_kinds() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert("search".into(), FilterValue::text("fatuma h"));
        state.insert("status".into(), FilterValue::multi(["NEW", "IN_PROGRESS"]));
        state.insert("admin2".into(), FilterValue::multi(["Dadaab"]));
        state.insert(
            "size".into(),
            FilterValue::NumberRange { min: Some(2.0), max: Some(7.5) },
        );
        state.insert(
            "created".into(),
            FilterValue::DateRange {
                from: Some(date(2024, 1, 1)),
                to: Some(date(2024, 3, 31)),
            },
        );

        let query = encode_query(&schema, &state);
        assert_eq!(decode(&schema, &query), state);
    }

    #[test]
    fn round_trip_percent_encoded_text() {
        let schema = schema();
        let mut state = schema.initial();
        state.insert("search".into(), FilterValue::text("a&b=c d,e"));

        let query = encode_query(&schema, &state);
        assert_eq!(decode(&schema, &query), state);
    }

    #[test]
    fn encode_of_decode_drops_only_foreign_parameters() {
        let schema = schema();
        let decoded = decode(&schema, "search=foo&junk=1&sizeMin=oops");
        assert_eq!(encode_query(&schema, &decoded), "search=foo");
    }
}
