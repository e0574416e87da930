// Filter state: field name -> value, in schema order.

use indexmap::IndexMap;

use super::value::FilterValue;

/// The complete filter state of one view.
///
/// Always schema-closed: constructed from [`FilterSchema::initial`]
/// (every declared field present at its default) and mutated only through
/// [`FilterStore`], which validates names and kinds. Two states compare
/// equal when every field's value matches.
///
/// [`FilterSchema::initial`]: super::schema::FilterSchema::initial
/// [`FilterStore`]: super::store::FilterStore
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: IndexMap<String, FilterValue>,
}

impl FilterState {
    /// Value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.values.get(name)
    }

    /// Fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert or replace a field. Crate-internal: schema validation
    /// happens in the store and the codec before this is called.
    pub(crate) fn insert(&mut self, name: String, value: FilterValue) {
        self.values.insert(name, value);
    }
}
