// Draft/applied filter store.
//
// The draft is the mutable scratchpad behind a filter panel or a set of
// CLI flags. The applied snapshot is what query execution reads. Only
// `apply`, `clear`, and `restore` move state from one to the other, and
// each publication bumps a generation counter that the view engine uses
// to discard stale in-flight responses.

use tokio::sync::watch;

use super::FilterError;
use super::codec;
use super::schema::FilterSchema;
use super::state::FilterState;
use super::value::FilterValue;

/// The published half of a [`FilterStore`]: an applied snapshot plus the
/// generation it was published under.
///
/// Generation 0 is the construction-time snapshot; every publication
/// increments it. Consumers tag work with the generation they read and
/// drop results whose generation is no longer current.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedFilter {
    state: FilterState,
    generation: u64,
}

impl AppliedFilter {
    /// The applied filter state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// The generation this snapshot was published under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-view filter store with a draft/applied split.
///
/// Created from the view's [`FilterSchema`]; both draft and applied start
/// at the schema's initial state. Edits validate against the schema, so
/// the state stays schema-closed: never a field the schema doesn't
/// declare, never a value of the wrong kind.
#[derive(Debug)]
pub struct FilterStore {
    schema: FilterSchema,
    draft: FilterState,
    applied: watch::Sender<AppliedFilter>,
}

impl FilterStore {
    pub fn new(schema: FilterSchema) -> Self {
        let initial = schema.initial();
        let (applied, _) = watch::channel(AppliedFilter {
            state: initial.clone(),
            generation: 0,
        });
        Self {
            schema,
            draft: initial,
            applied,
        }
    }

    /// The schema this store was built from.
    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    /// Stage a single-field edit on the draft.
    ///
    /// Never publishes: the applied snapshot, the watch channel, and any
    /// in-flight queries are all untouched until [`apply`](Self::apply).
    pub fn edit(&mut self, field: &str, value: FilterValue) -> Result<(), FilterError> {
        let Some(spec) = self.schema.field(field) else {
            return Err(FilterError::UnknownField {
                name: field.to_owned(),
            });
        };
        if spec.kind() != value.kind() {
            return Err(FilterError::KindMismatch {
                field: field.to_owned(),
                expected: spec.kind(),
                got: value.kind(),
            });
        }
        self.draft.insert(field.to_owned(), value);
        Ok(())
    }

    /// Publish the draft as the new applied snapshot.
    ///
    /// Always bumps the generation and notifies subscribers, even when
    /// the draft equals the current applied state — whether a
    /// value-identical publication warrants a refetch is the view
    /// engine's call, not the store's. Returns the new generation.
    pub fn apply(&mut self) -> u64 {
        self.publish(self.draft.clone())
    }

    /// Reset both draft and applied to the schema's initial state and
    /// publish. Clearing twice yields the same state both times; the
    /// generation still advances each time.
    pub fn clear(&mut self) -> u64 {
        self.draft = self.schema.initial();
        self.publish(self.draft.clone())
    }

    /// Decode a query string into both draft and applied, publishing
    /// once. Used at view creation so a shared link reproduces the view;
    /// decoding is total, so a mangled query degrades to defaults.
    pub fn restore(&mut self, query: &str) -> u64 {
        self.draft = codec::decode(&self.schema, query);
        self.publish(self.draft.clone())
    }

    /// The current draft.
    pub fn draft(&self) -> &FilterState {
        &self.draft
    }

    /// The current applied snapshot.
    pub fn applied(&self) -> AppliedFilter {
        self.applied.borrow().clone()
    }

    /// The generation of the current applied snapshot.
    pub fn generation(&self) -> u64 {
        self.applied.borrow().generation
    }

    /// Subscribe to applied-snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<AppliedFilter> {
        self.applied.subscribe()
    }

    /// `true` when the draft differs from the applied snapshot.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied.borrow().state
    }

    /// `true` when `field`'s draft value differs from the applied one.
    /// Drives per-field "unapplied" markers in the filter panel.
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.draft.get(field) != self.applied.borrow().state.get(field)
    }

    fn publish(&mut self, state: FilterState) -> u64 {
        let mut generation = 0;
        // `send_modify` notifies unconditionally, receivers or not.
        self.applied.send_modify(|applied| {
            applied.state = state;
            applied.generation += 1;
            generation = applied.generation;
        });
        generation
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::filter::FieldKind;
    use crate::filter::schema::FieldSpec;

    fn schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("status", "Status", &["NEW", "CLOSED"]),
            FieldSpec::number_range("priority", "Priority"),
        ])
    }

    #[test]
    fn edit_touches_only_the_draft() {
        let mut store = FilterStore::new(schema());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.edit("search", FilterValue::text("foo")).unwrap();

        assert_eq!(store.draft().get("search"), Some(&FilterValue::text("foo")));
        assert_eq!(
            store.applied().state().get("search"),
            Some(&FilterValue::Text(String::new()))
        );
        assert!(!rx.has_changed().unwrap(), "edit must not publish");
        assert!(store.is_dirty());
    }

    #[test]
    fn apply_publishes_draft_and_bumps_generation() {
        let mut store = FilterStore::new(schema());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.edit("search", FilterValue::text("foo")).unwrap();
        let generation = store.apply();

        assert_eq!(generation, 1);
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.state().get("search"), Some(&FilterValue::text("foo")));
        assert!(!store.is_dirty());
    }

    #[test]
    fn apply_of_identical_draft_still_publishes() {
        let mut store = FilterStore::new(schema());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        let generation = store.apply();

        assert_eq!(generation, 1);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn clear_restores_initial_state_idempotently() {
        let mut store = FilterStore::new(schema());
        store.edit("search", FilterValue::text("foo")).unwrap();
        store
            .edit("status", FilterValue::multi(["NEW"]))
            .unwrap();
        store.apply();

        store.clear();
        let first = store.applied();
        store.clear();
        let second = store.applied();

        assert_eq!(first.state(), &store.schema().initial());
        assert_eq!(second.state(), &store.schema().initial());
        assert_eq!(first.state(), second.state());
        // Observers still see each clear.
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn restore_seeds_both_draft_and_applied() {
        let mut store = FilterStore::new(schema());
        store.restore("?search=foo&status=NEW,CLOSED&priorityMin=2");

        let expected_multi = FilterValue::multi(["NEW", "CLOSED"]);
        assert_eq!(store.draft().get("search"), Some(&FilterValue::text("foo")));
        assert_eq!(store.draft().get("status"), Some(&expected_multi));
        assert_eq!(
            store.draft().get("priority"),
            Some(&FilterValue::NumberRange { min: Some(2.0), max: None })
        );
        assert_eq!(store.applied().state(), store.draft());
        assert!(!store.is_dirty());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut store = FilterStore::new(schema());
        let err = store.edit("bogus", FilterValue::text("x")).unwrap_err();
        assert_eq!(err, FilterError::UnknownField { name: "bogus".into() });
        assert!(!store.is_dirty());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut store = FilterStore::new(schema());
        let err = store
            .edit("status", FilterValue::text("NEW"))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::KindMismatch {
                field: "status".into(),
                expected: FieldKind::Multi,
                got: FieldKind::Text,
            }
        );
        assert!(!store.is_dirty());
    }

    #[test]
    fn field_dirty_tracks_individual_fields() {
        let mut store = FilterStore::new(schema());
        store.edit("search", FilterValue::text("foo")).unwrap();

        assert!(store.is_field_dirty("search"));
        assert!(!store.is_field_dirty("status"));

        store.apply();
        assert!(!store.is_field_dirty("search"));
    }

    #[test]
    fn worked_example_search_foo() {
        // Schema of two empty-default text fields; editing one and
        // applying encodes only that one.
        let mut store = FilterStore::new(FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::text("status", "Status"),
        ]));
        store.edit("search", FilterValue::text("foo")).unwrap();
        store.apply();

        let applied = store.applied();
        assert_eq!(applied.state().get("search"), Some(&FilterValue::text("foo")));
        assert_eq!(
            applied.state().get("status"),
            Some(&FilterValue::Text(String::new()))
        );
        assert_eq!(
            codec::encode_query(store.schema(), applied.state()),
            "search=foo"
        );
    }
}
