//! Per-view filter state: schema, draft/applied store, and URL codec.
//!
//! Every list view owns a [`FilterStore`] created from that view's
//! [`FilterSchema`]. The user edits a **draft**; nothing leaves the draft
//! until [`FilterStore::apply`] clones it into the **applied** snapshot and
//! publishes it on a watch channel. Query execution reads only applied
//! snapshots, so half-typed filters never reach the network.
//!
//! The [`codec`] module maps filter state to and from URL query strings:
//! the same encoding feeds shareable web links and REST request parameters.

pub mod codec;
pub mod schema;
pub mod state;
pub mod store;
pub mod value;

pub use schema::{FieldSpec, FilterSchema};
pub use state::FilterState;
pub use store::{AppliedFilter, FilterStore};
pub use value::{FieldKind, FilterValue};

use thiserror::Error;

/// Rejected filter edits. These are programming errors in practice: the
/// schema is static per view, so a mismatch means a flag or key-binding
/// maps to the wrong field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Unknown filter field: {name}")]
    UnknownField { name: String },

    #[error("Filter field {field} expects a {expected} value, got {got}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        got: FieldKind,
    },
}
