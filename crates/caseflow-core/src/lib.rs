// caseflow-core: Filter, view, and session layer between caseflow-api
// and consumers (CLI/TUI).

pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod session;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionConfig, TlsVerification};
pub use error::CoreError;
pub use filter::{
    AppliedFilter, FieldKind, FieldSpec, FilterError, FilterSchema, FilterState, FilterStore,
    FilterValue,
};
pub use session::Session;
pub use view::{ListPage, ListSource, ListState, ListView, PageSpec, Phase, ResponseCache, Scope};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Registry rows
    GrievanceTicket, Household, Individual, PaymentPlan,
    // Enumerations
    PlanStatus, ResidenceStatus, Sex, TicketCategory, TicketStatus,
    // Supporting types
    EntityId,
};
