//! Canonical domain types for the four registries, plus [`EntityId`].
//!
//! Each entity module also carries that registry's REST collection
//! segment, its web list-page path, and its canonical filter schema —
//! the one source of truth both UIs and the codec work from.

pub mod entity_id;
pub mod grievance;
pub mod household;
pub mod individual;
pub mod payment;

pub use entity_id::EntityId;
pub use grievance::{GrievanceTicket, TicketCategory, TicketStatus};
pub use household::{Household, ResidenceStatus};
pub use individual::{Individual, Sex};
pub use payment::{PaymentPlan, PlanStatus};
