//! Screen implementations.
//!
//! Every registry is the same [`browse::BrowseScreen`] generic driven by a
//! per-registry [`browse::TableSpec`]; the modules below only describe
//! columns, sort cycles, and detail layouts.

pub mod browse;
pub mod filter_panel;
pub mod grievances;
pub mod households;
pub mod individuals;
pub mod payments;
