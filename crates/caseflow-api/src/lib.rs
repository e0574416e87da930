// caseflow-api: Async Rust client for the case-management platform REST API.
//
// The platform exposes read endpoints for its registries (households,
// individuals, grievance tickets, payment plans) under /api/rest/, scoped
// by business area and program. Auth is a DRF token in the Authorization
// header.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::RestClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{Paged, ServerInfo};
