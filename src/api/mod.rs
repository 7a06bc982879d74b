//! HTTP API.
//!
//! All routes are nested under `/api/`. Intake (`/api/triage`) is the only
//! route behind the ambulance device-token check; dashboards and routing
//! endpoints are open to the hospital and doctor front ends.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
