//! Prompt Compilation Gateway - HTTP surface over the collaborators
//!
//! - auth: bearer API key extraction
//! - routes: compile + pre-flight, span lookup
//! - router: axum router with tracing
//! - server: bind and serve

pub mod auth;
pub mod error;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;

pub use router::gateway_router;
pub use server::serve;
pub use state::GatewayState;
