//! promptgate - prompt compilation gateway
//!
//! Authenticates SDK callers by bearer API key, resolves versioned prompt
//! templates through a pluggable compiler, substitutes variables, and
//! reports one success/failure telemetry event per fetch.

pub mod client;
pub mod compiler;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
mod http;
pub mod lookup;
pub mod telemetry;

pub use error::{GatewayError, Result};
pub use gateway::{GatewayState, gateway_router};
