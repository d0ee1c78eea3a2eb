//! Route groups mounted by the gateway router.

pub mod prompt;
pub mod span;
