//! Shared plumbing for the Tavola server: tracing setup, health handlers,
//! request-id middleware, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
