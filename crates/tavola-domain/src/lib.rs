//! Domain types shared across the Tavola server.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod email;
pub mod pagination;
pub mod username;
pub mod visibility;
