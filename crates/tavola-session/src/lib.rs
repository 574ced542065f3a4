//! Session-cookie authentication for the Tavola server.
//!
//! The session is an HS256 JWT carried in an HttpOnly cookie. `cookie` builds
//! and clears the cookie, `token` issues and validates the JWT, `extract`
//! provides the axum extractor handlers use to require a signed-in user.

pub mod cookie;
pub mod extract;
pub mod token;
