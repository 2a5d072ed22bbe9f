//! Request extractors.
//!
//! - [`auth::AuthUser`]: the signed-in identity from a JWT Bearer token.

pub mod auth;
