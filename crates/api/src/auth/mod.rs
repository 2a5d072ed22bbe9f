//! Bearer token validation.
//!
//! Sign-in itself happens at the external identity provider; this server
//! only checks the tokens it issues.

pub mod jwt;
