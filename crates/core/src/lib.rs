//! Board tracker domain logic.
//!
//! Everything here is free of HTTP and SQL. The external collaborators, the
//! record store and the identity provider, are reached through the
//! [`RecordStore`] and [`IdentityProvider`] traits; [`Tracker`] owns one
//! session's state and mediates between snapshot pushes and user actions.

pub mod board;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;
pub mod identity;
pub mod memory;
pub mod selection;
pub mod serial;
pub mod store;
pub mod table;
pub mod tracker;
pub mod types;
pub mod view;

pub use error::{CoreError, StoreError};
pub use identity::{Identity, IdentityProvider, SessionManager};
pub use store::{RecordStore, Subscription};
pub use tracker::Tracker;
