//! Board tracker change notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BoardEvent`]: one committed change to a board record.
//!
//! Every live collection feed and WebSocket push is driven from this bus.

pub mod bus;

pub use bus::{BoardEvent, BoardEventKind, EventBus};
