//! WebSocket infrastructure for live board snapshots.
//!
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{ws_handler, WsFrame};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
