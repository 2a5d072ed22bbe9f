use std::sync::Arc;

use boardtrack_db::PgRecordStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: boardtrack_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Board records of the configured namespace.
    pub store: Arc<PgRecordStore>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Change notifications published by `store`.
    pub event_bus: Arc<boardtrack_events::EventBus>,
}

impl AppState {
    /// Wire the store and event bus for `pool` under `config`'s namespace.
    pub fn new(pool: boardtrack_db::DbPool, config: ServerConfig, ws_manager: Arc<WsManager>) -> Self {
        let event_bus = Arc::new(boardtrack_events::EventBus::default());
        let store = Arc::new(PgRecordStore::new(
            pool.clone(),
            config.tracker.namespace.clone(),
            Arc::clone(&event_bus),
        ));
        Self {
            pool,
            config: Arc::new(config),
            store,
            ws_manager,
            event_bus,
        }
    }
}
