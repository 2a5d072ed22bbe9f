use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use boardtrack_core::board::Board;
use boardtrack_core::error::StoreError;
use boardtrack_core::store::{RecordStore, Subscription};
use boardtrack_core::view::SortSpec;
use futures::{SinkExt, StreamExt};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Outbound text frame payload.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsFrame<'a> {
    /// The full collection, newest production date first.
    Snapshot { boards: &'a [Board] },
    /// The live feed failed. `FORBIDDEN` means the session lost read access.
    Error { code: &'static str, message: String },
}

impl WsFrame<'_> {
    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode WebSocket frame");
                None
            }
        }
    }
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// Requires a bearer token. After the upgrade the connection gets its own
/// collection subscription and receives every snapshot as a JSON text frame.
pub async fn ws_handler(
    auth: AuthUser,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let subscription = state.store.subscribe(SortSpec::default()).await?;
    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, auth, subscription, state.ws_manager)
    }))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Spawns a feed task that pushes every snapshot to this connection.
///   4. Processes inbound messages on the current task.
///   5. Cleans up on disconnect.
async fn handle_socket(
    socket: WebSocket,
    auth: AuthUser,
    subscription: Subscription,
    ws_manager: Arc<WsManager>,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, email = %auth.email, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), auth.email.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let feed_task = tokio::spawn(forward_snapshots(
        subscription,
        conn_id.clone(),
        Arc::clone(&ws_manager),
    ));

    // Receiver loop: the client only ever closes or answers pings.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Aborting the feed task drops the subscription.
    ws_manager.remove(&conn_id).await;
    feed_task.abort();
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Push each snapshot to `conn_id` until the feed or the connection ends.
async fn forward_snapshots(mut subscription: Subscription, conn_id: String, ws_manager: Arc<WsManager>) {
    while let Some(snapshot) = subscription.next().await {
        let frame = match &snapshot {
            Ok(boards) => WsFrame::Snapshot { boards },
            Err(StoreError::PermissionDenied(msg)) => WsFrame::Error {
                code: "FORBIDDEN",
                message: msg.clone(),
            },
            Err(e) => WsFrame::Error {
                code: "STORE_UNAVAILABLE",
                message: e.to_string(),
            },
        };
        let Some(message) = frame.to_message() else {
            continue;
        };
        if !ws_manager.send_to(&conn_id, message).await {
            break;
        }
    }
    tracing::debug!(conn_id = %conn_id, "Snapshot forwarding stopped");
}
