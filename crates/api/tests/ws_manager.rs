//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades.

use axum::extract::ws::Message;
use boardtrack_api::ws::WsManager;

fn email() -> String {
    "ana@example.com".to_string()
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string(), email()).await;
    let _rx2 = manager.add("conn-2".to_string(), email()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: send_to() reaches only the addressed connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_reaches_only_addressed_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), email()).await;
    let mut rx2 = manager.add("conn-2".to_string(), email()).await;

    assert!(manager.send_to("conn-2", Message::Text("snapshot".into())).await);

    let msg = rx2.recv().await.expect("rx2 should receive the message");
    assert!(matches!(&msg, Message::Text(t) if *t == "snapshot"));
    assert!(rx1.try_recv().is_err(), "conn-1 must not receive it");
}

// ---------------------------------------------------------------------------
// Test: send_to() reports gone or closed connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_reports_missing_and_closed_connections() {
    let manager = WsManager::new();
    assert!(!manager.send_to("nobody", Message::Text("x".into())).await);

    let rx = manager.add("conn-1".to_string(), email()).await;
    drop(rx);
    assert!(!manager.send_to("conn-1", Message::Text("x".into())).await);
}

// ---------------------------------------------------------------------------
// Test: ping_all() pings every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_pings_every_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), email()).await;
    let mut rx2 = manager.add("conn-2".to_string(), email()).await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), email()).await;
    let mut rx2 = manager.add("conn-2".to_string(), email()).await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)), "Expected Close(None), got: {msg1:?}");
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)), "Expected Close(None), got: {msg2:?}");

    assert!(rx1.recv().await.is_none(), "Channel should be closed after shutdown");
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();
    let _rx_old = manager.add("conn-1".to_string(), email()).await;
    let mut rx_new = manager.add("conn-1".to_string(), email()).await;
    assert_eq!(manager.connection_count().await, 1);

    assert!(manager.send_to("conn-1", Message::Text("replaced".into())).await);
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if *t == "replaced"));
}
