//! The record store seam.
//!
//! [`RecordStore`] is the only way the rest of the system reaches persisted
//! boards and their history. Implementations: [`MemoryStore`](crate::memory::MemoryStore)
//! in this crate and `PgRecordStore` in `boardtrack-db`.

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::board::{Board, CommentUpdate, HistoryEntry, NewBoardRecord, NewHistoryEntry};
use crate::error::StoreError;
use crate::types::DbId;
use crate::view::SortSpec;

/// One push from a live subscription: the whole collection, or the error
/// that ended the attempt to load it.
pub type Snapshot = Result<Vec<Board>, StoreError>;

/// Snapshots buffered per subscriber before the feed waits on the consumer.
const SUBSCRIPTION_BUFFER: usize = 16;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a live, push-based feed of the full collection in `order`.
    ///
    /// The first snapshot is delivered immediately; a new one follows every
    /// committed change. Dropping the [`Subscription`] unsubscribes.
    async fn subscribe(&self, order: SortSpec) -> Result<Subscription, StoreError>;

    /// One-shot read of the full collection in `order`.
    async fn list_boards(&self, order: SortSpec) -> Result<Vec<Board>, StoreError>;

    async fn find_board(&self, id: DbId) -> Result<Option<Board>, StoreError>;

    /// All records sharing one `(board_name, creation_date)` batch key.
    async fn list_batch(
        &self,
        board_name: &str,
        creation_date: &str,
    ) -> Result<Vec<Board>, StoreError>;

    async fn create_board(&self, record: &NewBoardRecord) -> Result<DbId, StoreError>;

    /// Overwrite `comments` / `updated_by` and stamp `updated_at`.
    async fn update_comments(&self, id: DbId, update: &CommentUpdate) -> Result<(), StoreError>;

    async fn append_history(
        &self,
        board_id: DbId,
        entry: &NewHistoryEntry,
    ) -> Result<DbId, StoreError>;

    /// History for one board, newest first.
    async fn list_history(&self, board_id: DbId) -> Result<Vec<HistoryEntry>, StoreError>;
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle to a live collection feed.
pub struct Subscription {
    rx: mpsc::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wait for the next snapshot. `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Stop the feed. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawn a feed that pushes `load()` once, then again after every message on
/// `changes`.
///
/// Subscribe to `changes` *before* calling this so no commit between the
/// initial load and the first `recv` is missed. A lagged receiver simply
/// reloads; the collection is always replaced wholesale.
pub fn spawn_snapshot_feed<T, F, Fut>(mut changes: broadcast::Receiver<T>, load: F) -> Subscription
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Snapshot> + Send,
{
    let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
    let task = tokio::spawn(async move {
        if tx.send(load().await).await.is_err() {
            return;
        }
        loop {
            match changes.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if tx.send(load().await).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("Snapshot feed ended");
    });

    Subscription {
        rx,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn feed_pushes_initial_then_one_per_change() {
        let (tx, rx) = broadcast::channel::<()>(8);
        let counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let loads = std::sync::Arc::clone(&counter);
        let mut sub = spawn_snapshot_feed(rx, move || {
            let n = loads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(Vec::new())
                } else {
                    Err(StoreError::Unavailable(format!("load {n}")))
                }
            }
        });

        assert_eq!(sub.next().await, Some(Ok(Vec::new())));
        tx.send(()).unwrap();
        assert_eq!(
            sub.next().await,
            Some(Err(StoreError::Unavailable("load 1".into())))
        );
    }

    #[tokio::test]
    async fn feed_ends_when_change_source_closes() {
        let (tx, rx) = broadcast::channel::<()>(8);
        let mut sub = spawn_snapshot_feed(rx, || async { Ok(Vec::new()) });
        assert!(sub.next().await.is_some());
        drop(tx);
        assert_eq!(sub.next().await, None);
    }
}
