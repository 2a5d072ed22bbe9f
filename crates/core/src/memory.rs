//! In-process [`RecordStore`] used for tests, demos and local development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::board::{Board, CommentUpdate, HistoryEntry, NewBoardRecord, NewHistoryEntry};
use crate::error::StoreError;
use crate::store::{spawn_snapshot_feed, RecordStore, Subscription};
use crate::types::DbId;
use crate::view::{sort_boards, SortSpec};

/// Change notifications buffered before slow subscribers lag.
const CHANGE_CAPACITY: usize = 64;

#[derive(Default)]
struct Inner {
    next_id: DbId,
    boards: Vec<Board>,
    history: HashMap<DbId, Vec<HistoryEntry>>,
}

impl Inner {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    changes: broadcast::Sender<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            changes,
        }
    }

    fn snapshot(inner: &RwLock<Inner>, order: SortSpec) -> Result<Vec<Board>, StoreError> {
        let guard = inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<&Board> = guard.boards.iter().collect();
        sort_boards(&mut rows, order);
        Ok(rows.into_iter().cloned().collect())
    }

    /// Simulate a deletion made by another client; the tracker never deletes.
    pub fn remove_board(&self, id: DbId) -> Result<(), StoreError> {
        {
            let mut guard = self.inner.write().map_err(|_| poisoned())?;
            guard.boards.retain(|b| b.id != id);
            guard.history.remove(&id);
        }
        let _ = self.changes.send(());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn subscribe(&self, order: SortSpec) -> Result<Subscription, StoreError> {
        let changes = self.changes.subscribe();
        let inner = Arc::clone(&self.inner);
        Ok(spawn_snapshot_feed(changes, move || {
            let result = Self::snapshot(&inner, order);
            async move { result }
        }))
    }

    async fn list_boards(&self, order: SortSpec) -> Result<Vec<Board>, StoreError> {
        Self::snapshot(&self.inner, order)
    }

    async fn find_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.boards.iter().find(|b| b.id == id).cloned())
    }

    async fn list_batch(
        &self,
        board_name: &str,
        creation_date: &str,
    ) -> Result<Vec<Board>, StoreError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard
            .boards
            .iter()
            .filter(|b| b.board_name == board_name && b.creation_date == creation_date)
            .cloned()
            .collect())
    }

    async fn create_board(&self, record: &NewBoardRecord) -> Result<DbId, StoreError> {
        let id = {
            let mut guard = self.inner.write().map_err(|_| poisoned())?;
            let id = guard.allocate_id();
            let now = Utc::now();
            guard.boards.push(Board {
                id,
                serial_number: record.serial_number.clone(),
                board_name: record.board_name.clone(),
                technician: record.technician.clone(),
                comments: record.comments.clone(),
                creation_date: record.creation_date.clone(),
                entry_date: now,
                created_by: record.created_by.clone(),
                updated_by: record.created_by.clone(),
                updated_at: now,
            });
            id
        };
        let _ = self.changes.send(());
        Ok(id)
    }

    async fn update_comments(&self, id: DbId, update: &CommentUpdate) -> Result<(), StoreError> {
        {
            let mut guard = self.inner.write().map_err(|_| poisoned())?;
            let board = guard
                .boards
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(StoreError::NotFound { entity: "Board", id })?;
            board.comments = update.comments.clone();
            board.updated_by = update.updated_by.clone();
            board.updated_at = Utc::now();
        }
        let _ = self.changes.send(());
        Ok(())
    }

    async fn append_history(
        &self,
        board_id: DbId,
        entry: &NewHistoryEntry,
    ) -> Result<DbId, StoreError> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        if !guard.boards.iter().any(|b| b.id == board_id) {
            return Err(StoreError::NotFound {
                entity: "Board",
                id: board_id,
            });
        }
        let id = guard.allocate_id();
        guard.history.entry(board_id).or_default().push(HistoryEntry {
            id,
            board_id,
            action: entry.action,
            field: entry.field.clone(),
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            by: entry.by.clone(),
            at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_history(&self, board_id: DbId) -> Result<Vec<HistoryEntry>, StoreError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        let mut entries = guard.history.get(&board_id).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.at.cmp(&a.at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HistoryAction;

    fn record(serial: &str) -> NewBoardRecord {
        NewBoardRecord {
            serial_number: serial.to_string(),
            board_name: "101-Relay".to_string(),
            technician: "Ana".to_string(),
            comments: "N/A".to_string(),
            creation_date: "2024-03-05".to_string(),
            created_by: "ana@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryStore::new();
        let id = store.create_board(&record("SN-240305-101-001")).await.unwrap();
        let board = store.find_board(id).await.unwrap().unwrap();
        assert_eq!(board.serial_number, "SN-240305-101-001");
        assert_eq!(board.updated_by, "ana@example.com");
    }

    #[tokio::test]
    async fn subscription_pushes_after_each_write() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(SortSpec::default()).await.unwrap();
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 0);

        store.create_board(&record("SN-240305-101-001")).await.unwrap();
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_board_is_not_found() {
        let store = MemoryStore::new();
        let update = CommentUpdate {
            comments: "x".into(),
            updated_by: "a@b.c".into(),
        };
        assert_eq!(
            store.update_comments(99, &update).await,
            Err(StoreError::NotFound { entity: "Board", id: 99 })
        );
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let store = MemoryStore::new();
        let id = store.create_board(&record("SN-1")).await.unwrap();
        for (old, new) in [("N/A", "one"), ("one", "two")] {
            store
                .append_history(
                    id,
                    &NewHistoryEntry::comments(HistoryAction::Update, old, new, "a@b.c"),
                )
                .await
                .unwrap();
        }
        let history = store.list_history(id).await.unwrap();
        assert_eq!(history[0].new_value, "two");
        assert_eq!(history[1].new_value, "one");
    }
}
