//! [`RecordStore`] backed by Postgres.
//!
//! Writes publish a [`BoardEvent`] on the shared [`EventBus`]; every live
//! subscription reloads the namespace's collection when one arrives.

use std::sync::Arc;

use async_trait::async_trait;
use boardtrack_core::board::{Board, CommentUpdate, HistoryEntry, NewBoardRecord, NewHistoryEntry};
use boardtrack_core::error::StoreError;
use boardtrack_core::store::{spawn_snapshot_feed, RecordStore, Subscription};
use boardtrack_core::types::DbId;
use boardtrack_core::view::SortSpec;
use boardtrack_events::{BoardEvent, BoardEventKind, EventBus};
use sqlx::PgPool;

use crate::repositories::{BoardHistoryRepo, BoardRepo};

/// Postgres `insufficient_privilege`, raised by grants and row-level security.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Translate a driver error into the store taxonomy.
pub fn classify_sqlx_error(err: &sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) {
            return StoreError::PermissionDenied(db_err.message().to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn store_err(err: sqlx::Error) -> StoreError {
    let mapped = classify_sqlx_error(&err);
    tracing::error!(error = %err, "Board store query failed");
    mapped
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    namespace: String,
    bus: Arc<EventBus>,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, namespace: impl Into<String>, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
            bus,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load(pool: &PgPool, namespace: &str, order: SortSpec) -> Result<Vec<Board>, StoreError> {
        let rows = BoardRepo::list(pool, namespace, order).await.map_err(store_err)?;
        Ok(rows.into_iter().map(Board::from).collect())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn subscribe(&self, order: SortSpec) -> Result<Subscription, StoreError> {
        let changes = self.bus.subscribe();
        let pool = self.pool.clone();
        let namespace = self.namespace.clone();
        tracing::debug!(namespace = %namespace, ?order, "Opening board subscription");
        Ok(spawn_snapshot_feed(changes, move || {
            let pool = pool.clone();
            let namespace = namespace.clone();
            async move { Self::load(&pool, &namespace, order).await }
        }))
    }

    async fn list_boards(&self, order: SortSpec) -> Result<Vec<Board>, StoreError> {
        Self::load(&self.pool, &self.namespace, order).await
    }

    async fn find_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
        let row = BoardRepo::find_by_id(&self.pool, &self.namespace, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Board::from))
    }

    async fn list_batch(
        &self,
        board_name: &str,
        creation_date: &str,
    ) -> Result<Vec<Board>, StoreError> {
        let rows = BoardRepo::list_batch(&self.pool, &self.namespace, board_name, creation_date)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Board::from).collect())
    }

    async fn create_board(&self, record: &NewBoardRecord) -> Result<DbId, StoreError> {
        let row = BoardRepo::create(&self.pool, &self.namespace, record)
            .await
            .map_err(store_err)?;
        self.bus.publish(
            BoardEvent::new(BoardEventKind::Created, &self.namespace, row.id)
                .with_actor(&record.created_by),
        );
        Ok(row.id)
    }

    async fn update_comments(&self, id: DbId, update: &CommentUpdate) -> Result<(), StoreError> {
        BoardRepo::update_comments(&self.pool, &self.namespace, id, update)
            .await
            .map_err(store_err)?
            .ok_or(StoreError::NotFound { entity: "Board", id })?;
        self.bus.publish(
            BoardEvent::new(BoardEventKind::CommentsUpdated, &self.namespace, id)
                .with_actor(&update.updated_by),
        );
        Ok(())
    }

    async fn append_history(
        &self,
        board_id: DbId,
        entry: &NewHistoryEntry,
    ) -> Result<DbId, StoreError> {
        let row = BoardHistoryRepo::create(&self.pool, &self.namespace, board_id, entry)
            .await
            .map_err(store_err)?
            .ok_or(StoreError::NotFound {
                entity: "Board",
                id: board_id,
            })?;
        Ok(row.id)
    }

    async fn list_history(&self, board_id: DbId) -> Result<Vec<HistoryEntry>, StoreError> {
        let rows = BoardHistoryRepo::list_by_board(&self.pool, &self.namespace, board_id)
            .await
            .map_err(store_err)?;
        rows.into_iter()
            .map(|row| HistoryEntry::try_from(row).map_err(StoreError::Unavailable))
            .collect()
    }
}
