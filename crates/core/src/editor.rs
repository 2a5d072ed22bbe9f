//! Record lifecycle writes: batch creation, single comment edit and bulk
//! comment edit, each followed by its audit-trail entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardBatch, CommentUpdate, HistoryAction, NewBoardRecord, NewHistoryEntry};
use crate::error::{BatchFailure, CoreError, StoreError};
use crate::identity::Identity;
use crate::serial;
use crate::store::RecordStore;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Policy and modes
// ---------------------------------------------------------------------------

/// What a failed history append means for the comment write it follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditPolicy {
    /// Keep the comment change and log the missing history entry.
    #[default]
    BestEffort,
    /// Restore the previous comment and fail the edit.
    Required,
}

impl AuditPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditPolicy::BestEffort => "best-effort",
            AuditPolicy::Required => "required",
        }
    }
}

impl fmt::Display for AuditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "best-effort" => Ok(AuditPolicy::BestEffort),
            "required" => Ok(AuditPolicy::Required),
            other => Err(CoreError::Validation(format!("Unknown audit policy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkMode {
    #[default]
    Append,
    Overwrite,
}

impl BulkMode {
    /// New comment value for a record whose current comment is `old`.
    pub fn apply(self, old: &str, text: &str) -> String {
        match self {
            BulkMode::Append if !old.is_empty() => format!("{old}\n{text}"),
            BulkMode::Append | BulkMode::Overwrite => text.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedBoard {
    pub id: DbId,
    pub serial_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    Recorded { history_id: DbId },
    Missing { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub board_id: DbId,
    pub old_value: String,
    pub new_value: String,
    pub audit: AuditOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkEditReport {
    pub updated: Vec<DbId>,
    pub failures: Vec<BatchFailure>,
}

impl BulkEditReport {
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failures.len()
    }

    /// `Err(PartialBatch)` when any id failed. Successful ids stay committed.
    pub fn into_result(self) -> Result<Vec<DbId>, CoreError> {
        if self.failures.is_empty() {
            Ok(self.updated)
        } else {
            Err(CoreError::PartialBatch {
                attempted: self.attempted(),
                failures: self.failures,
            })
        }
    }
}

fn require_identity(identity: Option<&Identity>) -> Result<&Identity, CoreError> {
    identity.ok_or_else(|| CoreError::Unauthorized("Sign in required".into()))
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Create one record per unit of `batch.quantity` with freshly allocated
/// serials. Stops at the first failed write; records already written stay.
pub async fn create_batch<S: RecordStore + ?Sized>(
    store: &S,
    identity: Option<&Identity>,
    batch: &BoardBatch,
) -> Result<Vec<CreatedBoard>, CoreError> {
    let identity = require_identity(identity)?;
    let creation_date = batch.creation_date_string();
    let serials = serial::allocate(
        store,
        &batch.board_name,
        batch.creation_date,
        &creation_date,
        batch.quantity,
    )
    .await?;

    let mut created = Vec::with_capacity(serials.len());
    for serial_number in serials {
        let record = NewBoardRecord {
            serial_number,
            board_name: batch.board_name.clone(),
            technician: batch.technician.clone(),
            comments: batch.comments.clone(),
            creation_date: creation_date.clone(),
            created_by: identity.email.clone(),
        };
        let id = store.create_board(&record).await?;
        tracing::info!(board_id = id, serial = %record.serial_number, "Board created");
        created.push(CreatedBoard {
            id,
            serial_number: record.serial_number,
        });
    }
    Ok(created)
}

// ---------------------------------------------------------------------------
// Comment edits
// ---------------------------------------------------------------------------

/// Write `new_value` and append its history entry under `policy`.
async fn write_comment<S: RecordStore + ?Sized>(
    store: &S,
    identity: &Identity,
    board: &Board,
    new_value: String,
    action: HistoryAction,
    policy: AuditPolicy,
) -> Result<EditOutcome, CoreError> {
    let update = CommentUpdate {
        comments: new_value.clone(),
        updated_by: identity.email.clone(),
    };
    store.update_comments(board.id, &update).await?;

    let entry = NewHistoryEntry::comments(action, &board.comments, &new_value, &identity.email);
    let audit = match store.append_history(board.id, &entry).await {
        Ok(history_id) => AuditOutcome::Recorded { history_id },
        Err(e) => match policy {
            AuditPolicy::BestEffort => {
                tracing::warn!(board_id = board.id, error = %e, "History write failed; comment change kept");
                AuditOutcome::Missing {
                    reason: e.to_string(),
                }
            }
            AuditPolicy::Required => {
                tracing::warn!(board_id = board.id, error = %e, "History write failed; restoring previous comment");
                let restore = CommentUpdate {
                    comments: board.comments.clone(),
                    updated_by: board.updated_by.clone(),
                };
                if let Err(restore_err) = store.update_comments(board.id, &restore).await {
                    tracing::error!(board_id = board.id, error = %restore_err, "Failed to restore previous comment");
                }
                return Err(e.into());
            }
        },
    };

    Ok(EditOutcome {
        board_id: board.id,
        old_value: board.comments.clone(),
        new_value,
        audit,
    })
}

async fn load_board<S: RecordStore + ?Sized>(store: &S, id: DbId) -> Result<Board, StoreError> {
    store
        .find_board(id)
        .await?
        .ok_or(StoreError::NotFound { entity: "Board", id })
}

/// Replace one record's comment. The text is stored as given.
pub async fn edit_comment<S: RecordStore + ?Sized>(
    store: &S,
    identity: Option<&Identity>,
    id: DbId,
    text: &str,
    policy: AuditPolicy,
) -> Result<EditOutcome, CoreError> {
    let identity = require_identity(identity)?;
    let board = load_board(store, id).await?;
    let outcome = write_comment(
        store,
        identity,
        &board,
        text.to_string(),
        HistoryAction::Update,
        policy,
    )
    .await?;
    tracing::info!(board_id = id, by = %identity.email, "Comment updated");
    Ok(outcome)
}

/// Apply `text` to every id in turn. A failed id is reported and the rest
/// are still processed; nothing already written is rolled back.
pub async fn bulk_edit<S: RecordStore + ?Sized>(
    store: &S,
    identity: Option<&Identity>,
    ids: &[DbId],
    text: &str,
    mode: BulkMode,
    policy: AuditPolicy,
) -> Result<BulkEditReport, CoreError> {
    let identity = require_identity(identity)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CoreError::Validation("Enter comment text to apply".into()));
    }
    if ids.is_empty() {
        return Err(CoreError::Validation("No rows selected".into()));
    }

    let mut report = BulkEditReport::default();
    for &id in ids {
        let result: Result<EditOutcome, CoreError> = async {
            let board = load_board(store, id).await?;
            let new_value = mode.apply(&board.comments, text);
            write_comment(store, identity, &board, new_value, HistoryAction::BulkUpdate, policy)
                .await
        }
        .await;

        match result {
            Ok(_) => report.updated.push(id),
            Err(e) => {
                tracing::warn!(board_id = id, error = %e, "Bulk update failed for board");
                report.failures.push(BatchFailure {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        updated = report.updated.len(),
        failed = report.failures.len(),
        ?mode,
        "Bulk comment edit finished"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::identity::tests::identity;
    use crate::memory::MemoryStore;
    use crate::store::Subscription;
    use crate::view::SortSpec;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use crate::board::HistoryEntry;

    /// Wraps a [`MemoryStore`] and fails chosen writes.
    #[derive(Default)]
    pub(crate) struct FaultyStore {
        pub inner: MemoryStore,
        pub fail_updates: Mutex<HashSet<DbId>>,
        pub fail_history: Mutex<bool>,
        pub deny_reads: Mutex<bool>,
    }

    #[async_trait]
    impl RecordStore for FaultyStore {
        async fn subscribe(&self, order: SortSpec) -> Result<Subscription, StoreError> {
            if *self.deny_reads.lock().unwrap() {
                return Err(StoreError::PermissionDenied("read denied".into()));
            }
            self.inner.subscribe(order).await
        }

        async fn list_boards(&self, order: SortSpec) -> Result<Vec<Board>, StoreError> {
            self.inner.list_boards(order).await
        }

        async fn find_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
            self.inner.find_board(id).await
        }

        async fn list_batch(&self, name: &str, date: &str) -> Result<Vec<Board>, StoreError> {
            self.inner.list_batch(name, date).await
        }

        async fn create_board(&self, record: &NewBoardRecord) -> Result<DbId, StoreError> {
            self.inner.create_board(record).await
        }

        async fn update_comments(&self, id: DbId, update: &CommentUpdate) -> Result<(), StoreError> {
            if self.fail_updates.lock().unwrap().contains(&id) {
                return Err(StoreError::PermissionDenied(format!("update {id} denied")));
            }
            self.inner.update_comments(id, update).await
        }

        async fn append_history(
            &self,
            board_id: DbId,
            entry: &NewHistoryEntry,
        ) -> Result<DbId, StoreError> {
            if *self.fail_history.lock().unwrap() {
                return Err(StoreError::Unavailable("history offline".into()));
            }
            self.inner.append_history(board_id, entry).await
        }

        async fn list_history(&self, board_id: DbId) -> Result<Vec<HistoryEntry>, StoreError> {
            if *self.deny_reads.lock().unwrap() {
                return Err(StoreError::PermissionDenied("history denied".into()));
            }
            self.inner.list_history(board_id).await
        }
    }

    pub(crate) fn batch(name: &str, quantity: u32) -> BoardBatch {
        BoardBatch {
            technician: "Ana".into(),
            board_name: name.into(),
            quantity,
            creation_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            comments: "N/A".into(),
        }
    }

    async fn seeded(store: &FaultyStore, comments: &[&str]) -> Vec<DbId> {
        let who = identity("ana@example.com");
        let created = create_batch(store, Some(&who), &batch("101-Relay", comments.len() as u32))
            .await
            .unwrap();
        for (c, text) in created.iter().zip(comments) {
            store
                .inner
                .update_comments(
                    c.id,
                    &CommentUpdate {
                        comments: text.to_string(),
                        updated_by: who.email.clone(),
                    },
                )
                .await
                .unwrap();
        }
        created.into_iter().map(|c| c.id).collect()
    }

    // -----------------------------------------------------------------------
    // Modes and policies
    // -----------------------------------------------------------------------

    #[test]
    fn append_joins_with_newline() {
        assert_eq!(BulkMode::Append.apply("A", "B"), "A\nB");
        assert_eq!(BulkMode::Append.apply("", "B"), "B");
    }

    #[test]
    fn overwrite_replaces() {
        assert_eq!(BulkMode::Overwrite.apply("A", "B"), "B");
    }

    #[test]
    fn audit_policy_parses() {
        assert_eq!("required".parse::<AuditPolicy>().unwrap(), AuditPolicy::Required);
        assert_eq!(" best-effort ".parse::<AuditPolicy>().unwrap(), AuditPolicy::BestEffort);
        assert_matches!("strict".parse::<AuditPolicy>(), Err(CoreError::Validation(_)));
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn batch_creation_continues_numbering() {
        let store = FaultyStore::default();
        let who = identity("ana@example.com");
        create_batch(&store, Some(&who), &batch("101-Relay", 2)).await.unwrap();
        let second = create_batch(&store, Some(&who), &batch("101-Relay", 1)).await.unwrap();
        assert_eq!(second[0].serial_number, "SN-240305-101-003");

        let board = store.find_board(second[0].id).await.unwrap().unwrap();
        assert_eq!(board.created_by, "ana@example.com");
        assert_eq!(board.creation_date, "2024-03-05");
    }

    #[tokio::test]
    async fn creation_requires_identity() {
        let store = FaultyStore::default();
        let result = create_batch(&store, None, &batch("101-Relay", 1)).await;
        assert_matches!(result, Err(CoreError::Unauthorized(_)));
        assert!(store.list_boards(SortSpec::default()).await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Single edit
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn single_edit_writes_comment_and_history() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["old"]).await;
        let who = identity("bo@example.com");

        let outcome = edit_comment(&store, Some(&who), ids[0], "new", AuditPolicy::BestEffort)
            .await
            .unwrap();
        assert_eq!(outcome.old_value, "old");
        assert_matches!(outcome.audit, AuditOutcome::Recorded { .. });

        let board = store.find_board(ids[0]).await.unwrap().unwrap();
        assert_eq!(board.comments, "new");
        assert_eq!(board.updated_by, "bo@example.com");

        let history = store.list_history(ids[0]).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Update);
        assert_eq!(history[0].old_value, "old");
        assert_eq!(history[0].new_value, "new");
    }

    #[tokio::test]
    async fn single_edit_signed_out_writes_nothing() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["old"]).await;
        let result = edit_comment(&store, None, ids[0], "new", AuditPolicy::BestEffort).await;
        assert_matches!(result, Err(CoreError::Unauthorized(_)));
        assert_eq!(store.find_board(ids[0]).await.unwrap().unwrap().comments, "old");
    }

    #[tokio::test]
    async fn best_effort_keeps_change_when_history_fails() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["old"]).await;
        *store.fail_history.lock().unwrap() = true;

        let outcome = edit_comment(
            &store,
            Some(&identity("bo@example.com")),
            ids[0],
            "new",
            AuditPolicy::BestEffort,
        )
        .await
        .unwrap();
        assert_matches!(outcome.audit, AuditOutcome::Missing { .. });
        assert_eq!(store.find_board(ids[0]).await.unwrap().unwrap().comments, "new");
    }

    #[tokio::test]
    async fn required_audit_restores_previous_comment() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["old"]).await;
        *store.fail_history.lock().unwrap() = true;

        let result = edit_comment(
            &store,
            Some(&identity("bo@example.com")),
            ids[0],
            "new",
            AuditPolicy::Required,
        )
        .await;
        assert_matches!(result, Err(CoreError::Network(_)));

        let board = store.find_board(ids[0]).await.unwrap().unwrap();
        assert_eq!(board.comments, "old");
        assert_eq!(board.updated_by, "ana@example.com");
    }

    #[tokio::test]
    async fn permission_denied_update_is_forbidden() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["old"]).await;
        store.fail_updates.lock().unwrap().insert(ids[0]);

        let result = edit_comment(
            &store,
            Some(&identity("bo@example.com")),
            ids[0],
            "new",
            AuditPolicy::BestEffort,
        )
        .await;
        assert_matches!(result, Err(e) if e.is_permission_denied());
    }

    // -----------------------------------------------------------------------
    // Bulk edit
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn bulk_append_and_overwrite() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["A", "A"]).await;
        let who = identity("bo@example.com");

        bulk_edit(&store, Some(&who), &ids[..1], "B", BulkMode::Append, AuditPolicy::BestEffort)
            .await
            .unwrap();
        bulk_edit(&store, Some(&who), &ids[1..], "B", BulkMode::Overwrite, AuditPolicy::BestEffort)
            .await
            .unwrap();

        assert_eq!(store.find_board(ids[0]).await.unwrap().unwrap().comments, "A\nB");
        assert_eq!(store.find_board(ids[1]).await.unwrap().unwrap().comments, "B");
        let history = store.list_history(ids[0]).await.unwrap();
        assert_eq!(history[0].action, HistoryAction::BulkUpdate);
    }

    #[tokio::test]
    async fn bulk_failure_does_not_abort_remaining_ids() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["A", "A", "A"]).await;
        store.fail_updates.lock().unwrap().insert(ids[1]);

        let report = bulk_edit(
            &store,
            Some(&identity("bo@example.com")),
            &ids,
            "B",
            BulkMode::Overwrite,
            AuditPolicy::BestEffort,
        )
        .await
        .unwrap();

        assert_eq!(report.updated, vec![ids[0], ids[2]]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, ids[1]);
        assert_eq!(store.find_board(ids[2]).await.unwrap().unwrap().comments, "B");

        assert_matches!(
            report.into_result(),
            Err(CoreError::PartialBatch { attempted: 3, failures }) if failures.len() == 1
        );
    }

    #[tokio::test]
    async fn bulk_missing_id_is_reported() {
        let store = FaultyStore::default();
        let ids = seeded(&store, &["A"]).await;
        let report = bulk_edit(
            &store,
            Some(&identity("bo@example.com")),
            &[ids[0], 999],
            "B",
            BulkMode::Append,
            AuditPolicy::BestEffort,
        )
        .await
        .unwrap();
        assert_eq!(report.updated, vec![ids[0]]);
        assert_eq!(report.failures[0].id, 999);
    }

    #[tokio::test]
    async fn bulk_rejects_blank_text_and_empty_ids() {
        let store = FaultyStore::default();
        let who = identity("bo@example.com");
        assert_matches!(
            bulk_edit(&store, Some(&who), &[1], "   ", BulkMode::Append, AuditPolicy::BestEffort).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            bulk_edit(&store, Some(&who), &[], "B", BulkMode::Append, AuditPolicy::BestEffort).await,
            Err(CoreError::Validation(_))
        );
    }
}
