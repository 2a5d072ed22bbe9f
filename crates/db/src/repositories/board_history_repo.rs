//! Repository for the `board_history` table.

use boardtrack_core::board::NewHistoryEntry;
use boardtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::board_history::BoardHistoryRow;

/// Column list for board_history queries.
const COLUMNS: &str =
    "id, board_id, action, field, old_value, new_value, changed_by, changed_at";

pub struct BoardHistoryRepo;

impl BoardHistoryRepo {
    /// Append an entry to a board in `namespace`.
    ///
    /// Returns `None` when no such board exists in the namespace.
    pub async fn create(
        pool: &PgPool,
        namespace: &str,
        board_id: DbId,
        input: &NewHistoryEntry,
    ) -> Result<Option<BoardHistoryRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO board_history
                (board_id, action, field, old_value, new_value, changed_by)
             SELECT b.id, $3, $4, $5, $6, $7 FROM boards b
             WHERE b.id = $1 AND b.namespace = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardHistoryRow>(&query)
            .bind(board_id)
            .bind(namespace)
            .bind(input.action.as_str())
            .bind(&input.field)
            .bind(&input.old_value)
            .bind(&input.new_value)
            .bind(&input.by)
            .fetch_optional(pool)
            .await
    }

    /// History for one board, newest first.
    pub async fn list_by_board(
        pool: &PgPool,
        namespace: &str,
        board_id: DbId,
    ) -> Result<Vec<BoardHistoryRow>, sqlx::Error> {
        sqlx::query_as::<_, BoardHistoryRow>(
            "SELECT h.id, h.board_id, h.action, h.field, h.old_value, h.new_value,
                    h.changed_by, h.changed_at
             FROM board_history h
             JOIN boards b ON b.id = h.board_id
             WHERE h.board_id = $1 AND b.namespace = $2
             ORDER BY h.changed_at DESC, h.id DESC",
        )
        .bind(board_id)
        .bind(namespace)
        .fetch_all(pool)
        .await
    }
}
