//! Repository for the `boards` table.

use boardtrack_core::board::{CommentUpdate, NewBoardRecord};
use boardtrack_core::types::DbId;
use boardtrack_core::view::SortSpec;
use sqlx::PgPool;

use crate::models::board::BoardRow;

/// Column list for boards queries.
const COLUMNS: &str = "id, namespace, serial_number, board_name, technician, comments, \
    creation_date, entry_date, created_by, updated_by, updated_at";

pub struct BoardRepo;

impl BoardRepo {
    /// Insert one record; `updated_by` starts as the creator.
    pub async fn create(
        pool: &PgPool,
        namespace: &str,
        input: &NewBoardRecord,
    ) -> Result<BoardRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO boards
                (namespace, serial_number, board_name, technician, comments,
                 creation_date, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(namespace)
            .bind(&input.serial_number)
            .bind(&input.board_name)
            .bind(&input.technician)
            .bind(&input.comments)
            .bind(&input.creation_date)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        namespace: &str,
        id: DbId,
    ) -> Result<Option<BoardRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1 AND namespace = $2");
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(id)
            .bind(namespace)
            .fetch_optional(pool)
            .await
    }

    /// Every record in the namespace, ordered by `order` (case-insensitive).
    pub async fn list(
        pool: &PgPool,
        namespace: &str,
        order: SortSpec,
    ) -> Result<Vec<BoardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards
             WHERE namespace = $1
             ORDER BY LOWER({column}) {dir}, id {dir}",
            column = order.column.column_name(),
            dir = order.direction.as_sql(),
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(namespace)
            .fetch_all(pool)
            .await
    }

    /// Records of one `(board_name, creation_date)` batch.
    pub async fn list_batch(
        pool: &PgPool,
        namespace: &str,
        board_name: &str,
        creation_date: &str,
    ) -> Result<Vec<BoardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards
             WHERE namespace = $1 AND board_name = $2 AND creation_date = $3
             ORDER BY id"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(namespace)
            .bind(board_name)
            .bind(creation_date)
            .fetch_all(pool)
            .await
    }

    /// Overwrite `comments` and `updated_by`, stamping `updated_at`.
    /// Returns `None` when the record does not exist in the namespace.
    pub async fn update_comments(
        pool: &PgPool,
        namespace: &str,
        id: DbId,
        input: &CommentUpdate,
    ) -> Result<Option<BoardRow>, sqlx::Error> {
        let query = format!(
            "UPDATE boards
             SET comments = $3, updated_by = $4, updated_at = NOW()
             WHERE id = $1 AND namespace = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(id)
            .bind(namespace)
            .bind(&input.comments)
            .bind(&input.updated_by)
            .fetch_optional(pool)
            .await
    }
}
