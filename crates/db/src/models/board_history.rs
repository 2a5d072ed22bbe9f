use boardtrack_core::board::{HistoryAction, HistoryEntry};
use boardtrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `board_history` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardHistoryRow {
    pub id: DbId,
    pub board_id: DbId,
    pub action: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_by: String,
    pub changed_at: Timestamp,
}

impl TryFrom<BoardHistoryRow> for HistoryEntry {
    type Error = String;

    fn try_from(row: BoardHistoryRow) -> Result<Self, Self::Error> {
        let action = HistoryAction::parse(&row.action)
            .ok_or_else(|| format!("unknown history action '{}'", row.action))?;
        Ok(HistoryEntry {
            id: row.id,
            board_id: row.board_id,
            action,
            field: row.field,
            old_value: row.old_value,
            new_value: row.new_value,
            by: row.changed_by,
            at: row.changed_at,
        })
    }
}
