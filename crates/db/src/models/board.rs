use boardtrack_core::board::Board;
use boardtrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `boards` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardRow {
    pub id: DbId,
    pub namespace: String,
    pub serial_number: String,
    pub board_name: String,
    pub technician: String,
    pub comments: String,
    pub creation_date: String,
    pub entry_date: Timestamp,
    pub created_by: String,
    pub updated_by: String,
    pub updated_at: Timestamp,
}

impl From<BoardRow> for Board {
    fn from(row: BoardRow) -> Self {
        Board {
            id: row.id,
            serial_number: row.serial_number,
            board_name: row.board_name,
            technician: row.technician,
            comments: row.comments,
            creation_date: row.creation_date,
            entry_date: row.entry_date,
            created_by: row.created_by,
            updated_by: row.updated_by,
            updated_at: row.updated_at,
        }
    }
}
