//! Board records, history entries, and the add-board form.
//!
//! A board record is one physical board-production entry. Records are only
//! created through the add-board flow and only their `comments` field is
//! ever mutated afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Comment text stored when the add-board form leaves comments blank.
pub const DEFAULT_COMMENTS: &str = "N/A";

/// The only field the editor mutates and records history for.
pub const FIELD_COMMENTS: &str = "comments";

/// Fixed-width production date format (`YYYY-MM-DD`).
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Most records one add-board submission may create. Matches the
/// `quantity` range on [`NewBoardForm`].
pub const MAX_BATCH_QUANTITY: u32 = 1000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A persisted board record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: DbId,
    pub serial_number: String,
    pub board_name: String,
    pub technician: String,
    pub comments: String,
    /// Logical production date, `YYYY-MM-DD`. Compared as a string.
    pub creation_date: String,
    pub entry_date: Timestamp,
    pub created_by: String,
    pub updated_by: String,
    pub updated_at: Timestamp,
}

/// Fields written when a record is created. The store assigns `id`,
/// `entry_date` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoardRecord {
    pub serial_number: String,
    pub board_name: String,
    pub technician: String,
    pub comments: String,
    pub creation_date: String,
    pub created_by: String,
}

/// Fields written by a comment edit. The store stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentUpdate {
    pub comments: String,
    pub updated_by: String,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Kind of mutation recorded in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryAction {
    Update,
    BulkUpdate,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Update => "update",
            HistoryAction::BulkUpdate => "bulk-update",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "update" => Some(HistoryAction::Update),
            "bulk-update" => Some(HistoryAction::BulkUpdate),
            _ => None,
        }
    }
}

/// An append-only audit entry belonging to one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub board_id: DbId,
    pub action: HistoryAction,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub by: String,
    pub at: Timestamp,
}

/// Fields written when appending a history entry. The store stamps `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub action: HistoryAction,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub by: String,
}

impl NewHistoryEntry {
    pub fn comments(action: HistoryAction, old_value: &str, new_value: &str, by: &str) -> Self {
        Self {
            action,
            field: FIELD_COMMENTS.to_string(),
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            by: by.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Add-board form
// ---------------------------------------------------------------------------

/// Raw add-board submission.
///
/// `quantity` only fans out the number of records created; it is never
/// stored on a record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBoardForm {
    #[validate(length(min = 1, message = "Technician is required"))]
    pub technician: String,
    #[validate(length(min = 1, message = "Board name is required"))]
    pub board_name: String,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: i64,
    /// Production date; today when absent.
    pub creation_date: Option<NaiveDate>,
    #[serde(default)]
    pub comments: String,
}

/// A validated, normalized add-board submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardBatch {
    pub technician: String,
    pub board_name: String,
    pub quantity: u32,
    pub creation_date: NaiveDate,
    pub comments: String,
}

impl BoardBatch {
    /// The creation date in its stored `YYYY-MM-DD` form.
    pub fn creation_date_string(&self) -> String {
        self.creation_date.format(CREATION_DATE_FORMAT).to_string()
    }
}

impl NewBoardForm {
    /// Trim inputs, apply defaults, and validate.
    ///
    /// `today` is used when the form carries no production date.
    pub fn normalize(&self, today: NaiveDate) -> Result<BoardBatch, CoreError> {
        let trimmed = NewBoardForm {
            technician: self.technician.trim().to_string(),
            board_name: self.board_name.trim().to_string(),
            quantity: self.quantity,
            creation_date: self.creation_date,
            comments: self.comments.trim().to_string(),
        };

        trimmed.validate().map_err(|errors| {
            CoreError::Validation(format!(
                "Please fill in Technician, Board Name, and valid Quantity ({errors})"
            ))
        })?;

        let quantity = u32::try_from(trimmed.quantity)
            .ok()
            .filter(|q| (1..=MAX_BATCH_QUANTITY).contains(q))
            .ok_or_else(|| CoreError::Validation("Quantity is too large".into()))?;

        let comments = if trimmed.comments.is_empty() {
            DEFAULT_COMMENTS.to_string()
        } else {
            trimmed.comments
        };

        Ok(BoardBatch {
            technician: trimmed.technician,
            board_name: trimmed.board_name,
            quantity,
            creation_date: trimmed.creation_date.unwrap_or(today),
            comments,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
