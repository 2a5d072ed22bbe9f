//! Shared query parameter types for board handlers.

use boardtrack_core::error::CoreError;
use boardtrack_core::types::DbId;
use boardtrack_core::view::{FilterState, QueryMode, SortColumn, SortDirection, SortSpec};
use serde::Deserialize;

/// View parameters (`?q=&mode=&technician=&from=&to=&sort=&dir=&ids=`).
///
/// Used by the list, table and export endpoints. `ids` is a comma-separated
/// selection.
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub q: Option<String>,
    pub mode: Option<QueryMode>,
    pub technician: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<SortColumn>,
    pub dir: Option<SortDirection>,
    pub ids: Option<String>,
}

impl ViewParams {
    pub fn filter(&self) -> FilterState {
        FilterState {
            query: self.q.clone().unwrap_or_default(),
            mode: self.mode.unwrap_or_default(),
            technician: self.technician.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    /// Requested sort; a column without a direction sorts ascending.
    pub fn sort(&self) -> SortSpec {
        match self.sort {
            Some(column) => SortSpec {
                column,
                direction: self.dir.unwrap_or(SortDirection::Asc),
            },
            None => SortSpec {
                direction: self.dir.unwrap_or(SortSpec::default().direction),
                ..SortSpec::default()
            },
        }
    }

    /// Parse the `ids` selection. Blank entries are skipped.
    pub fn selected_ids(&self) -> Result<Vec<DbId>, CoreError> {
        let Some(raw) = self.ids.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<DbId>()
                    .map_err(|_| CoreError::Validation(format!("Invalid board id: {s}")))
            })
            .collect()
    }
}
