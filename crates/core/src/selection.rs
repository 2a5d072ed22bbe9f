//! Row selection keyed by record id.
//!
//! The selection outlives re-renders and snapshot pushes. An id whose record
//! has left the collection stays selected but no longer matches any row.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::DbId;

/// State of the tri-state "select all" header control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAllState {
    Unchecked,
    Checked,
    Indeterminate,
}

impl SelectAllState {
    pub fn is_checked(self) -> bool {
        self == SelectAllState::Checked
    }

    pub fn is_indeterminate(self) -> bool {
        self == SelectAllState::Indeterminate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<DbId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Set one row's checkbox.
    pub fn set(&mut self, id: DbId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with exactly `ids`.
    pub fn replace<I: IntoIterator<Item = DbId>>(&mut self, ids: I) {
        self.ids = ids.into_iter().collect();
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Header state over the currently rendered rows only.
    pub fn header_state(&self, visible: &[DbId]) -> SelectAllState {
        let checked = visible.iter().filter(|id| self.ids.contains(id)).count();
        if checked == 0 {
            SelectAllState::Unchecked
        } else if checked == visible.len() {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }

    /// Header click: select every visible row unless all already are, in
    /// which case deselect them. Rows outside `visible` are untouched.
    pub fn toggle_visible(&mut self, visible: &[DbId]) {
        if self.header_state(visible).is_checked() {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }
}
