//! Delimited-text export of board rows.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::board::Board;
use crate::format::{escape_csv, format_timestamp};
use crate::selection::Selection;
use crate::types::DbId;

/// Frozen column order of the export.
pub const EXPORT_HEADERS: [&str; 8] = [
    "serialNumber",
    "boardName",
    "creationDate",
    "technician",
    "comments",
    "createdBy",
    "updatedBy",
    "entryDate",
];

pub const EXPORT_MIME: &str = "text/csv;charset=utf-8";

/// A serialized export ready to hand to the host's download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub mime: &'static str,
    pub body: String,
}

/// Pick the rows to export: the selection if any id is selected, else the
/// currently visible rows, else the whole loaded collection.
///
/// Selected rows keep collection order; visible rows keep view order.
pub fn candidate_rows<'a>(
    all: &'a [Board],
    visible: &[DbId],
    selection: &Selection,
) -> Vec<&'a Board> {
    if !selection.is_empty() {
        all.iter().filter(|b| selection.contains(b.id)).collect()
    } else if !visible.is_empty() {
        let by_id: HashMap<DbId, &Board> = all.iter().map(|b| (b.id, b)).collect();
        visible.iter().filter_map(|id| by_id.get(id).copied()).collect()
    } else {
        all.iter().collect()
    }
}

fn csv_line<'a, I: IntoIterator<Item = &'a str>>(fields: I) -> String {
    fields
        .into_iter()
        .map(escape_csv)
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize `rows` with a header line. Every field is quoted.
pub fn to_csv(rows: &[&Board]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(EXPORT_HEADERS));
    for b in rows {
        let entry_date = format_timestamp(&b.entry_date);
        lines.push(csv_line([
            b.serial_number.as_str(),
            b.board_name.as_str(),
            b.creation_date.as_str(),
            b.technician.as_str(),
            b.comments.as_str(),
            b.created_by.as_str(),
            b.updated_by.as_str(),
            entry_date.as_str(),
        ]));
    }
    lines.join("\n")
}

/// Build the export file, or `None` when there is nothing to export.
pub fn build_export(rows: &[&Board], today: NaiveDate) -> Option<CsvExport> {
    if rows.is_empty() {
        return None;
    }
    Some(CsvExport {
        filename: format!("boards_export_{}.csv", today.format("%Y-%m-%d")),
        mime: EXPORT_MIME,
        body: to_csv(rows),
    })
}
