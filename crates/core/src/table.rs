//! Table rows and markup.
//!
//! Projects the view model's output into display rows and renders them as
//! escaped HTML fragments for clients that want server-rendered markup.

use serde::Serialize;

use crate::board::{Board, HistoryEntry};
use crate::format::{escape_html, format_slash_ymd};
use crate::selection::Selection;
use crate::types::DbId;

/// One rendered row of the boards table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: DbId,
    pub selected: bool,
    pub serial_number: String,
    pub board_name: String,
    /// `YYYY / MM / DD`.
    pub creation_date: String,
    pub technician: String,
    pub comments: String,
}

impl TableRow {
    pub fn project(board: &Board, selection: &Selection) -> Self {
        Self {
            id: board.id,
            selected: selection.contains(board.id),
            serial_number: board.serial_number.clone(),
            board_name: board.board_name.clone(),
            creation_date: format_slash_ymd(&board.creation_date),
            technician: board.technician.clone(),
            comments: board.comments.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        let checked = if self.selected { " checked" } else { "" };
        let comments = escape_html(&self.comments);
        format!(
            concat!(
                "<tr>",
                "<td><input type=\"checkbox\" class=\"row-select\" data-id=\"{id}\"{checked}/></td>",
                "<td>{serial}</td>",
                "<td>{name}</td>",
                "<td>{date}</td>",
                "<td>{tech}</td>",
                "<td><span title=\"{comments}\">{comments}</span>",
                "<button class=\"edit-btn\" data-id=\"{id}\" title=\"Edit\">Edit</button>",
                "<button class=\"history-btn\" data-id=\"{id}\" title=\"History\">History</button>",
                "</td>",
                "</tr>"
            ),
            id = self.id,
            checked = checked,
            serial = escape_html(&self.serial_number),
            name = escape_html(&self.board_name),
            date = escape_html(&self.creation_date),
            tech = escape_html(&self.technician),
            comments = comments,
        )
    }
}

/// Project view rows for display.
pub fn project_rows(rows: &[&Board], selection: &Selection) -> Vec<TableRow> {
    rows.iter().map(|b| TableRow::project(b, selection)).collect()
}

/// Render a `<tbody>` fragment; an empty view renders a single "no results" row.
pub fn render_tbody(rows: &[TableRow]) -> String {
    if rows.is_empty() {
        return "<tbody><tr class=\"no-results\"><td colspan=\"6\">No boards found</td></tr></tbody>"
            .to_string();
    }
    let mut out = String::from("<tbody>");
    for row in rows {
        out.push_str(&row.to_html());
    }
    out.push_str("</tbody>");
    out
}

/// Render history entries as `<li>` items, newest first as given.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "<li>No history entries</li>".to_string();
    }
    entries
        .iter()
        .map(|h| {
            format!(
                "<li><strong>{by}</strong> {action} <em>{field}</em> at {at}\
                 <div>Old: {old} | New: {new}</div></li>",
                by = escape_html(&h.by),
                action = escape_html(h.action.as_str()),
                field = escape_html(&h.field),
                at = escape_html(&h.at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                old = escape_html(&h.old_value),
                new = escape_html(&h.new_value),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HistoryAction;
    use crate::view::tests::board;

    #[test]
    fn projection_formats_date_and_marks_selection() {
        let b = board(9, "SN-1", "101", "Ana", "2024-03-05", "ok");
        let mut sel = Selection::new();
        sel.set(9, true);
        let row = TableRow::project(&b, &sel);
        assert!(row.selected);
        assert_eq!(row.creation_date, "2024 / 03 / 05");
    }

    #[test]
    fn html_escapes_cell_content() {
        let b = board(1, "SN-1", "<script>", "Ana", "2024-03-05", "a \"b\"");
        let html = TableRow::project(&b, &Selection::new()).to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("title=\"a &quot;b&quot;\""));
        assert!(!html.contains(" checked"));
    }

    #[test]
    fn empty_view_renders_no_results_row() {
        assert!(render_tbody(&[]).contains("No boards found"));
    }

    #[test]
    fn history_renders_old_and_new_values() {
        let entry = HistoryEntry {
            id: 1,
            board_id: 2,
            action: HistoryAction::BulkUpdate,
            field: "comments".into(),
            old_value: "A".into(),
            new_value: "A\nB<".into(),
            by: "tech@example.com".into(),
            at: chrono::Utc::now(),
        };
        let html = render_history(&[entry]);
        assert!(html.contains("bulk-update"));
        assert!(html.contains("Old: A | New: A\nB&lt;"));
    }
}
