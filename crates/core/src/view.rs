//! View model: filtering and sorting the live collection.
//!
//! Everything here is a pure function of (collection, filter, sort). Re-running
//! it on every snapshot push is always safe.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Sort descriptor
// ---------------------------------------------------------------------------

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    SerialNumber,
    BoardName,
    CreationDate,
    Technician,
    Comments,
}

impl SortColumn {
    /// The column's value on `board`, as compared by the view.
    pub fn value(self, board: &Board) -> &str {
        match self {
            SortColumn::SerialNumber => &board.serial_number,
            SortColumn::BoardName => &board.board_name,
            SortColumn::CreationDate => &board.creation_date,
            SortColumn::Technician => &board.technician,
            SortColumn::Comments => &board.comments,
        }
    }

    /// Column name in the durable store's schema.
    pub fn column_name(self) -> &'static str {
        match self {
            SortColumn::SerialNumber => "serial_number",
            SortColumn::BoardName => "board_name",
            SortColumn::CreationDate => "creation_date",
            SortColumn::Technician => "technician",
            SortColumn::Comments => "comments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest production date first.
    fn default() -> Self {
        Self {
            column: SortColumn::CreationDate,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Header click: flip direction on the current column, otherwise switch
    /// to `column` ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.reversed();
        } else {
            self.column = column;
            self.direction = SortDirection::Asc;
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// How the free-text query is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Literal,
    Pattern,
}

/// User-editable filter inputs. Blank fields mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub mode: QueryMode,
    /// Exact technician match; `None` or blank = all technicians.
    pub technician: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub to: Option<String>,
}

#[derive(Debug)]
enum Matcher {
    Any,
    Literal(String),
    Pattern(Regex),
}

/// A [`FilterState`] ready to test records against.
#[derive(Debug)]
pub struct CompiledFilter {
    matcher: Matcher,
    technician: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FilterState {
    /// Compile the query. An invalid pattern is reported, never replaced by
    /// a literal search.
    pub fn compile(&self) -> Result<CompiledFilter, CoreError> {
        let query = self.query.trim();
        let matcher = if query.is_empty() {
            Matcher::Any
        } else {
            match self.mode {
                QueryMode::Literal => Matcher::Literal(query.to_lowercase()),
                QueryMode::Pattern => {
                    let re = RegexBuilder::new(query)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| {
                            CoreError::Validation(format!("Invalid regular expression: {e}"))
                        })?;
                    Matcher::Pattern(re)
                }
            }
        };

        Ok(CompiledFilter {
            matcher,
            technician: non_blank(&self.technician),
            from: non_blank(&self.from),
            to: non_blank(&self.to),
        })
    }
}

/// Fields the free-text query is matched against.
fn searchable_fields(board: &Board) -> [&str; 5] {
    [
        &board.serial_number,
        &board.board_name,
        &board.technician,
        &board.creation_date,
        &board.comments,
    ]
}

impl CompiledFilter {
    pub fn matches(&self, board: &Board) -> bool {
        if let Some(tech) = &self.technician {
            if &board.technician != tech {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if board.creation_date.is_empty() || board.creation_date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if board.creation_date.is_empty() || board.creation_date.as_str() > to.as_str() {
                return false;
            }
        }

        match &self.matcher {
            Matcher::Any => true,
            Matcher::Literal(needle) => searchable_fields(board)
                .iter()
                .any(|v| v.to_lowercase().contains(needle.as_str())),
            Matcher::Pattern(re) => searchable_fields(board).iter().any(|v| re.is_match(v)),
        }
    }
}

// ---------------------------------------------------------------------------
// View computation
// ---------------------------------------------------------------------------

/// Keep the records `filter` accepts, in collection order.
pub fn filter_boards<'a>(boards: &'a [Board], filter: &CompiledFilter) -> Vec<&'a Board> {
    boards.iter().filter(|b| filter.matches(b)).collect()
}

/// Sort by the chosen column, case-insensitively.
///
/// Not stable: rows with equal keys may come out in any order.
pub fn sort_boards(rows: &mut [&Board], sort: SortSpec) {
    rows.sort_unstable_by(|a, b| {
        let ord = sort
            .column
            .value(a)
            .to_lowercase()
            .cmp(&sort.column.value(b).to_lowercase());
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Filter then sort. On an invalid pattern nothing is computed.
pub fn compute_view<'a>(
    boards: &'a [Board],
    filter: &FilterState,
    sort: SortSpec,
) -> Result<Vec<&'a Board>, CoreError> {
    let compiled = filter.compile()?;
    let mut rows = filter_boards(boards, &compiled);
    sort_boards(&mut rows, sort);
    Ok(rows)
}

/// Distinct non-blank technicians, ascending, for the technician dropdown.
pub fn distinct_technicians(boards: &[Board]) -> Vec<String> {
    let mut techs: Vec<String> = boards
        .iter()
        .map(|b| b.technician.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    techs.sort();
    techs.dedup();
    techs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
