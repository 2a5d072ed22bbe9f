//! The single owner of a session's application state.
//!
//! [`Tracker`] holds the loaded collection, filter, sort, selection and
//! identity. Snapshot pushes and user actions both go through it; the
//! collection is replaced wholesale on every push and the view recomputed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::board::{Board, HistoryEntry, NewBoardForm};
use crate::config::TrackerConfig;
use crate::editor::{self, BulkMode, CreatedBoard, EditOutcome};
use crate::error::{CoreError, StoreError};
use crate::export::{build_export, candidate_rows, CsvExport};
use crate::identity::Identity;
use crate::selection::{SelectAllState, Selection};
use crate::store::{RecordStore, Snapshot, Subscription};
use crate::table::{project_rows, render_history, render_tbody, TableRow};
use crate::types::DbId;
use crate::view::{compute_view, distinct_technicians, FilterState, QueryMode, SortColumn, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    SignedOut,
    /// Subscribed, waiting for the first snapshot.
    Loading,
    Ready,
    /// The store refused the collection read for this identity.
    Unauthorized,
}

/// Result of opening a board's history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    Entries(Vec<HistoryEntry>),
    MissingPermissions,
}

impl HistoryView {
    pub fn to_html(&self) -> String {
        match self {
            HistoryView::Entries(entries) => render_history(entries),
            HistoryView::MissingPermissions => {
                "<li>Unable to load history: missing permissions</li>".to_string()
            }
        }
    }
}

pub struct Tracker {
    store: Arc<dyn RecordStore>,
    config: TrackerConfig,
    identity: Option<Identity>,
    status: TrackerStatus,
    boards: Vec<Board>,
    filter: FilterState,
    sort: SortSpec,
    selection: Selection,
    /// Ids of the rendered rows, in view order.
    rendered: Vec<DbId>,
    technicians: Vec<String>,
    subscription: Option<Subscription>,
}

impl Tracker {
    pub fn new(store: Arc<dyn RecordStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            identity: None,
            status: TrackerStatus::SignedOut,
            boards: Vec::new(),
            filter: FilterState::default(),
            sort: SortSpec::default(),
            selection: Selection::new(),
            rendered: Vec::new(),
            technicians: Vec::new(),
            subscription: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn status(&self) -> TrackerStatus {
        self.status
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rendered_ids(&self) -> &[DbId] {
        &self.rendered
    }

    pub fn technicians(&self) -> &[String] {
        &self.technicians
    }

    // -----------------------------------------------------------------------
    // Session and live collection
    // -----------------------------------------------------------------------

    /// React to a sign-in or sign-out.
    ///
    /// Signing in opens the collection feed ordered newest first; signing out
    /// drops the feed and clears all loaded state, including the selection.
    pub async fn on_identity_change(&mut self, identity: Option<Identity>) -> Result<(), CoreError> {
        self.subscription = None;
        self.selection.clear();
        self.boards.clear();
        self.rendered.clear();
        self.technicians.clear();
        self.identity = identity;

        if self.identity.is_none() {
            self.status = TrackerStatus::SignedOut;
            return Ok(());
        }

        self.status = TrackerStatus::Loading;
        match self.store.subscribe(SortSpec::default()).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                if matches!(e, StoreError::PermissionDenied(_)) {
                    self.status = TrackerStatus::Unauthorized;
                }
                tracing::warn!(error = %e, "Failed to subscribe to boards");
                Err(e.into())
            }
        }
    }

    /// Replace the loaded collection with one pushed snapshot.
    ///
    /// A permission failure switches to [`TrackerStatus::Unauthorized`]; any
    /// other failure is returned and leaves the loaded state untouched.
    /// The selection is never touched here.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), CoreError> {
        match snapshot {
            Ok(boards) => {
                tracing::debug!(count = boards.len(), "Boards snapshot");
                self.boards = boards;
                self.technicians = distinct_technicians(&self.boards);
                self.status = TrackerStatus::Ready;
                self.render()
            }
            Err(StoreError::PermissionDenied(msg)) => {
                tracing::warn!(%msg, "Boards snapshot denied");
                self.status = TrackerStatus::Unauthorized;
                self.boards.clear();
                self.rendered.clear();
                self.technicians.clear();
                Err(CoreError::Forbidden(msg))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Boards snapshot error");
                Err(e.into())
            }
        }
    }

    /// Wait for and apply the next push. `None` when there is no live feed.
    pub async fn next_update(&mut self) -> Option<Result<(), CoreError>> {
        let snapshot = self.subscription.as_mut()?.next().await?;
        Some(self.apply_snapshot(snapshot))
    }

    fn render(&mut self) -> Result<(), CoreError> {
        let rows = compute_view(&self.boards, &self.filter, self.sort)?;
        self.rendered = rows.iter().map(|b| b.id).collect();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Filter and sort inputs
    // -----------------------------------------------------------------------

    /// Apply a filter edit. An edit that does not compile is rejected and the
    /// previous filter and rendered rows stay in place.
    fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) -> Result<(), CoreError> {
        let mut candidate = self.filter.clone();
        edit(&mut candidate);
        candidate.compile()?;
        self.filter = candidate;
        self.selection.clear();
        self.render()
    }

    pub fn set_query(&mut self, query: &str) -> Result<(), CoreError> {
        self.update_filter(|f| f.query = query.to_string())
    }

    pub fn set_mode(&mut self, mode: QueryMode) -> Result<(), CoreError> {
        self.update_filter(|f| f.mode = mode)
    }

    pub fn set_technician(&mut self, technician: Option<String>) -> Result<(), CoreError> {
        self.update_filter(|f| f.technician = technician)
    }

    pub fn set_date_range(&mut self, from: Option<String>, to: Option<String>) -> Result<(), CoreError> {
        self.update_filter(|f| {
            f.from = from;
            f.to = to;
        })
    }

    /// Header click on `column`.
    pub fn sort_by(&mut self, column: SortColumn) -> Result<(), CoreError> {
        self.sort.toggle(column);
        self.selection.clear();
        self.render()
    }

    // -----------------------------------------------------------------------
    // Rows and selection
    // -----------------------------------------------------------------------

    fn rendered_boards(&self) -> Vec<&Board> {
        let by_id: HashMap<DbId, &Board> = self.boards.iter().map(|b| (b.id, b)).collect();
        self.rendered.iter().filter_map(|id| by_id.get(id).copied()).collect()
    }

    pub fn rows(&self) -> Vec<TableRow> {
        project_rows(&self.rendered_boards(), &self.selection)
    }

    /// The rendered view as a `<tbody>` fragment.
    pub fn table_html(&self) -> String {
        render_tbody(&self.rows())
    }

    pub fn header_state(&self) -> SelectAllState {
        self.selection.header_state(&self.rendered)
    }

    pub fn toggle_row(&mut self, id: DbId, selected: bool) {
        self.selection.set(id, selected);
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_visible(&self.rendered);
    }

    /// Replace the selection with the rendered rows.
    pub fn select_visible(&mut self) {
        self.selection.replace(self.rendered.iter().copied());
    }

    /// Replace the selection with every loaded record.
    pub fn select_all_loaded(&mut self) {
        self.selection.replace(self.boards.iter().map(|b| b.id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub async fn add_boards(
        &self,
        form: &NewBoardForm,
        today: NaiveDate,
    ) -> Result<Vec<CreatedBoard>, CoreError> {
        let batch = form.normalize(today)?;
        editor::create_batch(&*self.store, self.identity.as_ref(), &batch).await
    }

    pub async fn edit_comment(&self, id: DbId, text: &str) -> Result<EditOutcome, CoreError> {
        editor::edit_comment(
            &*self.store,
            self.identity.as_ref(),
            id,
            text,
            self.config.audit_policy,
        )
        .await
    }

    /// Bulk-edit the selected ids. The selection is cleared afterwards
    /// whether or not every id succeeded.
    pub async fn bulk_edit(&mut self, text: &str, mode: BulkMode) -> Result<Vec<DbId>, CoreError> {
        let ids = self.selection.ids();
        let result = editor::bulk_edit(
            &*self.store,
            self.identity.as_ref(),
            &ids,
            text,
            mode,
            self.config.audit_policy,
        )
        .await;
        if !matches!(result, Err(CoreError::Validation(_))) {
            self.selection.clear();
        }
        result?.into_result()
    }

    /// Export the selection, else the rendered rows, else everything loaded.
    pub fn export(&self, today: NaiveDate) -> Result<CsvExport, CoreError> {
        let rows = candidate_rows(&self.boards, &self.rendered, &self.selection);
        build_export(&rows, today).ok_or_else(|| CoreError::Validation("No rows to export".into()))
    }

    pub async fn history(&self, id: DbId) -> Result<HistoryView, CoreError> {
        load_history(&*self.store, id).await
    }
}

/// Read one board's history, newest first. A permission failure is an
/// outcome of its own rather than an error.
pub async fn load_history<S: RecordStore + ?Sized>(
    store: &S,
    id: DbId,
) -> Result<HistoryView, CoreError> {
    match store.list_history(id).await {
        Ok(entries) => Ok(HistoryView::Entries(entries)),
        Err(StoreError::PermissionDenied(msg)) => {
            tracing::warn!(board_id = id, %msg, "History read denied");
            Ok(HistoryView::MissingPermissions)
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
