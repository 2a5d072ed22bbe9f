//! Handlers for board records.
//!
//! Listing, batch creation, single and bulk comment edits, history,
//! CSV export and the rendered table fragment. Every write goes through the
//! record editor in `boardtrack_core::editor` so the audit trail and the
//! configured audit policy apply uniformly.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use boardtrack_core::board::{Board, NewBoardForm};
use boardtrack_core::editor::{self, BulkMode};
use boardtrack_core::error::CoreError;
use boardtrack_core::export::{build_export, candidate_rows};
use boardtrack_core::selection::Selection;
use boardtrack_core::store::RecordStore;
use boardtrack_core::table::{project_rows, render_tbody};
use boardtrack_core::tracker::{load_history, HistoryView};
use boardtrack_core::types::DbId;
use boardtrack_core::view::{compute_view, distinct_technicians, SortSpec};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ViewParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateCommentsRequest {
    pub comments: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkCommentsRequest {
    pub ids: Vec<DbId>,
    pub text: String,
    #[serde(default)]
    pub mode: BulkMode,
}

#[derive(Debug, Serialize)]
pub struct BulkCommentsResponse {
    pub updated: Vec<DbId>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFormat {
    #[default]
    Json,
    Html,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub format: Option<HistoryFormat>,
}

/// Production date used when a form leaves it blank.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn load_all(state: &AppState) -> AppResult<Vec<Board>> {
    Ok(state.store.list_boards(SortSpec::default()).await?)
}

async fn find_board(state: &AppState, id: DbId) -> AppResult<Board> {
    state
        .store
        .find_board(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Board", id }))
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// GET /boards?q=&mode=&technician=&from=&to=&sort=&dir=
///
/// The filtered, sorted view of the namespace's boards.
pub async fn list_boards(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> AppResult<impl IntoResponse> {
    let boards = load_all(&state).await?;
    let rows: Vec<Board> = compute_view(&boards, &params.filter(), params.sort())?
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(DataResponse { data: rows }))
}

/// POST /boards
///
/// Create `quantity` boards of one batch with freshly allocated serials.
pub async fn create_boards(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(form): Json<NewBoardForm>,
) -> AppResult<impl IntoResponse> {
    let batch = form.normalize(today())?;
    let identity = auth.identity();
    let created = editor::create_batch(&*state.store, Some(&identity), &batch).await?;

    tracing::info!(
        by = %auth.email,
        board_name = %batch.board_name,
        creation_date = %batch.creation_date,
        count = created.len(),
        "Board batch created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /boards/technicians
///
/// Distinct technicians for the filter dropdown, ascending.
pub async fn list_technicians(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let boards = load_all(&state).await?;
    Ok(Json(DataResponse {
        data: distinct_technicians(&boards),
    }))
}

/// GET /boards/table?...&ids=
///
/// The current view rendered as a `<tbody>` fragment, with `ids` checked.
pub async fn render_table(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> AppResult<impl IntoResponse> {
    let mut selection = Selection::new();
    selection.replace(params.selected_ids()?);

    let boards = load_all(&state).await?;
    let rows = compute_view(&boards, &params.filter(), params.sort())?;
    Ok(Html(render_tbody(&project_rows(&rows, &selection))))
}

/// GET /boards/export?...&ids=
///
/// CSV download of the selected ids, else the filtered view, else every
/// board.
pub async fn export_boards(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> AppResult<Response> {
    let mut selection = Selection::new();
    selection.replace(params.selected_ids()?);

    let boards = load_all(&state).await?;
    let visible: Vec<DbId> = compute_view(&boards, &params.filter(), params.sort())?
        .iter()
        .map(|b| b.id)
        .collect();
    let rows = candidate_rows(&boards, &visible, &selection);
    let export = build_export(&rows, today())
        .ok_or_else(|| AppError::Core(CoreError::Validation("No rows to export".into())))?;

    tracing::info!(by = %auth.email, rows = rows.len(), filename = %export.filename, "Boards exported");

    Ok((
        [
            (header::CONTENT_TYPE, export.mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    )
        .into_response())
}

/// POST /boards/bulk-comments
///
/// Apply one comment to many boards. Responds 207 with the failed ids when
/// only some could be updated.
pub async fn bulk_update_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkCommentsRequest>,
) -> AppResult<impl IntoResponse> {
    let identity = auth.identity();
    let report = editor::bulk_edit(
        &*state.store,
        Some(&identity),
        &input.ids,
        &input.text,
        input.mode,
        state.config.tracker.audit_policy,
    )
    .await?;
    let updated = report.into_result()?;
    Ok(Json(DataResponse {
        data: BulkCommentsResponse { updated },
    }))
}

// ---------------------------------------------------------------------------
// Single board
// ---------------------------------------------------------------------------

/// GET /boards/{id}
pub async fn get_board(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let board = find_board(&state, id).await?;
    Ok(Json(DataResponse { data: board }))
}

/// PUT /boards/{id}/comments
///
/// Replace one board's comment and record the change in its history.
pub async fn update_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCommentsRequest>,
) -> AppResult<impl IntoResponse> {
    let identity = auth.identity();
    let outcome = editor::edit_comment(
        &*state.store,
        Some(&identity),
        id,
        &input.comments,
        state.config.tracker.audit_policy,
    )
    .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /boards/{id}/history?format=json|html
///
/// History entries, newest first. `format=html` renders `<li>` items and
/// reports missing read permission inline with a 403.
pub async fn get_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Response> {
    find_board(&state, id).await?;
    let view = load_history(&*state.store, id).await?;

    match (params.format.unwrap_or_default(), view) {
        (HistoryFormat::Html, view) => {
            let status = match &view {
                HistoryView::Entries(_) => StatusCode::OK,
                HistoryView::MissingPermissions => StatusCode::FORBIDDEN,
            };
            Ok((status, Html(view.to_html())).into_response())
        }
        (HistoryFormat::Json, HistoryView::Entries(entries)) => {
            Ok(Json(DataResponse { data: entries }).into_response())
        }
        (HistoryFormat::Json, HistoryView::MissingPermissions) => Err(AppError::Core(
            CoreError::Forbidden("Missing permissions to read history".into()),
        )),
    }
}
