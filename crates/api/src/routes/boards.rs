//! Route definitions for board records.
//!
//! Mounted at `/boards` by `api_routes()`. Every route requires a bearer
//! token.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::boards;
use crate::state::AppState;

/// Board routes.
///
/// ```text
/// GET    /                   -> list_boards (?q, mode, technician, from, to, sort, dir)
/// POST   /                   -> create_boards
/// GET    /technicians        -> list_technicians
/// GET    /table              -> render_table (view params + ids)
/// GET    /export             -> export_boards (view params + ids)
/// POST   /bulk-comments      -> bulk_update_comments
/// GET    /{id}               -> get_board
/// PUT    /{id}/comments      -> update_comments
/// GET    /{id}/history       -> get_history (?format=json|html)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(boards::list_boards).post(boards::create_boards))
        .route("/technicians", get(boards::list_technicians))
        .route("/table", get(boards::render_table))
        .route("/export", get(boards::export_boards))
        .route("/bulk-comments", post(boards::bulk_update_comments))
        .route("/{id}", get(boards::get_board))
        .route("/{id}/comments", put(boards::update_comments))
        .route("/{id}/history", get(boards::get_history))
}
