//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /              -> list_mine
/// POST   /              -> create
/// GET    /public        -> list_public
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/file     -> attach_file
/// DELETE /{id}/file     -> remove_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_mine).post(tasks::create))
        .route("/public", get(tasks::list_public))
        .route(
            "/{id}",
            get(tasks::get_by_id)
                .put(tasks::update)
                .delete(tasks::delete),
        )
        .route(
            "/{id}/file",
            post(tasks::attach_file).delete(tasks::remove_file),
        )
}
