//! Route definitions for the `/audit-logs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit-logs`.
///
/// ```text
/// GET /               -> list_mine
/// GET /tasks/{id}     -> task_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(audit::list_mine))
        .route("/tasks/{id}", get(audit::task_history))
}
