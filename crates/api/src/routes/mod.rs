pub mod audit;
pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tasks                          list mine, create
/// /tasks/public                   list public
/// /tasks/{id}                     get, update, delete
/// /tasks/{id}/file                attach, remove
///
/// /audit-logs                     caller's audit entries
/// /audit-logs/tasks/{id}          history of one task (creator only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/audit-logs", audit::router())
}
