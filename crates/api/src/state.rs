use std::sync::Arc;

use tasklog_core::service::TaskService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Task use cases, wired to whichever stores the binary or test chose.
    pub service: Arc<TaskService>,
}
