use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` when the task store does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

impl HealthReport {
    fn from_store_check(store_reachable: bool) -> Self {
        Self {
            status: if store_reachable { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy: store_reachable,
        }
    }
}

/// Asks the task store port for a round trip. A failure degrades the report;
/// the status code stays 200.
async fn report(State(state): State<AppState>) -> Json<HealthReport> {
    let reachable = match state.service.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Task store health check failed");
            false
        }
    };
    Json(HealthReport::from_store_check(reachable))
}

/// Root-level `/health`, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
