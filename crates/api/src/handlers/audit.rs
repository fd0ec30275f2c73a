//! Handlers for the audit trail endpoints.
//!
//! Callers only ever see their own entries.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tasklog_core::audit::{audit_page_bounds, AuditLog};
use tasklog_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppPath, AppQuery};
use crate::middleware::user::RequestUser;
use crate::query::AuditPageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// One page of the caller's audit entries plus their total count.
#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub items: Vec<AuditLog>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/v1/audit-logs
pub async fn list_mine(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppQuery(params): AppQuery<AuditPageParams>,
) -> AppResult<Json<DataResponse<AuditLogPage>>> {
    let audit = state.service.audit();
    let (limit, offset) = audit_page_bounds(params.limit, params.offset);
    let items = audit
        .find_by_user(&actor.user_id, Some(limit), Some(offset))
        .await?;
    let total = audit.count(Some(&actor.user_id)).await?;

    Ok(Json(DataResponse {
        data: AuditLogPage {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/audit-logs/tasks/{id}
pub async fn task_history(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    let history = state.service.task_history(&actor, id).await?;
    Ok(Json(DataResponse { data: history }))
}
