//! `tasklog-core` store ports backed by PostgreSQL.

use async_trait::async_trait;
use tasklog_core::audit::{AuditAction, AuditLog, NewAuditLog};
use tasklog_core::error::{CoreError, CoreResult};
use tasklog_core::query::{ListScope, LookupScope, TaskQuery};
use tasklog_core::store::{AuditStore, TaskStore};
use tasklog_core::task::{NewTask, Task, TaskSummary};
use tasklog_core::types::DbId;

use crate::models::audit::AuditLogRow;
use crate::repositories::{AuditLogRepo, TaskRepo};
use crate::DbPool;

/// Log a driver error and wrap it as a store failure. The underlying
/// `sqlx::Error` stays inside the box for classification upstream.
fn store_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| {
        tracing::error!(error = %err, operation, "Database operation failed");
        CoreError::store(err)
    }
}

fn into_logs(rows: Vec<AuditLogRow>) -> CoreResult<Vec<AuditLog>> {
    rows.into_iter().map(AuditLog::try_from).collect()
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgTaskStore {
    pool: DbPool,
}

impl PgTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn find_page(
        &self,
        scope: &ListScope,
        query: &TaskQuery,
    ) -> CoreResult<(Vec<TaskSummary>, i64)> {
        let items = TaskRepo::list_page(&self.pool, scope, query)
            .await
            .map_err(store_error("tasks.list_page"))?;
        let total = TaskRepo::count(&self.pool, scope, query)
            .await
            .map_err(store_error("tasks.count"))?;
        Ok((items, total))
    }

    async fn find_one(&self, id: DbId, scope: &LookupScope) -> CoreResult<Option<Task>> {
        TaskRepo::find_by_id(&self.pool, id, scope)
            .await
            .map_err(store_error("tasks.find_by_id"))
    }

    async fn insert(&self, task: &NewTask) -> CoreResult<Task> {
        TaskRepo::create(&self.pool, task)
            .await
            .map_err(store_error("tasks.create"))
    }

    async fn replace(&self, task: &Task) -> CoreResult<Task> {
        TaskRepo::replace(&self.pool, task)
            .await
            .map_err(store_error("tasks.replace"))?
            .ok_or_else(|| CoreError::task_not_found(task.id))
    }

    async fn delete(&self, id: DbId, owner_id: &str) -> CoreResult<()> {
        let removed = TaskRepo::delete(&self.pool, id, owner_id)
            .await
            .map_err(store_error("tasks.delete"))?;
        if !removed {
            tracing::debug!(task_id = id, "Delete matched no row");
        }
        Ok(())
    }

    async fn health_check(&self) -> CoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(store_error("health_check"))
    }
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgAuditStore {
    pool: DbPool,
}

impl PgAuditStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, entry: &NewAuditLog) -> CoreResult<AuditLog> {
        let row = AuditLogRepo::insert(&self.pool, entry)
            .await
            .map_err(store_error("audit_logs.insert"))?;
        AuditLog::try_from(row)
    }

    async fn by_user(&self, user_id: &str, limit: i64, offset: i64) -> CoreResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::list_by_user(&self.pool, user_id, limit, offset)
            .await
            .map_err(store_error("audit_logs.list_by_user"))?;
        into_logs(rows)
    }

    async fn by_entity(&self, entity_type: &str, entity_id: DbId) -> CoreResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::list_by_entity(&self.pool, entity_type, entity_id)
            .await
            .map_err(store_error("audit_logs.list_by_entity"))?;
        into_logs(rows)
    }

    async fn by_action(&self, action: AuditAction) -> CoreResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::list_by_action(&self.pool, action)
            .await
            .map_err(store_error("audit_logs.list_by_action"))?;
        into_logs(rows)
    }

    async fn count(&self, user_id: Option<&str>) -> CoreResult<i64> {
        AuditLogRepo::count(&self.pool, user_id)
            .await
            .map_err(store_error("audit_logs.count"))
    }
}
