//! Persistence ports.
//!
//! The orchestrator only sees these traits; the PostgreSQL adapters live in
//! `tasklog-db` and in-memory ones in [`crate::memory`].

use async_trait::async_trait;

use crate::audit::{AuditAction, AuditLog, NewAuditLog};
use crate::error::CoreResult;
use crate::query::{ListScope, LookupScope, TaskQuery};
use crate::task::{NewTask, Task, TaskSummary};
use crate::types::DbId;

/// Relational persistence of task rows.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One page of summaries matching `query` within `scope`, plus the total
    /// number of matching rows regardless of pagination.
    async fn find_page(
        &self,
        scope: &ListScope,
        query: &TaskQuery,
    ) -> CoreResult<(Vec<TaskSummary>, i64)>;

    async fn find_one(&self, id: DbId, scope: &LookupScope) -> CoreResult<Option<Task>>;

    /// Persist a new task and return it with its assigned id and timestamps.
    async fn insert(&self, task: &NewTask) -> CoreResult<Task>;

    /// Overwrite every mutable field of an existing, owner-matched row and
    /// refresh `updated_at`. Fails with `NotFound` if the row is gone.
    async fn replace(&self, task: &Task) -> CoreResult<Task>;

    async fn delete(&self, id: DbId, owner_id: &str) -> CoreResult<()>;

    /// Cheap connectivity check.
    async fn health_check(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// Append-only persistence of audit-log rows.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &NewAuditLog) -> CoreResult<AuditLog>;

    /// Most recent first.
    async fn by_user(&self, user_id: &str, limit: i64, offset: i64) -> CoreResult<Vec<AuditLog>>;

    /// Most recent first.
    async fn by_entity(&self, entity_type: &str, entity_id: DbId) -> CoreResult<Vec<AuditLog>>;

    /// Most recent first.
    async fn by_action(&self, action: AuditAction) -> CoreResult<Vec<AuditLog>>;

    async fn count(&self, user_id: Option<&str>) -> CoreResult<i64>;
}
