//! Task use cases.
//!
//! [`TaskService`] is the only component that combines task-store mutations
//! with audit writes. Each operation runs its steps sequentially: fetch,
//! persist, audit (or audit, then delete). Every failure aborts the
//! remaining steps and is returned unchanged.
//!
//! Primary write and audit write are separate store calls. A failure
//! between them is not rolled back; the recorder logs it for reconciliation.

use std::sync::Arc;

use crate::attachment::validate_attachment;
use crate::audit::{entity_types, Actor, AuditAction, AuditEntry, AuditLog, AuditRecorder};
use crate::error::{CoreError, CoreResult};
use crate::query::{ListScope, LookupScope, Page, TaskQuery};
use crate::store::{AuditStore, TaskStore};
use crate::task::{
    attachment_snapshot, merge, tracked_snapshot, FileAttachment, Task, TaskDraft, TaskPatch,
    TaskSummary,
};
use crate::types::DbId;

/// Orchestrates task persistence and the audit trail.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    audit: AuditRecorder,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, audit: Arc<dyn AuditStore>) -> Self {
        Self {
            tasks,
            audit: AuditRecorder::new(audit),
        }
    }

    /// Read access to the audit trail.
    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    pub async fn health_check(&self) -> CoreResult<()> {
        self.tasks.health_check().await
    }

    /// Create a task owned by `actor` and record a CREATE entry.
    pub async fn create(&self, actor: &Actor, draft: TaskDraft) -> CoreResult<Task> {
        let new_task = draft.owned_by(actor.user_id.clone());

        let task = self
            .audit
            .after(actor, self.tasks.insert(&new_task), |task| {
                AuditEntry::create(entity_types::TASK, task.id, tracked_snapshot(task))
            })
            .await?;

        tracing::info!(task_id = task.id, user_id = %actor.user_id, "Task created");
        Ok(task)
    }

    /// Tasks owned by `user_id`. Listing is not audited.
    pub async fn list_mine(&self, user_id: &str, query: &TaskQuery) -> CoreResult<Page<TaskSummary>> {
        self.list(ListScope::Owner(user_id.to_string()), query).await
    }

    /// Tasks marked public, regardless of owner. Listing is not audited.
    pub async fn list_public(&self, query: &TaskQuery) -> CoreResult<Page<TaskSummary>> {
        self.list(ListScope::Public, query).await
    }

    async fn list(&self, scope: ListScope, query: &TaskQuery) -> CoreResult<Page<TaskSummary>> {
        let (items, total) = self.tasks.find_page(&scope, query).await?;
        tracing::debug!(
            ?scope,
            page = query.page,
            limit = query.limit,
            returned = items.len(),
            total,
            "Task page fetched",
        );
        Ok(Page::new(items, total, query.page, query.limit))
    }

    /// Fetch a task the actor owns or that is public, recording a VIEW entry.
    ///
    /// Missing and inaccessible tasks both yield `NotFound`, and neither is
    /// audited.
    pub async fn get_by_id(&self, actor: &Actor, id: DbId) -> CoreResult<Task> {
        let scope = LookupScope::AccessibleTo(actor.user_id.clone());
        let task = self
            .tasks
            .find_one(id, &scope)
            .await?
            .ok_or_else(|| CoreError::task_not_found(id))?;

        self.audit
            .record(actor, AuditEntry::view(entity_types::TASK, task.id))
            .await?;
        Ok(task)
    }

    /// Merge `patch` over a task the actor owns and record an UPDATE entry
    /// with the tracked fields before and after.
    pub async fn update(&self, actor: &Actor, id: DbId, patch: &TaskPatch) -> CoreResult<Task> {
        let existing = self.owned(actor, id).await?;
        let merged = merge(&existing, patch);
        let old_value = tracked_snapshot(&existing);

        let task = self
            .audit
            .after(actor, self.tasks.replace(&merged), |saved| {
                AuditEntry::update(entity_types::TASK, saved.id, old_value, tracked_snapshot(saved))
            })
            .await?;

        tracing::info!(task_id = id, user_id = %actor.user_id, "Task updated");
        Ok(task)
    }

    /// Delete a task the actor owns. The DELETE entry is written first.
    pub async fn delete(&self, actor: &Actor, id: DbId) -> CoreResult<()> {
        let existing = self.owned(actor, id).await?;
        let entry = AuditEntry::delete(entity_types::TASK, id, tracked_snapshot(&existing));

        self.audit
            .before(actor, entry, self.tasks.delete(id, &actor.user_id))
            .await?;

        tracing::info!(task_id = id, user_id = %actor.user_id, "Task deleted");
        Ok(())
    }

    /// Replace the file group of a task the actor owns.
    pub async fn attach_file(&self, actor: &Actor, id: DbId, file: FileAttachment) -> CoreResult<Task> {
        validate_attachment(&file)?;
        let task = self.set_attachment(actor, id, Some(file)).await?;
        tracing::info!(task_id = id, user_id = %actor.user_id, "File attached to task");
        Ok(task)
    }

    /// Clear the file group of a task the actor owns.
    pub async fn remove_file(&self, actor: &Actor, id: DbId) -> CoreResult<Task> {
        let task = self.set_attachment(actor, id, None).await?;
        tracing::info!(task_id = id, user_id = %actor.user_id, "File removed from task");
        Ok(task)
    }

    async fn set_attachment(
        &self,
        actor: &Actor,
        id: DbId,
        attachment: Option<FileAttachment>,
    ) -> CoreResult<Task> {
        let existing = self.owned(actor, id).await?;
        let updated = existing.with_attachment(attachment);
        let old_value = attachment_snapshot(existing.attachment.as_ref());

        self.audit
            .after(actor, self.tasks.replace(&updated), |saved| {
                AuditEntry::update(
                    entity_types::TASK,
                    saved.id,
                    old_value,
                    attachment_snapshot(saved.attachment.as_ref()),
                )
            })
            .await
    }

    /// Audit history of a task, most recent first.
    ///
    /// Only the user who created the task may read it. The history outlives
    /// the task, so ownership is established from the CREATE entry rather
    /// than from the task row.
    pub async fn task_history(&self, actor: &Actor, id: DbId) -> CoreResult<Vec<AuditLog>> {
        let history = self.audit.find_by_entity(entity_types::TASK, id).await?;
        let created_by_actor = history
            .iter()
            .any(|log| log.action == AuditAction::Create && log.user_id == actor.user_id);
        if !created_by_actor {
            return Err(CoreError::task_not_found(id));
        }
        Ok(history)
    }

    /// Fetch strictly within the actor's own tasks. Public visibility grants
    /// no write access.
    async fn owned(&self, actor: &Actor, id: DbId) -> CoreResult<Task> {
        self.tasks
            .find_one(id, &LookupScope::OwnedBy(actor.user_id.clone()))
            .await?
            .ok_or_else(|| CoreError::task_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
