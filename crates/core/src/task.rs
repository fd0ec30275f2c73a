//! Task entity, its listing projection, partial-update patches and the
//! field snapshots recorded in the audit trail.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{Date, DbId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A persisted task. `id` and `user_id` never change once assigned.
///
/// Unsaved tasks are represented by [`NewTask`], so a `Task` always has an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: DbId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: Date,
    pub is_public: bool,
    pub comments: Option<String>,
    pub responsible: Option<String>,
    pub tags: Option<Vec<String>>,
    /// The four file fields travel together: all present or all absent.
    pub attachment: Option<FileAttachment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// A task is accessible to its owner and, when public, to everyone.
    pub fn is_accessible_to(&self, user_id: &str) -> bool {
        self.is_owned_by(user_id) || self.is_public
    }

    /// Copy of this task with the file group replaced.
    pub fn with_attachment(&self, attachment: Option<FileAttachment>) -> Task {
        Task {
            attachment,
            ..self.clone()
        }
    }
}

/// Metadata of a file attached to a task. Storage of the bytes is handled
/// elsewhere; only the descriptor is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_mime_type: String,
}

/// Fields for a task that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: Date,
    pub is_public: bool,
    pub comments: Option<String>,
    pub responsible: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Caller-supplied fields of a task about to be created. Ownership comes
/// from the acting user, never from the input.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: Date,
    pub is_public: bool,
    pub comments: Option<String>,
    pub responsible: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskDraft {
    pub fn owned_by(self, user_id: impl Into<UserId>) -> NewTask {
        NewTask {
            user_id: user_id.into(),
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
            is_public: self.is_public,
            comments: self.comments,
            responsible: self.responsible,
            tags: self.tags,
        }
    }
}

/// Read-optimized projection used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub id: DbId,
    pub title: String,
    pub completed: bool,
    pub due_date: Date,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            completed: task.completed,
            due_date: task.due_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Partial update of a task's tracked fields. `None` keeps the prior value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<Date>,
    pub is_public: Option<bool>,
    pub comments: Option<String>,
    pub responsible: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Apply `patch` over `existing`.
///
/// Identity, the file group and timestamps are carried over untouched; the
/// store refreshes `updated_at` when the result is persisted.
pub fn merge(existing: &Task, patch: &TaskPatch) -> Task {
    Task {
        id: existing.id,
        user_id: existing.user_id.clone(),
        title: patch.title.clone().unwrap_or_else(|| existing.title.clone()),
        description: patch
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        completed: patch.completed.unwrap_or(existing.completed),
        due_date: patch.due_date.unwrap_or(existing.due_date),
        is_public: patch.is_public.unwrap_or(existing.is_public),
        comments: patch.comments.clone().or_else(|| existing.comments.clone()),
        responsible: patch
            .responsible
            .clone()
            .or_else(|| existing.responsible.clone()),
        tags: patch.tags.clone().or_else(|| existing.tags.clone()),
        attachment: existing.attachment.clone(),
        created_at: existing.created_at,
        updated_at: existing.updated_at,
    }
}

// ---------------------------------------------------------------------------
// Audit snapshots
// ---------------------------------------------------------------------------

/// Snapshot of the fields tracked by create/update/delete audit entries.
pub fn tracked_snapshot(task: &Task) -> Value {
    json!({
        "title": task.title,
        "description": task.description,
        "completed": task.completed,
        "due_date": task.due_date.to_string(),
        "is_public": task.is_public,
        "comments": task.comments,
        "responsible": task.responsible,
        "tags": task.tags,
    })
}

/// Snapshot of the file group. A missing attachment yields explicit nulls.
pub fn attachment_snapshot(attachment: Option<&FileAttachment>) -> Value {
    match attachment {
        Some(a) => json!({
            "file_path": a.file_path,
            "file_name": a.file_name,
            "file_size": a.file_size,
            "file_mime_type": a.file_mime_type,
        }),
        None => json!({
            "file_path": null,
            "file_name": null,
            "file_size": null,
            "file_mime_type": null,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
