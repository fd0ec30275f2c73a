//! Row models for the `tasks` table.

use sqlx::FromRow;
use tasklog_core::task::{FileAttachment, Task, TaskSummary};
use tasklog_core::types::{Date, DbId, Timestamp};

/// A full row from the `tasks` table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: DbId,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: Date,
    pub is_public: bool,
    pub comments: Option<String>,
    pub responsible: Option<String>,
    pub tags: Option<Vec<String>>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_mime_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        // The table CHECK guarantees the four columns are set together.
        let attachment = match (row.file_path, row.file_name, row.file_size, row.file_mime_type) {
            (Some(file_path), Some(file_name), Some(file_size), Some(file_mime_type)) => {
                Some(FileAttachment {
                    file_path,
                    file_name,
                    file_size,
                    file_mime_type,
                })
            }
            _ => None,
        };

        Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            due_date: row.due_date,
            is_public: row.is_public,
            comments: row.comments,
            responsible: row.responsible,
            tags: row.tags,
            attachment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The columns selected by list queries.
#[derive(Debug, Clone, FromRow)]
pub struct TaskSummaryRow {
    pub id: DbId,
    pub title: String,
    pub completed: bool,
    pub due_date: Date,
}

impl From<TaskSummaryRow> for TaskSummary {
    fn from(row: TaskSummaryRow) -> Self {
        TaskSummary {
            id: row.id,
            title: row.title,
            completed: row.completed,
            due_date: row.due_date,
        }
    }
}
