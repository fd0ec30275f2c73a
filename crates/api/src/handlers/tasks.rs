//! Handlers for the `/tasks` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tasklog_core::error::CoreError;
use tasklog_core::query::Page;
use tasklog_core::task::{FileAttachment, Task, TaskDraft, TaskPatch, TaskSummary};
use tasklog_core::types::{Date, DbId};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::user::RequestUser;
use crate::query::TaskListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,

    pub due_date: Date,

    #[serde(default)]
    pub is_public: bool,

    pub comments: Option<String>,

    #[validate(length(max = 255, message = "Responsible must not exceed 255 characters"))]
    pub responsible: Option<String>,

    #[validate(length(max = 50, message = "At most 50 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

impl CreateTaskRequest {
    fn into_draft(self) -> Result<TaskDraft, CoreError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        Ok(TaskDraft {
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
            is_public: self.is_public,
            comments: self.comments,
            responsible: self.responsible,
            tags: self.tags,
        })
    }
}

/// Body of `PUT /tasks/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub due_date: Option<Date>,

    pub is_public: Option<bool>,

    pub comments: Option<String>,

    #[validate(length(max = 255, message = "Responsible must not exceed 255 characters"))]
    pub responsible: Option<String>,

    #[validate(length(max = 50, message = "At most 50 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    fn into_patch(self) -> Result<TaskPatch, CoreError> {
        if let Some(ref title) = self.title {
            require_text("title", title)?;
        }
        if let Some(ref description) = self.description {
            require_text("description", description)?;
        }
        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
            is_public: self.is_public,
            comments: self.comments,
            responsible: self.responsible,
            tags: self.tags,
        })
    }
}

/// Body of `POST /tasks/{id}/file`: the descriptor of a stored file.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachFileRequest {
    #[validate(length(min = 1, message = "file_path must not be empty"))]
    pub file_path: String,

    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub file_name: String,

    #[validate(range(min = 0, message = "file_size must not be negative"))]
    pub file_size: i64,

    pub file_mime_type: String,
}

impl From<AttachFileRequest> for FileAttachment {
    fn from(req: AttachFileRequest) -> Self {
        FileAttachment {
            file_path: req.file_path,
            file_name: req.file_name,
            file_size: req.file_size,
            file_mime_type: req.file_mime_type,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppJson(input): AppJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    input.validate()?;
    let task = state.service.create(&actor, input.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks
pub async fn list_mine(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppQuery(params): AppQuery<TaskListParams>,
) -> AppResult<Json<DataResponse<Page<TaskSummary>>>> {
    let query = params.into_query()?;
    let page = state.service.list_mine(&actor.user_id, &query).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/tasks/public
pub async fn list_public(
    State(state): State<AppState>,
    _user: RequestUser,
    AppQuery(params): AppQuery<TaskListParams>,
) -> AppResult<Json<DataResponse<Page<TaskSummary>>>> {
    let query = params.into_query()?;
    let page = state.service.list_public(&query).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = state.service.get_by_id(&actor, id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTaskRequest>,
) -> AppResult<Json<DataResponse<Task>>> {
    input.validate()?;
    let task = state.service.update(&actor, id, &input.into_patch()?).await?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    state.service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/file
pub async fn attach_file(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AttachFileRequest>,
) -> AppResult<Json<DataResponse<Task>>> {
    input.validate()?;
    let task = state.service.attach_file(&actor, id, input.into()).await?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}/file
pub async fn remove_file(
    State(state): State<AppState>,
    RequestUser(actor): RequestUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = state.service.remove_file(&actor, id).await?;
    Ok(Json(DataResponse { data: task }))
}
