//! Repository for the `tasks` table.

use sqlx::PgPool;
use tasklog_core::query::{escape_like, ListScope, LookupScope, TaskQuery};
use tasklog_core::task::{NewTask, Task, TaskSummary};
use tasklog_core::types::{Date, DbId};

use crate::models::task::{TaskRow, TaskSummaryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, user_id, title, description, completed, due_date, is_public, \
    comments, responsible, tags, file_path, file_name, file_size, \
    file_mime_type, created_at, updated_at";

/// Columns projected by list queries.
const SUMMARY_COLUMNS: &str = "id, title, completed, due_date";

/// Provides persistence operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row. A new task never has a
    /// file attached.
    pub async fn create(pool: &PgPool, input: &NewTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (user_id, title, description, completed, due_date, is_public,
                 comments, responsible, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(&input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.completed)
            .bind(input.due_date)
            .bind(input.is_public)
            .bind(&input.comments)
            .bind(&input.responsible)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
            .map(Task::from)
    }

    /// Find a task by ID within `scope`. Rows outside the scope are
    /// indistinguishable from missing ones.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        scope: &LookupScope,
    ) -> Result<Option<Task>, sqlx::Error> {
        let (condition, user_id) = match scope {
            LookupScope::OwnedBy(user) => ("user_id = $2", user),
            LookupScope::AccessibleTo(user) => ("(user_id = $2 OR is_public = TRUE)", user),
        };
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND {condition}");
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Task::from))
    }

    /// One page of summaries matching `params` within `scope`.
    pub async fn list_page(
        pool: &PgPool,
        scope: &ListScope,
        params: &TaskQuery,
    ) -> Result<Vec<TaskSummary>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_task_filter(scope, params);
        let column = params.sort_by.column();
        let direction = params.sort_order.as_sql();

        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM tasks {where_clause} \
             ORDER BY {column} {direction}, id {direction} \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_task_values(sqlx::query_as::<_, TaskSummaryRow>(&query), &bind_values);
        let rows = q
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(TaskSummary::from).collect())
    }

    /// Count tasks matching `params` within `scope`, ignoring pagination.
    pub async fn count(
        pool: &PgPool,
        scope: &ListScope,
        params: &TaskQuery,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_task_filter(scope, params);

        let query = format!("SELECT COUNT(*)::BIGINT AS count FROM tasks {where_clause}");

        let q = bind_task_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Overwrite every mutable column of an owner-matched row, including the
    /// file group, and refresh `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` and owner exists.
    pub async fn replace(pool: &PgPool, task: &Task) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = $3,
                description = $4,
                completed = $5,
                due_date = $6,
                is_public = $7,
                comments = $8,
                responsible = $9,
                tags = $10,
                file_path = $11,
                file_name = $12,
                file_size = $13,
                file_mime_type = $14,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let file = task.attachment.as_ref();
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(task.id)
            .bind(&task.user_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.due_date)
            .bind(task.is_public)
            .bind(&task.comments)
            .bind(&task.responsible)
            .bind(&task.tags)
            .bind(file.map(|f| f.file_path.as_str()))
            .bind(file.map(|f| f.file_name.as_str()))
            .bind(file.map(|f| f.file_size))
            .bind(file.map(|f| f.file_mime_type.as_str()))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Task::from))
    }

    /// Hard-delete an owner-matched task. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, owner_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built task queries.
#[derive(Debug, PartialEq)]
enum BindValue {
    Bool(bool),
    Text(String),
    Date(Date),
}

/// Build a WHERE clause and bind values from the scope and filter.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The scope always
/// contributes a condition, so the clause always starts with `WHERE `.
fn build_task_filter(scope: &ListScope, params: &TaskQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();
    let filter = params.filter_for(scope);

    match scope {
        ListScope::Owner(user_id) => {
            conditions.push(format!("user_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(user_id.clone()));
        }
        ListScope::Public => conditions.push("is_public = TRUE".to_string()),
    }

    if let Some(completed) = filter.completed {
        conditions.push(format!("completed = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Bool(completed));
    }

    if let Some(from) = filter.due_date_from {
        conditions.push(format!("due_date >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(from));
    }

    if let Some(to) = filter.due_date_to {
        conditions.push(format!("due_date <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(to));
    }

    if let Some(responsible) = filter.responsible {
        conditions.push(format!("responsible = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(responsible));
    }

    if let Some(tag) = filter.tag {
        conditions.push(format!("array_to_string(tags, ',') ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(&tag))));
    }

    if let Some(search) = filter.search {
        conditions.push(format!(
            "(title ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(&search))));
    }

    if let Some(is_public) = filter.is_public {
        conditions.push(format!("is_public = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Bool(is_public));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_task_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_task_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}
