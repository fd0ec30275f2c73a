//! Query parameter types for list endpoints.
//!
//! Raw parameters arrive as strings so every malformed value surfaces as a
//! `VALIDATION_ERROR` body rather than an extractor rejection.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tasklog_core::error::{CoreError, CoreResult};
use tasklog_core::query::{first_tag, TaskFilter, TaskQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
use tasklog_core::types::Date;

/// Query string of `GET /tasks` and `GET /tasks/public`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub completed: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub responsible: Option<String>,
    /// Comma-separated; only the first tag is matched.
    pub tags: Option<String>,
    pub search: Option<String>,
    pub is_public: Option<String>,
}

impl TaskListParams {
    /// Parse and validate into a [`TaskQuery`].
    pub fn into_query(self) -> CoreResult<TaskQuery> {
        let filter = TaskFilter {
            completed: parse_bool("completed", present(self.completed))?,
            due_date_from: parse_date("due_date_from", present(self.due_date_from))?,
            due_date_to: parse_date("due_date_to", present(self.due_date_to))?,
            responsible: present(self.responsible),
            tag: present(self.tags).as_deref().and_then(first_tag),
            search: present(self.search),
            is_public: parse_bool("is_public", present(self.is_public))?,
        };

        let query = TaskQuery {
            filter,
            sort_by: match present(self.sort_by) {
                Some(raw) => raw.parse()?,
                None => Default::default(),
            },
            sort_order: match present(self.sort_order) {
                Some(raw) => raw.parse()?,
                None => Default::default(),
            },
            page: parse_int("page", present(self.page))?.unwrap_or(DEFAULT_PAGE),
            limit: parse_int("limit", present(self.limit))?.unwrap_or(DEFAULT_LIMIT),
        };
        query.validate()?;
        Ok(query)
    }
}

/// Query string of `GET /audit-logs`. Values are clamped by the recorder.
#[derive(Debug, Default, Deserialize)]
pub struct AuditPageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Treat empty and whitespace-only values as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(name: &str, value: Option<String>) -> CoreResult<Option<bool>> {
    match value.as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(CoreError::Validation(format!(
            "{name} must be 'true' or 'false', got '{other}'"
        ))),
    }
}

fn parse_int(name: &str, value: Option<String>) -> CoreResult<Option<i64>> {
    value
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                CoreError::Validation(format!("{name} must be an integer, got '{raw}'"))
            })
        })
        .transpose()
}

/// Accept `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
fn parse_date(name: &str, value: Option<String>) -> CoreResult<Option<Date>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|ts| ts.date_naive()))
                .map_err(|_| {
                    CoreError::Validation(format!(
                        "{name} must be a date in YYYY-MM-DD format, got '{raw}'"
                    ))
                })
        })
        .transpose()
}
