//! Typed list query for tasks: whitelisted sort fields, filter set,
//! pagination bounds and the page envelope returned to callers.
//!
//! This module lives in `core` so both store adapters (PostgreSQL and
//! in-memory) compile the exact same filter semantics.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::task::Task;
use crate::types::{Date, UserId};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 1;

pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Access boundary of a list query. The two scopes are never mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Owner(UserId),
    Public,
}

/// Access boundary of a single-task lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupScope {
    /// Only the owner may see the task (write paths).
    OwnedBy(UserId),
    /// The owner, or anyone when the task is public (read path).
    AccessibleTo(UserId),
}

impl LookupScope {
    pub fn admits(&self, task: &Task) -> bool {
        match self {
            LookupScope::OwnedBy(user) => task.is_owned_by(user),
            LookupScope::AccessibleTo(user) => task.is_accessible_to(user),
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Fields a list may be ordered by. Anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Completed,
    Id,
}

impl SortField {
    pub const ALLOWED: &'static [&'static str] = &[
        "created_at",
        "updated_at",
        "due_date",
        "title",
        "completed",
        "id",
    ];

    /// Column name in the `tasks` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::Title => "title",
            SortField::Completed => "completed",
            SortField::Id => "id",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Completed => a.completed.cmp(&b.completed),
            SortField::Id => a.id.cmp(&b.id),
        }
    }
}

impl FromStr for SortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "due_date" => Ok(SortField::DueDate),
            "title" => Ok(SortField::Title),
            "completed" => Ok(SortField::Completed),
            "id" => Ok(SortField::Id),
            other => Err(CoreError::Validation(format!(
                "Unsupported sort field '{other}'. Allowed: {}",
                SortField::ALLOWED.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(CoreError::Validation(format!(
                "Invalid sort order '{s}'. Expected ASC or DESC"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Conjunctive filter set. Every `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// Inclusive lower bound on `due_date`.
    pub due_date_from: Option<Date>,
    /// Inclusive upper bound on `due_date`.
    pub due_date_to: Option<Date>,
    /// Exact match.
    pub responsible: Option<String>,
    /// Substring matched against the comma-joined tag list.
    pub tag: Option<String>,
    /// Substring matched against title OR description, case-insensitive.
    pub search: Option<String>,
    /// Only meaningful in the owner scope.
    pub is_public: Option<bool>,
}

impl TaskFilter {
    /// Reference predicate. Mirrors the SQL compiled by the PostgreSQL store.
    pub fn matches(&self, task: &Task) -> bool {
        if self.completed.is_some_and(|c| task.completed != c) {
            return false;
        }
        if self.due_date_from.is_some_and(|from| task.due_date < from) {
            return false;
        }
        if self.due_date_to.is_some_and(|to| task.due_date > to) {
            return false;
        }
        if let Some(ref responsible) = self.responsible {
            if task.responsible.as_deref() != Some(responsible.as_str()) {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            let joined = match task.tags {
                Some(ref tags) => tags.join(",").to_lowercase(),
                None => return false,
            };
            if !joined.contains(&tag.to_lowercase()) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !task.title.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.is_public.is_some_and(|p| task.is_public != p) {
            return false;
        }
        true
    }
}

/// Extract the tag token the filter matches on.
///
/// Only the first comma-separated token is used; the rest are ignored. An
/// empty first token yields no constraint.
pub fn first_tag(raw: &str) -> Option<String> {
    raw.split(',')
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Escape LIKE metacharacters so user input is matched literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A complete list request: filters, ordering and the requested page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            filter: TaskFilter::default(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TaskQuery {
    /// Check pagination bounds and the date range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.page < 1 {
            return Err(CoreError::Validation("page must be a positive integer".into()));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if let (Some(from), Some(to)) = (self.filter.due_date_from, self.filter.due_date_to) {
            if from > to {
                return Err(CoreError::Validation(
                    "due_date_from must not be after due_date_to".into(),
                ));
            }
        }
        Ok(())
    }

    /// Rows skipped before the requested page. Saturates, so a page far
    /// past the data simply yields no rows.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// The filter as applied within `scope`. The public scope already pins
    /// `is_public`, so the caller's value is dropped there.
    pub fn filter_for(&self, scope: &ListScope) -> TaskFilter {
        match scope {
            ListScope::Owner(_) => self.filter.clone(),
            ListScope::Public => TaskFilter {
                is_public: None,
                ..self.filter.clone()
            },
        }
    }

    /// Total order used for listings: the sort field, then `id` in the same
    /// direction so pages never overlap.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ord = self
            .sort_by
            .compare(a, b)
            .then_with(|| a.id.cmp(&b.id));
        match self.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Page envelope
// ---------------------------------------------------------------------------

/// One page of results plus the total matching count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
