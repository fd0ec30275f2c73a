//! In-memory implementations of the store ports.
//!
//! Filtering, ordering and pagination reuse the predicates in
//! [`crate::query`], so results match the PostgreSQL adapters.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::audit::{AuditAction, AuditLog, NewAuditLog};
use crate::error::{CoreError, CoreResult};
use crate::query::{ListScope, LookupScope, TaskQuery};
use crate::store::{AuditStore, TaskStore};
use crate::task::{NewTask, Task, TaskSummary};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TaskTable {
    last_id: DbId,
    rows: BTreeMap<DbId, Task>,
}

/// Task store backed by a map guarded by a `tokio` read/write lock.
#[derive(Default)]
pub struct MemoryTaskStore {
    table: RwLock<TaskTable>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_scope(scope: &ListScope, task: &Task) -> bool {
    match scope {
        ListScope::Owner(user) => task.is_owned_by(user),
        ListScope::Public => task.is_public,
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find_page(
        &self,
        scope: &ListScope,
        query: &TaskQuery,
    ) -> CoreResult<(Vec<TaskSummary>, i64)> {
        let table = self.table.read().await;
        let filter = query.filter_for(scope);

        let mut matching: Vec<&Task> = table
            .rows
            .values()
            .filter(|t| in_scope(scope, t) && filter.matches(t))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset().max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX))
            .map(TaskSummary::from)
            .collect();

        Ok((items, total))
    }

    async fn find_one(&self, id: DbId, scope: &LookupScope) -> CoreResult<Option<Task>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|t| scope.admits(t)).cloned())
    }

    async fn insert(&self, task: &NewTask) -> CoreResult<Task> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();

        let row = Task {
            id: table.last_id,
            user_id: task.user_id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            due_date: task.due_date,
            is_public: task.is_public,
            comments: task.comments.clone(),
            responsible: task.responsible.clone(),
            tags: task.tags.clone(),
            attachment: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn replace(&self, task: &Task) -> CoreResult<Task> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&task.id)
            .filter(|row| row.is_owned_by(&task.user_id))
            .ok_or_else(|| CoreError::task_not_found(task.id))?;

        *row = Task {
            id: row.id,
            user_id: row.user_id.clone(),
            created_at: row.created_at,
            updated_at: Utc::now(),
            ..task.clone()
        };
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId, owner_id: &str) -> CoreResult<()> {
        let mut table = self.table.write().await;
        if table.rows.get(&id).is_some_and(|t| t.is_owned_by(owner_id)) {
            table.rows.remove(&id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

/// Append-only audit store backed by a vector.
#[derive(Default)]
pub struct MemoryAuditStore {
    rows: RwLock<Vec<AuditLog>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rows matching `pred`, most recent first.
fn newest_first<F>(rows: &[AuditLog], pred: F) -> Vec<AuditLog>
where
    F: Fn(&AuditLog) -> bool,
{
    let mut out: Vec<AuditLog> = rows.iter().filter(|l| pred(l)).cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    out
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &NewAuditLog) -> CoreResult<AuditLog> {
        let mut rows = self.rows.write().await;
        let log = AuditLog {
            id: rows.len() as DbId + 1,
            user_id: entry.user_id.clone(),
            action: entry.action,
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            created_at: Utc::now(),
        };
        rows.push(log.clone());
        Ok(log)
    }

    async fn by_user(&self, user_id: &str, limit: i64, offset: i64) -> CoreResult<Vec<AuditLog>> {
        let rows = self.rows.read().await;
        Ok(newest_first(&rows, |l| l.user_id == user_id)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn by_entity(&self, entity_type: &str, entity_id: DbId) -> CoreResult<Vec<AuditLog>> {
        let rows = self.rows.read().await;
        Ok(newest_first(&rows, |l| {
            l.entity_type == entity_type && l.entity_id == entity_id
        }))
    }

    async fn by_action(&self, action: AuditAction) -> CoreResult<Vec<AuditLog>> {
        let rows = self.rows.read().await;
        Ok(newest_first(&rows, |l| l.action == action))
    }

    async fn count(&self, user_id: Option<&str>) -> CoreResult<i64> {
        let rows = self.rows.read().await;
        let n = match user_id {
            Some(user) => rows.iter().filter(|l| l.user_id == user).count(),
            None => rows.len(),
        };
        Ok(n as i64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortField, SortOrder, TaskFilter};
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn new_task(user: &str, title: &str, day: u32, is_public: bool) -> NewTask {
        NewTask {
            user_id: user.to_string(),
            title: title.to_string(),
            description: format!("{title} details"),
            completed: false,
            due_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            is_public,
            comments: None,
            responsible: None,
            tags: None,
        }
    }

    async fn seeded() -> MemoryTaskStore {
        let store = MemoryTaskStore::new();
        for day in 1..=25 {
            store
                .insert(&new_task("u1", &format!("T{day:02}"), day, day % 5 == 0))
                .await
                .unwrap();
        }
        store.insert(&new_task("u2", "Other", 1, true)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryTaskStore::new();
        let a = store.insert(&new_task("u1", "A", 1, false)).await.unwrap();
        let b = store.insert(&new_task("u1", "B", 2, false)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn pages_are_disjoint_and_cover_the_full_set() {
        let store = seeded().await;
        let scope = ListScope::Owner("u1".into());
        let mut seen = Vec::new();

        for page in 1..=3 {
            let query = TaskQuery {
                sort_by: SortField::DueDate,
                sort_order: SortOrder::Asc,
                page,
                limit: 10,
                ..Default::default()
            };
            let (items, total) = store.find_page(&scope, &query).await.unwrap();
            assert_eq!(total, 25);
            assert!(items.len() <= 10);
            seen.extend(items.into_iter().map(|s| s.id));
        }

        let expected: Vec<DbId> = (1..=25).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_total() {
        let store = seeded().await;
        let query = TaskQuery { page: 9, ..Default::default() };

        let (items, total) = store
            .find_page(&ListScope::Owner("u1".into()), &query)
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(total, 25);
    }

    #[tokio::test]
    async fn largest_page_number_is_empty_with_total() {
        let store = seeded().await;
        let query = TaskQuery { page: i64::MAX, ..Default::default() };

        let (items, total) = store
            .find_page(&ListScope::Owner("u1".into()), &query)
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(total, 25);
    }

    #[tokio::test]
    async fn public_scope_spans_owners() {
        let store = seeded().await;
        let (items, total) = store
            .find_page(&ListScope::Public, &TaskQuery { limit: 100, ..Default::default() })
            .await
            .unwrap();

        // Days 5, 10, 15, 20, 25 from u1 plus one from u2.
        assert_eq!(total, 6);
        assert_eq!(items.len(), 6);
    }

    #[tokio::test]
    async fn owner_scope_honours_is_public_filter() {
        let store = seeded().await;
        let query = TaskQuery {
            filter: TaskFilter { is_public: Some(false), ..Default::default() },
            limit: 100,
            ..Default::default()
        };
        let (_, total) = store
            .find_page(&ListScope::Owner("u1".into()), &query)
            .await
            .unwrap();
        assert_eq!(total, 20);
    }

    #[tokio::test]
    async fn replace_is_owner_scoped_and_refreshes_updated_at() {
        let store = MemoryTaskStore::new();
        let task = store.insert(&new_task("u1", "A", 1, false)).await.unwrap();

        let foreign = Task { user_id: "u2".into(), ..task.clone() };
        assert_matches!(store.replace(&foreign).await, Err(CoreError::NotFound { .. }));

        let changed = Task { title: "A2".into(), ..task.clone() };
        let saved = store.replace(&changed).await.unwrap();
        assert_eq!(saved.title, "A2");
        assert_eq!(saved.created_at, task.created_at);
        assert!(saved.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn delete_ignores_foreign_owner() {
        let store = MemoryTaskStore::new();
        let task = store.insert(&new_task("u1", "A", 1, false)).await.unwrap();

        store.delete(task.id, "u2").await.unwrap();
        let owned = LookupScope::OwnedBy("u1".into());
        assert!(store.find_one(task.id, &owned).await.unwrap().is_some());

        store.delete(task.id, "u1").await.unwrap();
        assert!(store.find_one(task.id, &owned).await.unwrap().is_none());
    }
}
