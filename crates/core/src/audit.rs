//! Audit trail: actions, immutable log entries and the recorder that wraps
//! mutations with before/after snapshots.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::store::AuditStore;
use crate::types::{DbId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Known entity type tags.
pub mod entity_types {
    pub const TASK: &str = "TASK";
}

/// Default page size for per-user audit queries.
pub const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// Maximum page size for per-user audit queries.
pub const MAX_AUDIT_LIMIT: i64 = 500;

/// Effective `(limit, offset)` for a per-user audit query.
pub fn audit_page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    View,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::View => "VIEW",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(AuditAction::Create),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            "VIEW" => Ok(AuditAction::View),
            other => Err(CoreError::Internal(format!("Unknown audit action '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A single audit log entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: UserId,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: DbId,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// An audit entry ready to be appended. `id` and `created_at` are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub user_id: UserId,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: DbId,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// The user performing an operation, with request provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_provenance(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// What to log for one operation.
///
/// The constructors fix which snapshots each action carries: `old_value` for
/// UPDATE/DELETE, `new_value` for CREATE/UPDATE, neither for VIEW.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl AuditEntry {
    pub fn create(entity_type: &'static str, entity_id: DbId, new_value: Value) -> Self {
        Self {
            action: AuditAction::Create,
            entity_type,
            entity_id,
            old_value: None,
            new_value: Some(new_value),
        }
    }

    pub fn update(
        entity_type: &'static str,
        entity_id: DbId,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            action: AuditAction::Update,
            entity_type,
            entity_id,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }

    pub fn delete(entity_type: &'static str, entity_id: DbId, old_value: Value) -> Self {
        Self {
            action: AuditAction::Delete,
            entity_type,
            entity_id,
            old_value: Some(old_value),
            new_value: None,
        }
    }

    pub fn view(entity_type: &'static str, entity_id: DbId) -> Self {
        Self {
            action: AuditAction::View,
            entity_type,
            entity_id,
            old_value: None,
            new_value: None,
        }
    }

    fn into_new_log(self, actor: &Actor) -> NewAuditLog {
        NewAuditLog {
            user_id: actor.user_id.clone(),
            action: self.action,
            entity_type: self.entity_type.to_string(),
            entity_id: self.entity_id,
            old_value: self.old_value,
            new_value: self.new_value,
            ip_address: actor.ip_address.clone(),
            user_agent: actor.user_agent.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Writes audit entries and wraps operations with them.
///
/// Writes are never swallowed: a failed append is returned to the caller.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Append one entry attributed to `actor`.
    pub async fn record(&self, actor: &Actor, entry: AuditEntry) -> CoreResult<AuditLog> {
        let log = self.store.append(&entry.into_new_log(actor)).await?;
        tracing::debug!(
            audit_log_id = log.id,
            user_id = %log.user_id,
            action = %log.action,
            entity_type = %log.entity_type,
            entity_id = log.entity_id,
            "Audit entry recorded",
        );
        Ok(log)
    }

    /// Run `op`, then record the entry `describe` derives from its result.
    ///
    /// If the audit write fails the primary write has already happened; the
    /// gap is logged for reconciliation and the failure is returned.
    pub async fn after<T, Fut, F>(&self, actor: &Actor, op: Fut, describe: F) -> CoreResult<T>
    where
        Fut: Future<Output = CoreResult<T>> + Send,
        F: FnOnce(&T) -> AuditEntry + Send,
    {
        let value = op.await?;
        let entry = describe(&value);
        let (action, entity_type, entity_id) = (entry.action, entry.entity_type, entry.entity_id);

        if let Err(err) = self.record(actor, entry).await {
            tracing::error!(
                error = %err,
                user_id = %actor.user_id,
                %action,
                entity_type,
                entity_id,
                "Mutation persisted but its audit entry could not be written",
            );
            return Err(err);
        }
        Ok(value)
    }

    /// Record `entry`, then run `op`. The audit write happens-before the
    /// operation, so an audit failure prevents the operation entirely.
    pub async fn before<T, Fut>(&self, actor: &Actor, entry: AuditEntry, op: Fut) -> CoreResult<T>
    where
        Fut: Future<Output = CoreResult<T>> + Send,
    {
        let log = self.record(actor, entry).await?;
        op.await.map_err(|err| {
            tracing::error!(
                error = %err,
                audit_log_id = log.id,
                action = %log.action,
                entity_id = log.entity_id,
                "Operation failed after its audit entry was written",
            );
            err
        })
    }

    /// Entries written by `user_id`, most recent first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> CoreResult<Vec<AuditLog>> {
        let (limit, offset) = audit_page_bounds(limit, offset);
        self.store.by_user(user_id, limit, offset).await
    }

    /// Full history of one entity, most recent first.
    pub async fn find_by_entity(&self, entity_type: &str, entity_id: DbId) -> CoreResult<Vec<AuditLog>> {
        self.store.by_entity(entity_type, entity_id).await
    }

    pub async fn find_by_action(&self, action: AuditAction) -> CoreResult<Vec<AuditLog>> {
        self.store.by_action(action).await
    }

    pub async fn count(&self, user_id: Option<&str>) -> CoreResult<i64> {
        self.store.count(user_id).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
