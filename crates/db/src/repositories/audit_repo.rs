//! Repository for the append-only `audit_logs` table.

use sqlx::PgPool;
use tasklog_core::audit::{AuditAction, NewAuditLog};
use tasklog_core::types::DbId;

use crate::models::audit::AuditLogRow;

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, action, entity_type, entity_id, \
    old_value, new_value, ip_address, user_agent, created_at";

/// Column list for INSERT (excludes auto-generated `id` and `created_at`).
const INSERT_COLUMNS: &str = "\
    user_id, action, entity_type, entity_id, \
    old_value, new_value, ip_address, user_agent";

/// Most recent first. `id` breaks ties between rows written in the same
/// transaction timestamp.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Provides insert and query operations for audit logs. There is no update
/// or delete.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry, returning the stored row.
    pub async fn insert(pool: &PgPool, entry: &NewAuditLog) -> Result<AuditLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs ({INSERT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(&entry.user_id)
            .bind(entry.action.as_str())
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Entries written by `user_id`, paginated.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs WHERE user_id = $1 {NEWEST_FIRST} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Full history of one entity.
    pub async fn list_by_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE entity_type = $1 AND entity_id = $2 {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_action(
        pool: &PgPool,
        action: AuditAction,
    ) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_logs WHERE action = $1 {NEWEST_FIRST}");
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(action.as_str())
            .fetch_all(pool)
            .await
    }

    /// Count entries, optionally for a single user.
    pub async fn count(pool: &PgPool, user_id: Option<&str>) -> Result<i64, sqlx::Error> {
        match user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*)::BIGINT FROM audit_logs WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM audit_logs")
                    .fetch_one(pool)
                    .await
            }
        }
    }
}
