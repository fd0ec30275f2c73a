//! Row model for the append-only `audit_logs` table. Rows have no
//! `updated_at` column.

use sqlx::FromRow;
use tasklog_core::audit::{AuditAction, AuditLog};
use tasklog_core::error::CoreError;
use tasklog_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    pub id: DbId,
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<AuditLogRow> for AuditLog {
    type Error = CoreError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(AuditLog {
            id: row.id,
            user_id: row.user_id,
            action: row.action.parse::<AuditAction>()?,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            old_value: row.old_value,
            new_value: row.new_value,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        })
    }
}
