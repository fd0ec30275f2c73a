//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw `sqlx` errors.

pub mod audit_repo;
pub mod task_repo;

pub use audit_repo::AuditLogRepo;
pub use task_repo::TaskRepo;
