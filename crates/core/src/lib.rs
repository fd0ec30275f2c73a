//! Domain core for the task service.
//!
//! Holds the task and audit-log entities, the typed list query, the store
//! ports, the audit recorder and the [`service::TaskService`] orchestrator.
//! Nothing in here depends on a database driver or an HTTP framework.

pub mod attachment;
pub mod audit;
pub mod error;
pub mod memory;
pub mod query;
pub mod service;
pub mod store;
pub mod task;
pub mod types;
