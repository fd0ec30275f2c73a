//! Row structs matching the database tables.
//!
//! Each submodule contains a `FromRow` struct and its conversion into the
//! corresponding `tasklog-core` entity.

pub mod audit;
pub mod task;
