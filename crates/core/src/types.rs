/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date without a time component (task due dates).
pub type Date = chrono::NaiveDate;

/// Opaque identifier of an already-authenticated user.
pub type UserId = String;
