/// Job identifiers are UUIDv4, generated when an upload is accepted.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
