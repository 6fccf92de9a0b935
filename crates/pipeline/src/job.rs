//! The unit of work handed to the orchestrator.

use bytes::Bytes;
use chrono::Utc;

use framegate_core::types::{JobId, Timestamp};

/// One processing run. Owned exclusively by the orchestrator from
/// creation until the terminal event; dropped afterwards.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub id: JobId,
    /// Original filename supplied with the upload.
    pub filename: String,
    /// Full source video bytes.
    pub data: Bytes,
    pub started_at: Timestamp,
}

impl VideoJob {
    pub fn new(filename: impl Into<String>, data: Bytes) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            filename: filename.into(),
            data,
            started_at: Utc::now(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
