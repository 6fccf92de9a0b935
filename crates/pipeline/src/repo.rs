//! Job repository: the durable record of where each job is in its
//! lifecycle.
//!
//! The pipeline persists a stage transition at every boundary so a
//! replayed run can observe how far the previous attempt got. The
//! interface, not the backing store, is the contract; the in-memory
//! implementation serves tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use framegate_core::types::{JobId, Timestamp};

use crate::error::PipelineError;

/// Lifecycle stage of a job. Transitions only move forward; replaying
/// the current stage is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobStage {
    Received,
    Uploaded,
    Extracted,
    Analyzing,
    Cleanup,
    Complete,
    Failed,
}

impl JobStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether a transition from `self` to `to` is legal.
    ///
    /// Forward moves and same-stage replays are allowed; `Failed` is
    /// reachable from any non-terminal stage.
    pub fn allows(self, to: JobStage) -> bool {
        if self.is_terminal() {
            return self == to;
        }
        if to == JobStage::Failed {
            return true;
        }
        to >= self
    }
}

/// Persisted state for one job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: JobId,
    pub filename: String,
    pub size_bytes: u64,
    pub stage: JobStage,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobRecord {
    pub fn new(id: JobId, filename: impl Into<String>, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename: filename.into(),
            size_bytes,
            stage: JobStage::Received,
            started_at: now,
            updated_at: now,
        }
    }
}

/// Keyed store of job records.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn save(&self, record: JobRecord) -> Result<(), PipelineError>;
    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, PipelineError>;
    async fn update_stage(&self, id: JobId, stage: JobStage) -> Result<(), PipelineError>;
    async fn delete(&self, id: JobId) -> Result<(), PipelineError>;
}

/// Process-local repository over a `RwLock`ed map.
#[derive(Default)]
pub struct InMemoryJobRepository {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn save(&self, record: JobRecord) -> Result<(), PipelineError> {
        self.records.write().await.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, PipelineError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_stage(&self, id: JobId, stage: JobStage) -> Result<(), PipelineError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| PipelineError::Repository(format!("unknown job {id}")))?;
        if !record.stage.allows(stage) {
            return Err(PipelineError::Repository(format!(
                "illegal stage transition {:?} -> {stage:?} for job {id}",
                record.stage
            )));
        }
        record.stage = stage;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: JobId) -> Result<(), PipelineError> {
        self.records.write().await.remove(&id);
        Ok(())
    }
}
