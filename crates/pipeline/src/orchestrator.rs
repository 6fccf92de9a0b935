//! Stage orchestrator: Upload → Extract → Analyze → Cleanup.
//!
//! Stages run strictly sequentially. Every stage transition is persisted
//! through the repository before the matching progress event goes out,
//! and every storage write uses a unique object name, so replaying a
//! partially-completed job cannot duplicate a side effect.
//!
//! Failure policy: frame-scope errors never reach this level (the
//! analyzer absorbs them). A stage-scope error triggers exactly one
//! terminal `error` event, a best-effort deletion of the uploaded
//! source, and a `Failed` stage record, then propagates to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use framegate_classify::Classifier;
use framegate_core::hashing::sha256_hex;
use framegate_core::report::{JobResult, ResultMetadata};
use framegate_events::protocol::{PERCENT_CLEANUP, PERCENT_EXTRACTED, PERCENT_UPLOADED};
use framegate_events::{EventSink, ProgressEvent};
use framegate_storage::{ObjectStore, PutOptions};

use crate::analyze::FrameAnalyzer;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::extract::FrameExtractor;
use crate::job::VideoJob;
use crate::repo::{JobRecord, JobRepository, JobStage};
use crate::scheduler::BoundedScheduler;

pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn FrameExtractor>,
    scheduler: BoundedScheduler,
    repo: Arc<dyn JobRepository>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn FrameExtractor>,
        classifier: Arc<dyn Classifier>,
        repo: Arc<dyn JobRepository>,
        config: PipelineConfig,
    ) -> Self {
        let analyzer = FrameAnalyzer::new(
            classifier,
            Arc::clone(&store),
            Duration::from_secs(config.classify_timeout_secs),
        );
        let scheduler = BoundedScheduler::new(Arc::new(analyzer), config.max_concurrent_analyses);
        Self {
            store,
            extractor,
            scheduler,
            repo,
            config,
        }
    }

    /// Run one job to its terminal event.
    ///
    /// Exactly one terminal event (`complete` xor `error`) is appended
    /// to `sink`, always last. The returned error, if any, is the same
    /// failure already reported on the stream.
    pub async fn run(
        &self,
        job: VideoJob,
        sink: &dyn EventSink,
    ) -> Result<JobResult, PipelineError> {
        let mut source_url = None;
        match self.execute(&job, sink, &mut source_url).await {
            Ok(result) => {
                tracing::info!(
                    job_id = %job.id,
                    incidents = result.incidents.len(),
                    total_frames = result.total_frames,
                    "Job complete"
                );
                Ok(result)
            }
            Err(error) => {
                self.fail(&job, source_url.as_deref(), sink, &error).await;
                Err(error)
            }
        }
    }

    async fn execute(
        &self,
        job: &VideoJob,
        sink: &dyn EventSink,
        source_url: &mut Option<String>,
    ) -> Result<JobResult, PipelineError> {
        if job.data.is_empty() {
            return Err(PipelineError::Validation("upload is empty".into()));
        }
        if job.size() > self.config.max_upload_bytes {
            return Err(PipelineError::Validation(format!(
                "upload of {} bytes exceeds the {} byte limit",
                job.size(),
                self.config.max_upload_bytes
            )));
        }

        self.repo
            .save(JobRecord::new(job.id, &job.filename, job.size()))
            .await?;

        // Upload
        let source_digest = sha256_hex(&job.data);
        let url = self
            .store
            .put(
                "videos",
                &job.filename,
                job.data.clone(),
                PutOptions::unique("application/octet-stream"),
            )
            .await?;
        *source_url = Some(url.clone());
        self.repo.update_stage(job.id, JobStage::Uploaded).await?;
        self.emit(
            sink,
            ProgressEvent::progress("upload", "source video stored", PERCENT_UPLOADED),
        )
        .await;

        // Extract
        let frames = self.extractor.extract(&url, job.size()).await?;
        self.repo.update_stage(job.id, JobStage::Extracted).await?;
        self.emit(
            sink,
            ProgressEvent::progress(
                "extract",
                format!(
                    "{} frames at {}s intervals",
                    frames.len(),
                    self.config.interval_secs
                ),
                PERCENT_EXTRACTED,
            ),
        )
        .await;

        // Analyze
        self.repo.update_stage(job.id, JobStage::Analyzing).await?;
        let frame_urls: Vec<String> = frames.iter().map(|f| f.url.clone()).collect();
        let outcome = self.scheduler.run(frames, sink).await;

        // Cleanup
        self.repo.update_stage(job.id, JobStage::Cleanup).await?;
        self.cleanup(&url, &frame_urls).await;
        self.emit(
            sink,
            ProgressEvent::progress("cleanup", "working artifacts removed", PERCENT_CLEANUP),
        )
        .await;

        let result = JobResult {
            job_id: job.id,
            incidents: outcome.incidents,
            total_frames: outcome.total_frames,
            processed_at: Utc::now(),
            metadata: ResultMetadata {
                filename: job.filename.clone(),
                interval_secs: self.config.interval_secs,
                source_digest,
                degraded_frames: outcome.degraded_frames,
            },
        };

        // Persist the terminal stage before announcing it, so a crash
        // between the two can only under-report, never double-report.
        self.repo.update_stage(job.id, JobStage::Complete).await?;
        self.emit(sink, ProgressEvent::complete(result.clone())).await;
        Ok(result)
    }

    /// One terminal `error` event, best-effort source deletion, `Failed`
    /// stage record. Nothing in here escalates; the original error is
    /// what the caller sees.
    async fn fail(
        &self,
        job: &VideoJob,
        source_url: Option<&str>,
        sink: &dyn EventSink,
        error: &PipelineError,
    ) {
        tracing::error!(job_id = %job.id, error = %error, "Job failed");

        self.emit(sink, ProgressEvent::error(error.to_string())).await;

        if let Some(url) = source_url {
            if let Err(e) = self.store.delete(url).await {
                tracing::warn!(job_id = %job.id, error = %e, "Source cleanup failed");
            }
        }

        if let Err(e) = self.repo.update_stage(job.id, JobStage::Failed).await {
            tracing::warn!(job_id = %job.id, error = %e, "Failed-stage record update failed");
        }
    }

    /// Remove the source video and the working frame images. Screenshot
    /// artifacts referenced by incidents are kept.
    async fn cleanup(&self, source_url: &str, frame_urls: &[String]) {
        if let Err(e) = self.store.delete(source_url).await {
            tracing::warn!(url = source_url, error = %e, "Source cleanup failed");
        }
        for url in frame_urls {
            if let Err(e) = self.store.delete(url).await {
                tracing::warn!(url = url.as_str(), error = %e, "Frame cleanup failed");
            }
        }
    }

    /// Append one event, logging a write failure instead of aborting:
    /// the stream is telemetry, not job state.
    async fn emit(&self, sink: &dyn EventSink, event: ProgressEvent) {
        if let Err(e) = sink.append(&event).await {
            tracing::warn!(error = %e, "Progress write failed");
        }
    }
}
