//! The screening pipeline: Upload → Extract → Analyze → Cleanup.
//!
//! The [`orchestrator`] sequences the stages and owns the failure and
//! cleanup policy. Each side effect is a discrete, retry-safe unit:
//! storage writes use unique object names, stage transitions go through
//! the [`repo`] so a replayed transition is a no-op, and every progress
//! emission is one write against the event sink.

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod job;
pub mod orchestrator;
pub mod repo;
pub mod scheduler;

pub use analyze::{AnalyzedFrame, FrameAnalyzer};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use extract::{FfmpegExtractor, FrameExtractor};
pub use job::VideoJob;
pub use orchestrator::Orchestrator;
pub use repo::{InMemoryJobRepository, JobRecord, JobRepository, JobStage};
pub use scheduler::{AnalysisOutcome, BoundedScheduler};
