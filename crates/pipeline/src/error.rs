//! Pipeline error taxonomy.
//!
//! Frame-scope failures (classification errors and timeouts) never
//! surface here; the analyzer absorbs them. Everything below is
//! stage-scope and aborts the job through the orchestrator's failure
//! path.

use framegate_core::ffmpeg::FfmpegError;
use framegate_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid upload: {0}")]
    Validation(String),

    #[error("source fetch failed: {0}")]
    Download(String),

    #[error("integrity check failed: wrote {actual} bytes, expected {expected}")]
    Integrity { expected: u64, actual: u64 },

    #[error("frame extraction failed: {0}")]
    Extraction(#[from] FfmpegError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("scratch I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("job repository error: {0}")]
    Repository(String),
}
