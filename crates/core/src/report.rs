//! Job-level result types: incidents and the final report returned on the
//! `complete` event.

use serde::{Deserialize, Serialize};

use crate::detection::{Detection, Rating};
use crate::types::{JobId, Timestamp};

/// A reference to one extracted frame.
///
/// Immutable once created by the extractor; the scheduler and analyzer
/// only ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRef {
    /// Object-storage URL of the frame image.
    pub url: String,
    /// Zero-based ordinal in chronological order.
    pub index: usize,
    /// Position in the source video, `index * interval_secs`.
    pub timestamp_secs: f64,
}

/// A flagged frame, augmented with its screenshot artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Zero-based index of the frame that was flagged.
    pub frame_index: usize,
    /// Position of the frame in the source video.
    pub timestamp_secs: f64,
    /// Derived severity rating (never `safe` for an incident).
    pub rating: Rating,
    /// Highest confidence among the significant findings.
    pub peak_confidence: u8,
    /// Object-storage URL of the screenshot artifact.
    pub screenshot_url: String,
    /// The full per-category detection for this frame.
    pub detection: Detection,
}

/// Metadata attached to a finished job result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Original filename supplied with the upload.
    pub filename: String,
    /// Sampling interval used for frame extraction.
    pub interval_secs: u32,
    /// SHA-256 hex digest of the source bytes.
    pub source_digest: String,
    /// Number of frames whose classification fell back to a degraded
    /// verdict.
    pub degraded_frames: usize,
}

/// Final payload of the `complete` event.
///
/// Constructed exactly once by the orchestrator after the analysis stage
/// finishes, then never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// Job this result belongs to.
    pub job_id: JobId,
    /// Incidents ordered by frame timestamp.
    pub incidents: Vec<Incident>,
    /// Total number of frames extracted and accounted for.
    pub total_frames: usize,
    /// When the job finished processing (UTC, serialized ISO-8601).
    pub processed_at: Timestamp,
    /// Ancillary information about the run.
    pub metadata: ResultMetadata,
}
