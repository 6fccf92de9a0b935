//! Progress event types and the percent mapping for each pipeline stage.

use serde::{Deserialize, Serialize};

use framegate_core::report::JobResult;

// ---------------------------------------------------------------------------
// Stage percent anchors
// ---------------------------------------------------------------------------

/// Percent reported after the source upload completes.
pub const PERCENT_UPLOADED: u8 = 10;

/// Percent reported after frame extraction completes. Also the lower
/// bound of the analysis stage's range.
pub const PERCENT_EXTRACTED: u8 = 40;

/// Upper bound of the analysis stage's percent range.
pub const PERCENT_ANALYZED: u8 = 90;

/// Percent reported after cleanup.
pub const PERCENT_CLEANUP: u8 = 95;

/// Percent carried by the terminal `complete` event.
pub const PERCENT_COMPLETE: u8 = 100;

/// Map analysis completion onto the stage's share of overall progress.
///
/// `completed` out of `total` frames maps linearly onto
/// `[PERCENT_EXTRACTED, PERCENT_ANALYZED]`. A zero-frame job reports the
/// upper bound immediately.
pub fn analysis_percent(completed: usize, total: usize) -> u8 {
    if total == 0 || completed >= total {
        return PERCENT_ANALYZED;
    }
    let span = (PERCENT_ANALYZED - PERCENT_EXTRACTED) as usize;
    PERCENT_EXTRACTED + ((completed * span) / total) as u8
}

// ---------------------------------------------------------------------------
// ProgressEvent
// ---------------------------------------------------------------------------

/// One record on the progress stream.
///
/// The serialized form is a single JSON object tagged by `type`, matching
/// the client contract exactly:
///
/// ```json
/// {"type":"frameProcessed","current":3,"total":6,"percent":65}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    /// A named pipeline step finished.
    Progress {
        step: String,
        message: String,
        percent: u8,
    },
    /// One frame's analysis completed (in completion order, not
    /// submission order).
    FrameProcessed {
        current: usize,
        total: usize,
        percent: u8,
    },
    /// Terminal: the job finished and `result` is final.
    Complete { percent: u8, result: JobResult },
    /// Terminal: the job failed.
    Error { message: String },
}

impl ProgressEvent {
    pub fn progress(step: impl Into<String>, message: impl Into<String>, percent: u8) -> Self {
        Self::Progress {
            step: step.into(),
            message: message.into(),
            percent,
        }
    }

    pub fn frame_processed(current: usize, total: usize) -> Self {
        Self::FrameProcessed {
            current,
            total,
            percent: analysis_percent(current, total),
        }
    }

    pub fn complete(result: JobResult) -> Self {
        Self::Complete {
            percent: PERCENT_COMPLETE,
            result,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Terminal events close the stream; exactly one appears per job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// The percent carried by this event, if it has one.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Progress { percent, .. }
            | Self::FrameProcessed { percent, .. }
            | Self::Complete { percent, .. } => Some(*percent),
            Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegate_core::report::ResultMetadata;

    fn empty_result() -> JobResult {
        JobResult {
            job_id: uuid::Uuid::nil(),
            incidents: vec![],
            total_frames: 0,
            processed_at: chrono::Utc::now(),
            metadata: ResultMetadata {
                filename: "clip.mp4".into(),
                interval_secs: 5,
                source_digest: String::new(),
                degraded_frames: 0,
            },
        }
    }

    #[test]
    fn serialized_tags_match_wire_contract() {
        let cases = [
            (
                ProgressEvent::progress("upload", "stored source", 10),
                "progress",
            ),
            (ProgressEvent::frame_processed(1, 6), "frameProcessed"),
            (ProgressEvent::complete(empty_result()), "complete"),
            (ProgressEvent::error("boom"), "error"),
        ];
        for (event, tag) in cases {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], tag);
        }
    }

    #[test]
    fn complete_always_carries_one_hundred() {
        let json = serde_json::to_value(ProgressEvent::complete(empty_result())).unwrap();
        assert_eq!(json["percent"], 100);
    }

    #[test]
    fn terminal_detection() {
        assert!(ProgressEvent::complete(empty_result()).is_terminal());
        assert!(ProgressEvent::error("x").is_terminal());
        assert!(!ProgressEvent::progress("extract", "", 40).is_terminal());
        assert!(!ProgressEvent::frame_processed(1, 2).is_terminal());
    }

    #[test]
    fn analysis_percent_is_monotone_and_bounded() {
        let total = 7;
        let mut last = 0;
        for completed in 0..=total {
            let p = analysis_percent(completed, total);
            assert!(p >= PERCENT_EXTRACTED);
            assert!(p <= PERCENT_ANALYZED);
            assert!(p >= last, "percent regressed at {completed}/{total}");
            last = p;
        }
        assert_eq!(analysis_percent(total, total), PERCENT_ANALYZED);
    }

    #[test]
    fn analysis_percent_with_zero_frames() {
        assert_eq!(analysis_percent(0, 0), PERCENT_ANALYZED);
    }

    #[test]
    fn event_round_trips_through_one_line() {
        let event = ProgressEvent::frame_processed(3, 6);
        let line = serde_json::to_string(&event).unwrap();
        assert!(!line.contains('\n'));
        let back: ProgressEvent = serde_json::from_str(&line).unwrap();
        match back {
            ProgressEvent::FrameProcessed {
                current,
                total,
                percent,
            } => {
                assert_eq!((current, total), (3, 6));
                assert_eq!(percent, analysis_percent(3, 6));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
