//! Bounded-concurrency analysis scheduler.
//!
//! A semaphore of width C admits analyses as a sliding window: the
//! moment one finishes, the next queued frame starts. Events are emitted
//! in completion order; results are keyed by frame index so the final
//! incident list comes out sorted by timestamp no matter how completion
//! interleaved.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use framegate_core::report::{FrameRef, Incident};
use framegate_events::{EventSink, ProgressEvent};

use crate::analyze::FrameAnalyzer;

/// Aggregate result of the analysis stage.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Flagged frames, sorted by frame timestamp.
    pub incidents: Vec<Incident>,
    pub total_frames: usize,
    /// Frames whose verdict was a substituted fallback.
    pub degraded_frames: usize,
}

pub struct BoundedScheduler {
    analyzer: Arc<FrameAnalyzer>,
    max_concurrent: usize,
}

impl BoundedScheduler {
    pub fn new(analyzer: Arc<FrameAnalyzer>, max_concurrent: usize) -> Self {
        Self {
            analyzer,
            max_concurrent,
        }
    }

    /// Analyze every frame under the concurrency ceiling, emitting one
    /// `frameProcessed` event per completion.
    ///
    /// Stream-write failures are logged and do not interrupt analysis;
    /// they concern telemetry, not job correctness.
    pub async fn run(&self, frames: Vec<FrameRef>, sink: &dyn EventSink) -> AnalysisOutcome {
        let total = frames.len();
        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for frame in frames {
            let analyzer = Arc::clone(&self.analyzer);
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                // Semaphore is never closed while tasks hold it, so the
                // only acquire failure mode is unreachable.
                let _permit = limiter.acquire_owned().await;
                analyzer.analyze(&frame).await
            });
        }

        let mut completed = 0usize;
        let mut degraded_frames = 0usize;
        let mut by_index: BTreeMap<usize, Incident> = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            match joined {
                Ok(analyzed) => {
                    if analyzed.degraded {
                        degraded_frames += 1;
                    }
                    if let Some(incident) = analyzed.incident {
                        by_index.insert(incident.frame_index, incident);
                    }
                }
                Err(e) => {
                    // A panicked analysis still counts toward completion
                    // accounting; the frame is treated as degraded.
                    tracing::error!(error = %e, "Frame analysis task failed");
                    degraded_frames += 1;
                }
            }

            let event = ProgressEvent::frame_processed(completed, total);
            if let Err(e) = sink.append(&event).await {
                tracing::warn!(error = %e, "Progress write failed, continuing analysis");
            }
        }

        AnalysisOutcome {
            incidents: by_index.into_values().collect(),
            total_frames: total,
            degraded_frames,
        }
    }
}
