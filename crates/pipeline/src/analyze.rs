//! Frame analysis stage.
//!
//! One frame in, one [`AnalyzedFrame`] out, always. Classifier errors
//! and timeouts are absorbed here: the frame gets a degraded verdict and
//! the batch keeps moving.

use std::sync::Arc;
use std::time::Duration;

use framegate_classify::Classifier;
use framegate_core::detection::Detection;
use framegate_core::report::{FrameRef, Incident};
use framegate_storage::{ObjectStore, PutOptions};

/// Outcome of analyzing one frame.
#[derive(Debug)]
pub struct AnalyzedFrame {
    pub index: usize,
    /// Present only when the frame was flagged.
    pub incident: Option<Incident>,
    /// Whether the verdict is a substituted fallback.
    pub degraded: bool,
}

pub struct FrameAnalyzer {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ObjectStore>,
    classify_timeout: Duration,
}

impl FrameAnalyzer {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ObjectStore>,
        classify_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            store,
            classify_timeout,
        }
    }

    /// Analyze one frame. Never fails; every error becomes a degraded
    /// verdict so one bad frame cannot abort the job.
    pub async fn analyze(&self, frame: &FrameRef) -> AnalyzedFrame {
        let detection = self.classify_frame(frame).await;
        let degraded = detection.degraded;

        let incident = if detection.is_flagged() {
            Some(self.build_incident(frame, detection).await)
        } else {
            None
        };

        AnalyzedFrame {
            index: frame.index,
            incident,
            degraded,
        }
    }

    async fn classify_frame(&self, frame: &FrameRef) -> Detection {
        let image = match self.store.get(&frame.url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    frame_index = frame.index,
                    error = %e,
                    "Frame fetch failed, substituting degraded verdict"
                );
                return Detection::degraded();
            }
        };

        let call = self.classifier.classify(image);
        match tokio::time::timeout(self.classify_timeout, call).await {
            Ok(Ok(detection)) => detection,
            Ok(Err(e)) => {
                tracing::warn!(
                    frame_index = frame.index,
                    error = %e,
                    "Classification failed, substituting degraded verdict"
                );
                Detection::degraded()
            }
            Err(_) => {
                tracing::warn!(
                    frame_index = frame.index,
                    timeout_secs = self.classify_timeout.as_secs(),
                    "Classification timed out, substituting degraded verdict"
                );
                Detection::degraded()
            }
        }
    }

    /// Copy the flagged frame to a screenshot artifact and assemble the
    /// incident. If the copy fails the incident still goes out,
    /// referencing the working frame image instead.
    async fn build_incident(&self, frame: &FrameRef, detection: Detection) -> Incident {
        let screenshot_url = match self.store.get(&frame.url).await {
            Ok(image) => {
                match self
                    .store
                    .put(
                        "screenshots",
                        &format!("incident_{:06}.jpg", frame.index),
                        image,
                        PutOptions::unique("image/jpeg"),
                    )
                    .await
                {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!(
                            frame_index = frame.index,
                            error = %e,
                            "Screenshot upload failed, referencing frame image"
                        );
                        frame.url.clone()
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    frame_index = frame.index,
                    error = %e,
                    "Screenshot fetch failed, referencing frame image"
                );
                frame.url.clone()
            }
        };

        Incident {
            frame_index: frame.index,
            timestamp_secs: frame.timestamp_secs,
            rating: detection.rating(),
            peak_confidence: detection.peak_confidence().unwrap_or(0),
            screenshot_url,
            detection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use framegate_classify::ClassifyError;
    use framegate_core::detection::{CategoryFinding, Rating};
    use framegate_storage::MemoryStore;

    struct FixedClassifier(Detection);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _image: Bytes) -> Result<Detection, ClassifyError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(&self, _image: Bytes) -> Result<Detection, ClassifyError> {
            Err(ClassifyError::UnexpectedStatus(503))
        }
    }

    struct HangingClassifier;

    #[async_trait]
    impl Classifier for HangingClassifier {
        async fn classify(&self, _image: Bytes) -> Result<Detection, ClassifyError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Detection::default())
        }
    }

    fn flagged_detection() -> Detection {
        let mut detection = Detection::default();
        detection.tier_b.insert(
            "graphic_violence".into(),
            CategoryFinding {
                detected: true,
                confidence: 4,
                reason: "test".into(),
            },
        );
        detection
    }

    async fn stored_frame(store: &MemoryStore) -> FrameRef {
        let url = store
            .put(
                "frames",
                "frame_000002.jpg",
                Bytes::from_static(b"jpeg"),
                PutOptions::default(),
            )
            .await
            .unwrap();
        FrameRef {
            url,
            index: 2,
            timestamp_secs: 10.0,
        }
    }

    #[tokio::test]
    async fn safe_frame_produces_no_incident() {
        let store = Arc::new(MemoryStore::new());
        let frame = stored_frame(&store).await;
        let analyzer = FrameAnalyzer::new(
            Arc::new(FixedClassifier(Detection::default())),
            store,
            Duration::from_secs(120),
        );

        let analyzed = analyzer.analyze(&frame).await;
        assert!(analyzed.incident.is_none());
        assert!(!analyzed.degraded);
        assert_eq!(analyzed.index, 2);
    }

    #[tokio::test]
    async fn flagged_frame_produces_incident_with_screenshot() {
        let store = Arc::new(MemoryStore::new());
        let frame = stored_frame(&store).await;
        let analyzer = FrameAnalyzer::new(
            Arc::new(FixedClassifier(flagged_detection())),
            store.clone(),
            Duration::from_secs(120),
        );

        let analyzed = analyzer.analyze(&frame).await;
        let incident = analyzed.incident.unwrap();
        assert_eq!(incident.rating, Rating::TierB);
        assert_eq!(incident.peak_confidence, 4);
        assert_eq!(incident.timestamp_secs, 10.0);
        assert!(incident.screenshot_url.contains("screenshots/"));
        assert_eq!(
            store.get(&incident.screenshot_url).await.unwrap(),
            Bytes::from_static(b"jpeg")
        );
    }

    #[tokio::test]
    async fn classifier_error_degrades_instead_of_failing() {
        let store = Arc::new(MemoryStore::new());
        let frame = stored_frame(&store).await;
        let analyzer =
            FrameAnalyzer::new(Arc::new(FailingClassifier), store, Duration::from_secs(120));

        let analyzed = analyzer.analyze(&frame).await;
        assert!(analyzed.degraded);
        assert!(analyzed.incident.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn classifier_timeout_degrades_instead_of_failing() {
        let store = Arc::new(MemoryStore::new());
        let frame = stored_frame(&store).await;
        let analyzer =
            FrameAnalyzer::new(Arc::new(HangingClassifier), store, Duration::from_secs(120));

        let analyzed = analyzer.analyze(&frame).await;
        assert!(analyzed.degraded);
        assert!(analyzed.incident.is_none());
    }

    #[tokio::test]
    async fn missing_frame_image_degrades() {
        let store = Arc::new(MemoryStore::new());
        let frame = FrameRef {
            url: "mem://frames/gone.jpg".into(),
            index: 0,
            timestamp_secs: 0.0,
        };
        let analyzer = FrameAnalyzer::new(
            Arc::new(FixedClassifier(flagged_detection())),
            store,
            Duration::from_secs(120),
        );

        let analyzed = analyzer.analyze(&frame).await;
        assert!(analyzed.degraded);
        assert!(analyzed.incident.is_none());
    }
}
