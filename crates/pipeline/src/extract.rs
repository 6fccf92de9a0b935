//! Frame extraction stage.
//!
//! Fetches the stored source video, verifies integrity, samples one
//! frame per interval with ffmpeg, and persists each frame to object
//! storage as soon as it is produced so peak memory stays at one frame.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use framegate_core::ffmpeg;
use framegate_core::report::FrameRef;
use framegate_storage::{ObjectStore, PutOptions};

use crate::error::PipelineError;

/// Extraction seam. The production implementation shells out to ffmpeg;
/// tests substitute a stub so no decoder binary is needed.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Produce frame references for the source at `source_url`.
    ///
    /// `expected_size` is the byte count recorded at upload time; a
    /// mismatch on re-fetch means a storage consistency race and aborts
    /// the job.
    async fn extract(
        &self,
        source_url: &str,
        expected_size: u64,
    ) -> Result<Vec<FrameRef>, PipelineError>;
}

/// ffmpeg-backed extractor. Works in a scratch directory that is
/// removed when the extraction finishes, on either path.
pub struct FfmpegExtractor {
    store: Arc<dyn ObjectStore>,
    interval_secs: u32,
}

impl FfmpegExtractor {
    pub fn new(store: Arc<dyn ObjectStore>, interval_secs: u32) -> Self {
        Self {
            store,
            interval_secs,
        }
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract(
        &self,
        source_url: &str,
        expected_size: u64,
    ) -> Result<Vec<FrameRef>, PipelineError> {
        let data = self
            .store
            .get(source_url)
            .await
            .map_err(|e| PipelineError::Download(e.to_string()))?;

        // Scratch space is dropped (and removed) when this function
        // returns, success or not.
        let scratch = tempfile::tempdir()?;
        let video_path = scratch.path().join("source.video");
        tokio::fs::write(&video_path, &data).await?;

        let written = tokio::fs::metadata(&video_path).await?.len();
        if written != expected_size {
            return Err(PipelineError::Integrity {
                expected: expected_size,
                actual: written,
            });
        }

        let probe = ffmpeg::probe_video(&video_path).await?;
        let duration = ffmpeg::parse_duration(&probe);
        let timestamps = ffmpeg::sample_timestamps(duration, self.interval_secs);
        tracing::info!(
            source = source_url,
            duration_secs = duration,
            frames = timestamps.len(),
            "Extracting frames"
        );

        let mut frames = Vec::with_capacity(timestamps.len());
        for (index, timestamp_secs) in timestamps.into_iter().enumerate() {
            let frame_path = scratch.path().join(format!("frame_{index:06}.jpg"));
            ffmpeg::extract_frame_jpeg(&video_path, &frame_path, timestamp_secs).await?;

            let jpeg = tokio::fs::read(&frame_path).await?;
            let url = self
                .store
                .put(
                    "frames",
                    &format!("frame_{index:06}.jpg"),
                    Bytes::from(jpeg),
                    PutOptions::unique("image/jpeg"),
                )
                .await?;
            tokio::fs::remove_file(&frame_path).await?;

            frames.push(FrameRef {
                url,
                index,
                timestamp_secs,
            });
        }

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegate_storage::MemoryStore;

    #[tokio::test]
    async fn missing_source_maps_to_download_error() {
        let store = Arc::new(MemoryStore::new());
        let extractor = FfmpegExtractor::new(store, 5);

        let err = extractor
            .extract("mem://videos/never-uploaded.mp4", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Download(_)));
    }

    #[tokio::test]
    async fn size_mismatch_is_an_integrity_error() {
        let store = Arc::new(MemoryStore::new());
        let url = store
            .put(
                "videos",
                "clip.mp4",
                Bytes::from_static(b"short"),
                PutOptions::default(),
            )
            .await
            .unwrap();

        let extractor = FfmpegExtractor::new(store, 5);
        let err = extractor.extract(&url, 9999).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Integrity {
                expected: 9999,
                actual: 5
            }
        ));
    }
}
