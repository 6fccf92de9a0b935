//! HTTP classifier over a remote inference endpoint.
//!
//! The frame is posted as a multipart form (`image` part plus the fixed
//! `prompt` part); the endpoint answers with the tiered verdict JSON
//! that deserializes straight into [`Detection`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use framegate_core::detection::Detection;
use framegate_core::rubric::{self, rubric_prompt};

use crate::{Classifier, ClassifyError};

/// Endpoint settings, read from the environment by the server.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Full URL of the classification endpoint.
    pub endpoint: String,
    /// Bearer token, if the endpoint requires one.
    pub api_token: Option<String>,
    /// Per-call deadline in seconds.
    pub timeout_secs: u64,
}

pub struct HttpClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
    prompt: String,
}

impl HttpClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            // The rubric never changes per call, so render it once.
            prompt: rubric_prompt(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: Bytes) -> Result<Detection, ClassifyError> {
        let form = reqwest::multipart::Form::new()
            .part(
                "image",
                reqwest::multipart::Part::bytes(image.to_vec())
                    .file_name("frame.jpg")
                    .mime_str("image/jpeg")
                    .map_err(|e| ClassifyError::Parse(e.to_string()))?,
            )
            .text("prompt", self.prompt.clone());

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifyError::Timeout(self.config.timeout_secs)
            } else {
                ClassifyError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::UnexpectedStatus(status.as_u16()));
        }

        let detection: Detection = response
            .json()
            .await
            .map_err(|e| ClassifyError::Parse(e.to_string()))?;
        validate(&detection)?;
        tracing::debug!(rating = detection.rating().as_str(), "Frame classified");
        Ok(detection)
    }
}

/// Reject verdicts whose shape the model got wrong rather than letting
/// them skew the rating downstream.
fn validate(detection: &Detection) -> Result<(), ClassifyError> {
    for (name, finding) in detection.tier_a.iter().chain(detection.tier_b.iter()) {
        if !rubric::is_known_category(name) {
            return Err(ClassifyError::Parse(format!("unknown category: {name}")));
        }
        if !(rubric::CONFIDENCE_MIN..=rubric::CONFIDENCE_MAX).contains(&finding.confidence) {
            return Err(ClassifyError::Parse(format!(
                "confidence {} out of range for {name}",
                finding.confidence
            )));
        }
    }
    Ok(())
}
