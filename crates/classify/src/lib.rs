//! Content-classification seam.
//!
//! The model itself is an external collaborator: image bytes go in, a
//! structured per-category verdict comes out. [`Classifier`] is the
//! boundary the pipeline depends on; [`HttpClassifier`] is the
//! production implementation over a remote inference endpoint.

pub mod error;
pub mod http;

use async_trait::async_trait;
use bytes::Bytes;

use framegate_core::detection::Detection;

pub use error::ClassifyError;
pub use http::{ClassifierConfig, HttpClassifier};

/// Classify one frame image into per-category confidences.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: Bytes) -> Result<Detection, ClassifyError>;
}
