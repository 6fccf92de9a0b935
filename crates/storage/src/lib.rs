//! Object storage backends for uploaded videos and frame screenshots.
//!
//! All backends implement [`ObjectStore`], which is URL-oriented: `put`
//! returns the URL the object is reachable at, and `get`/`delete` take
//! that URL back. Each backend owns a URL scheme (`mem://`, `file://`,
//! or the bucket's HTTPS base) and rejects URLs it did not mint.

pub mod error;
pub mod local;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::StorageError;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

/// Options applied to a single `put`.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// MIME type recorded with the object where the backend supports it.
    pub content_type: Option<String>,
    /// Insert a random fragment into the object name so a retried write
    /// never collides with an earlier partial attempt.
    pub unique_suffix: bool,
}

impl PutOptions {
    /// Options for a retry-safe write of the given MIME type.
    pub fn unique(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            unique_suffix: true,
        }
    }
}

/// Store, fetch, and remove binary objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `prefix`, deriving the object name from
    /// `filename` per `opts`. Returns the object's URL.
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        data: Bytes,
        opts: PutOptions,
    ) -> Result<String, StorageError>;

    /// Fetch the object at a URL previously returned by `put`.
    async fn get(&self, url: &str) -> Result<Bytes, StorageError>;

    /// Remove the object at a URL previously returned by `put`.
    /// Deleting an already-absent object is not an error.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}
