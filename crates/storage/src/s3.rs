//! S3-compatible store (AWS S3 or MinIO with a custom endpoint).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use framegate_core::naming::object_name;

use crate::{ObjectStore, PutOptions, StorageError};

/// Connection settings, read from the environment by the server.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for MinIO; `None` for AWS S3.
    pub endpoint: Option<String>,
    /// Base URL objects are served from, e.g.
    /// `https://my-bucket.s3.us-west-2.amazonaws.com`. No trailing slash.
    pub public_base_url: String,
}

pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    /// Build a store from ambient AWS credentials and the given config.
    pub async fn connect(config: S3Config) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .region(aws_sdk_s3::config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            // Path-style addressing is required for MinIO.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_of(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn key_of<'a>(&self, url: &'a str) -> Result<&'a str, StorageError> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        data: Bytes,
        opts: PutOptions,
    ) -> Result<String, StorageError> {
        let key = object_name(prefix, filename, opts.unique_suffix);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data));
        if let Some(content_type) = opts.content_type {
            request = request.content_type(content_type);
        }
        request
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Stored object");
        Ok(self.url_of(&key))
    }

    async fn get(&self, url: &str) -> Result<Bytes, StorageError> {
        let key = self.key_of(url)?;

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let text = e.to_string();
                if text.contains("NoSuchKey") {
                    StorageError::NotFound(url.to_string())
                } else {
                    StorageError::Backend(text)
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.key_of(url)?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Deleted object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> S3Store {
        let client = Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version_latest()
                .build(),
        );
        S3Store::with_client(
            client,
            S3Config {
                bucket: "screening".into(),
                region: "us-east-1".into(),
                endpoint: None,
                public_base_url: "https://screening.s3.us-east-1.amazonaws.com/".into(),
            },
        )
    }

    #[test]
    fn url_round_trips_through_key() {
        let store = store();
        let url = store.url_of("videos/clip-9f8a31d2.mp4");
        assert_eq!(
            url,
            "https://screening.s3.us-east-1.amazonaws.com/videos/clip-9f8a31d2.mp4"
        );
        assert_eq!(store.key_of(&url).unwrap(), "videos/clip-9f8a31d2.mp4");
    }

    #[test]
    fn foreign_url_is_rejected() {
        let store = store();
        let err = store
            .key_of("https://elsewhere.example.com/videos/clip.mp4")
            .unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
    }
}
