//! Filesystem-backed store for development deployments without S3.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use framegate_core::naming::object_name;

use crate::{ObjectStore, PutOptions, StorageError};

const SCHEME: &str = "file://";

/// Stores objects as files under a root directory. URLs look like
/// `file:///var/lib/framegate/videos/clip-9f8a31d2.mp4`.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, url: &str) -> Result<PathBuf, StorageError> {
        let path = url
            .strip_prefix(SCHEME)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        let path = Path::new(path);
        // Only hand back paths this store minted.
        if !path.starts_with(&self.root) {
            return Err(StorageError::ForeignUrl(url.to_string()));
        }
        Ok(path.to_path_buf())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        data: Bytes,
        opts: PutOptions,
    ) -> Result<String, StorageError> {
        let key = object_name(prefix, filename, opts.unique_suffix);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(format!("{SCHEME}{}", path.display()))
    }

    async fn get(&self, url: &str) -> Result<Bytes, StorageError> {
        let path = self.path_of(url)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(url.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let path = self.path_of(url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_under_root_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let url = store
            .put(
                "frames",
                "frame_000001.jpg",
                Bytes::from_static(b"jpeg bytes"),
                PutOptions::default(),
            )
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.contains("frames/frame_000001.jpg"));

        assert_eq!(
            store.get(&url).await.unwrap(),
            Bytes::from_static(b"jpeg bytes")
        );

        store.delete(&url).await.unwrap();
        assert!(store.get(&url).await.unwrap_err().is_not_found());
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store.get("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
    }

    #[tokio::test]
    async fn unique_suffix_produces_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let opts = PutOptions::unique("video/mp4");

        let a = store
            .put("videos", "clip.mp4", Bytes::from_static(b"a"), opts.clone())
            .await
            .unwrap();
        let b = store
            .put("videos", "clip.mp4", Bytes::from_static(b"b"), opts)
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(&a).await.unwrap(), Bytes::from_static(b"a"));
    }
}
