//! In-memory store for tests and single-process development runs.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use framegate_core::naming::object_name;

use crate::{ObjectStore, PutOptions, StorageError};

const SCHEME: &str = "mem://";

/// Keeps every object in a process-local map. URLs look like
/// `mem://videos/clip-9f8a31d2.mp4`.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects. Test-facing.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn key_of<'a>(&self, url: &'a str) -> Result<&'a str, StorageError> {
        url.strip_prefix(SCHEME)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        data: Bytes,
        opts: PutOptions,
    ) -> Result<String, StorageError> {
        let key = object_name(prefix, filename, opts.unique_suffix);
        self.objects.write().await.insert(key.clone(), data);
        Ok(format!("{SCHEME}{key}"))
    }

    async fn get(&self, url: &str) -> Result<Bytes, StorageError> {
        let key = self.key_of(url)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(url.to_string()))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.key_of(url)?;
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryStore::new();
        let url = store
            .put(
                "videos",
                "clip.mp4",
                Bytes::from_static(b"abc"),
                PutOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(url, "mem://videos/clip.mp4");

        assert_eq!(store.get(&url).await.unwrap(), Bytes::from_static(b"abc"));

        store.delete(&url).await.unwrap();
        assert!(store.get(&url).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unique_puts_never_collide() {
        let store = MemoryStore::new();
        let opts = PutOptions::unique("video/mp4");
        let a = store
            .put("videos", "clip.mp4", Bytes::from_static(b"first"), opts.clone())
            .await
            .unwrap();
        let b = store
            .put("videos", "clip.mp4", Bytes::from_static(b"second"), opts)
            .await
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(&a).await.unwrap(), Bytes::from_static(b"first"));
        assert_eq!(store.get(&b).await.unwrap(), Bytes::from_static(b"second"));
    }

    #[tokio::test]
    async fn delete_of_absent_object_is_ok() {
        let store = MemoryStore::new();
        store.delete("mem://videos/never-there.mp4").await.unwrap();
    }

    #[tokio::test]
    async fn foreign_url_is_rejected() {
        let store = MemoryStore::new();
        let err = store.get("file:///tmp/clip.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
    }
}
