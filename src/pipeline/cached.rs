//! Changed-content filter.
//!
//! Drops records whose bytes match what the same stage saw for the same
//! key earlier in this process. Rebuild cycles only push what changed.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{FileRecord, PipelineError, Stage};

/// Content digests of records seen so far, keyed by `<namespace>:<key>`.
#[derive(Debug, Default)]
pub struct ChangeCache {
    seen: DashMap<String, [u8; 32]>,
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bytes` under `key`, returning whether they differ from the
    /// previous bytes for that key.
    pub fn changed(&self, key: String, bytes: &[u8]) -> bool {
        let digest = *blake3::hash(bytes).as_bytes();
        self.seen.insert(key, digest) != Some(digest)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn clear(&self) {
        self.seen.clear();
    }
}

/// Stage wrapper around a [`ChangeCache`].
pub struct Changed {
    namespace: &'static str,
    cache: Arc<ChangeCache>,
}

impl Changed {
    pub fn new(namespace: &'static str, cache: Arc<ChangeCache>) -> Self {
        Self { namespace, cache }
    }

    /// Destination when resolved, source-relative path otherwise.
    fn key(&self, record: &FileRecord) -> String {
        let key = match &record.destination {
            Some(destination) => destination.clone(),
            None => crate::utils::to_slash(&record.relative()),
        };
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl Stage for Changed {
    fn name(&self) -> &'static str {
        "cached"
    }

    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("cached", &record.path));
        }
        let Some(bytes) = record.contents.as_bytes() else {
            return Ok(vec![record]);
        };

        if self.cache.changed(self.key(&record), bytes) {
            Ok(vec![record])
        } else {
            crate::debug!("cached"; "unchanged {}", record.relative().display());
            Ok(vec![])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_identical_record_dropped() {
        let cache = Arc::new(ChangeCache::new());
        let stage = Changed::new("files", Arc::clone(&cache));

        let first = stage
            .process(FileRecord::new("/s/files/a.txt", "/s", "one"))
            .await
            .unwrap();
        let second = stage
            .process(FileRecord::new("/s/files/a.txt", "/s", "one"))
            .await
            .unwrap();
        let third = stage
            .process(FileRecord::new("/s/files/a.txt", "/s", "two"))
            .await
            .unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(third.len(), 1);
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let cache = Arc::new(ChangeCache::new());
        let files = Changed::new("files", Arc::clone(&cache));
        let images = Changed::new("images", Arc::clone(&cache));

        let record = || FileRecord::new("/s/a.png", "/s", "png");
        assert_eq!(files.process(record()).await.unwrap().len(), 1);
        assert_eq!(images.process(record()).await.unwrap().len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_forgets() {
        let cache = ChangeCache::new();
        assert!(cache.changed("k".into(), b"x"));
        assert!(!cache.changed("k".into(), b"x"));
        cache.clear();
        assert!(cache.changed("k".into(), b"x"));
    }
}
