//! Manifest recording stage.
//!
//! Collects original -> revisioned destinations of hashed records so the
//! build can flush them into the revision manifest once the stream ends.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FileRecord, PipelineError, Stage};
use crate::manifest::RevisionManifest;

/// Records `original -> revisioned` for every hashed record.
#[derive(Debug, Clone, Default)]
pub struct ManifestRecorder {
    manifest: Arc<Mutex<RevisionManifest>>,
}

impl ManifestRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far.
    pub fn snapshot(&self) -> RevisionManifest {
        self.manifest.lock().clone()
    }
}

#[async_trait]
impl Stage for ManifestRecorder {
    fn name(&self) -> &'static str {
        "manifest"
    }

    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if let (Some(_), Some(original), Some(revisioned)) = (
            &record.hash,
            &record.original_destination,
            &record.destination,
        ) {
            self.manifest.lock().record(original, revisioned);
        }
        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RevisionConfig;
    use crate::pipeline::Hasher;
    use crate::site::SiteObject;

    #[tokio::test]
    async fn test_records_hashed_only() {
        let recorder = ManifestRecorder::new();

        let mut hashed = FileRecord::new("/s/a.css", "/s", "a{}");
        hashed.attach(SiteObject::new("a.css").with_revision(true).into_ref());
        Hasher::new(&RevisionConfig::default()).hash(&mut hashed).unwrap();
        let revisioned = hashed.destination.clone().unwrap();

        let mut plain = FileRecord::new("/s/b.css", "/s", "b{}");
        plain.attach(SiteObject::new("b.css").into_ref());

        recorder.process(hashed).await.unwrap();
        recorder.process(plain).await.unwrap();

        let manifest = recorder.snapshot();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("a.css"), Some(revisioned.as_str()));
    }
}
