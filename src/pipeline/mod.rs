//! Record pipeline.
//!
//! Stages are chained with bounded channels, each running as its own task:
//!
//! ```text
//! source ──▶ resolve ──▶ hash ──▶ destination ──▶ write ──▶ manifest ──▶ sink
//!        32          32       32              32        32           32
//! ```
//!
//! A stage that cannot keep up fills its input channel, which suspends the
//! stage before it. Items are `Result`s: a failed record travels to the sink
//! as a [`RecordError`] and its siblings keep flowing.

mod cached;
mod destination;
mod error;
mod hash;
mod manifest;
mod minify;
mod record;
mod resolve;
mod write;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use cached::{ChangeCache, Changed};
pub use destination::{DestinationMode, DestinationTracker};
pub use error::{PipelineError, RecordError};
pub use hash::{Hasher, digest, revisioned_path};
pub use manifest::ManifestRecorder;
pub use minify::Minify;
pub use record::{Contents, FileRecord};
pub use resolve::Resolver;
pub use write::Write;

/// Capacity of every inter-stage channel.
const CHANNEL_BUFFER: usize = 32;

type Item = Result<FileRecord, RecordError>;

/// One-to-many record transform.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Process one record. An empty vec drops it.
    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError>;
}

/// What reached the end of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    /// Output path relative to the build root.
    pub relative: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub emitted: Vec<Emitted>,
    pub errors: Vec<RecordError>,
}

impl PipelineReport {
    pub fn bytes(&self) -> u64 {
        self.emitted.iter().map(|e| e.bytes as u64).sum()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Ordered chain of stages.
pub struct Pipeline {
    name: &'static str,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Push `records` through every stage and collect the outcome.
    ///
    /// Records may reach the sink in any order.
    pub async fn run(self, records: Vec<FileRecord>) -> PipelineReport {
        self.run_with(|tx| async move {
            for record in records {
                if tx.send(Ok(record)).await.is_err() {
                    break;
                }
            }
        })
        .await
    }

    /// Read `paths` lazily and push them through every stage.
    ///
    /// Files are only read as fast as the first stage accepts them.
    pub async fn run_files(self, paths: Vec<PathBuf>, base: PathBuf) -> PipelineReport {
        self.run_with(move |tx| async move {
            for path in paths {
                let item = FileRecord::read(&path, &base).await.map_err(|e| RecordError {
                    stage: "read",
                    path: path.clone(),
                    error: PipelineError::Io(path.clone(), e),
                });
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        })
        .await
    }

    async fn run_with<F, Fut>(self, source: F) -> PipelineReport
    where
        F: FnOnce(mpsc::Sender<Item>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (source_tx, mut rx) = mpsc::channel::<Item>(CHANNEL_BUFFER);

        let mut handles = Vec::with_capacity(self.stages.len() + 1);
        handles.push(tokio::spawn(source(source_tx)));

        for stage in self.stages {
            let (tx, next_rx) = mpsc::channel::<Item>(CHANNEL_BUFFER);
            let input = std::mem::replace(&mut rx, next_rx);
            handles.push(tokio::spawn(run_stage(stage, input, tx)));
        }

        let mut report = PipelineReport::default();
        while let Some(item) = rx.recv().await {
            match item {
                Ok(record) => report.emitted.push(Emitted {
                    relative: record.relative(),
                    bytes: record.contents.len(),
                }),
                Err(error) => report.errors.push(error),
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                crate::log!("error"; "{} pipeline task failed: {}", self.name, e);
            }
        }

        report
    }
}

async fn run_stage(
    stage: Arc<dyn Stage>,
    mut input: mpsc::Receiver<Item>,
    output: mpsc::Sender<Item>,
) {
    while let Some(item) = input.recv().await {
        let results: Vec<Item> = match item {
            Err(error) => vec![Err(error)],
            Ok(record) => {
                let path = record.source().to_path_buf();
                match stage.process(record).await {
                    Ok(records) => records.into_iter().map(Ok).collect(),
                    Err(error) => vec![Err(RecordError {
                        stage: stage.name(),
                        path,
                        error,
                    })],
                }
            }
        };

        for result in results {
            if output.send(result).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits one copy per `n`, failing on paths containing "bad".
    struct Repeat(usize);

    #[async_trait]
    impl Stage for Repeat {
        fn name(&self) -> &'static str {
            "repeat"
        }

        async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
            if record.path.to_string_lossy().contains("bad") {
                return Err(PipelineError::streaming("repeat", &record.path));
            }
            Ok(vec![record; self.0])
        }
    }

    struct Discard;

    #[async_trait]
    impl Stage for Discard {
        fn name(&self) -> &'static str {
            "discard"
        }

        async fn process(&self, _: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
            Ok(vec![])
        }
    }

    fn records(n: usize) -> Vec<FileRecord> {
        (0..n)
            .map(|i| FileRecord::new(format!("/s/{i}.txt"), "/s", "x"))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_pipeline_passes_through() {
        let report = Pipeline::new("t").run(records(3)).await;
        assert_eq!(report.emitted.len(), 3);
        assert_eq!(report.bytes(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_beyond_channel_capacity() {
        let report = Pipeline::new("t")
            .stage(Repeat(3))
            .stage(Repeat(2))
            .run(records(CHANNEL_BUFFER * 2))
            .await;
        assert!(report.is_ok());
        assert_eq!(report.emitted.len(), CHANNEL_BUFFER * 2 * 6);
    }

    #[tokio::test]
    async fn test_failed_record_does_not_stop_siblings() {
        let mut input = records(4);
        input.push(FileRecord::new("/s/bad.txt", "/s", "x"));

        let report = Pipeline::new("t").stage(Repeat(1)).stage(Repeat(1)).run(input).await;
        assert_eq!(report.emitted.len(), 4);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage, "repeat");
        assert_eq!(report.errors[0].path, PathBuf::from("/s/bad.txt"));
    }

    #[tokio::test]
    async fn test_run_files_reads_lazily() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "abc").unwrap();
        let paths = vec![dir.path().join("a.txt"), dir.path().join("missing.txt")];

        let report = Pipeline::new("t")
            .run_files(paths, dir.path().to_path_buf())
            .await;
        assert_eq!(
            report.emitted,
            vec![Emitted {
                relative: PathBuf::from("a.txt"),
                bytes: 3
            }]
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage, "read");
    }

    #[tokio::test]
    async fn test_dropping_stage() {
        let report = Pipeline::new("t").stage(Discard).run(records(5)).await;
        assert!(report.emitted.is_empty());
        assert!(report.is_ok());
    }
}
