use std::path::PathBuf;

use thiserror::Error;

use crate::render::RenderError;

/// Errors raised by pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The resolver was set up without an object registry.
    #[error("object registry is not configured")]
    MissingRegistry,

    #[error("{stage}: streaming not supported: {}", path.display())]
    Streaming { stage: &'static str, path: PathBuf },

    #[error("failed to render `{}`", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("failed to minify `{}`: {message}", path.display())]
    Minify { path: PathBuf, message: String },

    #[error("io error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl PipelineError {
    pub fn streaming(stage: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::Streaming {
            stage,
            path: path.into(),
        }
    }

    /// Configuration faults abort the whole invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingRegistry)
    }
}

/// A failed record, reported by the pipeline sink.
#[derive(Debug, Error)]
#[error("[{stage}] {}", path.display())]
pub struct RecordError {
    pub stage: &'static str,
    pub path: PathBuf,
    #[source]
    pub error: PipelineError,
}
