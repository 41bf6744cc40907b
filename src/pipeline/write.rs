//! Output stage writing records under the build directory.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{FileRecord, PipelineError, Stage};

/// Writes buffered records under the build root at their relative path.
#[derive(Debug, Clone)]
pub struct Write {
    output: PathBuf,
}

impl Write {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

#[async_trait]
impl Stage for Write {
    fn name(&self) -> &'static str {
        "write"
    }

    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("write", &record.path));
        }
        let Some(bytes) = record.contents.as_bytes() else {
            return Ok(vec![record]);
        };

        let target = self.output.join(record.relative());
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::Io(parent.to_path_buf(), e))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| PipelineError::Io(target.clone(), e))?;

        crate::debug!("write"; "{}", record.relative().display());
        Ok(vec![record])
    }
}
