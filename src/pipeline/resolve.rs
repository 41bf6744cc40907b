//! Site object resolution.
//!
//! Binds each record to the object the registry knows for its path and
//! fans variants out into records of their own.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FileRecord, PipelineError, Stage};
use crate::site::{ObjectRef, ObjectRegistry};

pub struct Resolver {
    registry: Arc<dyn ObjectRegistry>,
    expand_variants: bool,
}

impl Resolver {
    /// Fails when no registry is configured.
    pub fn new(registry: Option<Arc<dyn ObjectRegistry>>) -> Result<Self, PipelineError> {
        let registry = registry.ok_or(PipelineError::MissingRegistry)?;
        Ok(Self {
            registry,
            expand_variants: true,
        })
    }

    /// Stages that fan variants out themselves (the renderer) resolve
    /// without expansion.
    pub fn expand_variants(mut self, expand: bool) -> Self {
        self.expand_variants = expand;
        self
    }

    /// Resolve one record into the records that continue downstream.
    ///
    /// Variant records come first and share the input's content buffer.
    /// The input record itself is always last.
    pub fn resolve(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("resolve", &record.path));
        }

        let Some(object) = self.registry.get_object(&record.path) else {
            return Ok(vec![record]);
        };

        let variants = if self.expand_variants {
            object.read().variants_depth_first()
        } else {
            Vec::new()
        };

        let mut records: Vec<FileRecord> = variants.into_iter().map(|v| record.fork(v)).collect();

        crate::debug_do! {
            if !records.is_empty() {
                crate::debug!(
                    "resolve";
                    "{} -> {} variants",
                    record.relative().display(),
                    records.len()
                );
            }
        }

        record.attach(object);
        records.push(record);
        Ok(records)
    }
}

#[async_trait]
impl Stage for Resolver {
    fn name(&self) -> &'static str {
        "resolve"
    }

    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        self.resolve(record)
    }
}
