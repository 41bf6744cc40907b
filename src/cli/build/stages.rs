//! Per-stage pipelines.
//!
//! ```text
//! documents  resolve(no fan-out) -> render -> destination -> write
//! files      resolve -> cached -> hash -> destination -> write -> manifest
//! images     resolve -> destination -> cached -> restore -> hash -> destination -> write -> manifest
//! scripts    resolve -> minify -> hash -> destination -> write -> manifest
//! styles     resolve -> minify -> hash -> destination -> write -> manifest
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::asset::collect_stage_files;
use crate::core::{BuildSession, StageKind};
use crate::pipeline::{
    Changed, DestinationTracker, Hasher, ManifestRecorder, Minify, Pipeline, PipelineReport,
    Resolver, Write,
};
use crate::render::{Renderer, VariantRenderer, load_templates};

/// Build one stage and merge its manifest entries into the persisted
/// manifest.
pub async fn run_stage(session: &BuildSession, kind: StageKind) -> Result<PipelineReport> {
    let config = &session.config;
    let files = collect_stage_files(config, kind, &session.registry);
    if files.is_empty() {
        crate::debug!(kind.name(); "no input files");
        return Ok(PipelineReport::default());
    }

    let recorder = ManifestRecorder::new();
    let pipeline = assemble(session, kind, &recorder)?;
    let report = pipeline
        .run_files(files, config.source_dir().to_path_buf())
        .await;

    let entries = recorder.snapshot();
    if !entries.is_empty() {
        session
            .manifest
            .flush(&entries, true)
            .with_context(|| format!("failed to write {}", session.manifest.path().display()))?;
    }

    Ok(report)
}

fn assemble(
    session: &BuildSession,
    kind: StageKind,
    recorder: &ManifestRecorder,
) -> Result<Pipeline> {
    let config = &session.config;
    let output = config.output_dir();
    let hasher = Hasher::new(&config.build.revision);
    let resolver = Resolver::new(session.object_registry())?;
    let pipeline = Pipeline::new(kind.name());

    let pipeline = match kind {
        StageKind::Documents => {
            let env = load_templates(config.templates_dir())?;
            let renderer = Renderer::new(
                env,
                &config.site,
                Arc::clone(&session.templates),
                config.build.cache,
            );
            return Ok(pipeline
                .stage(resolver.expand_variants(false))
                .stage(VariantRenderer::new(Arc::new(renderer)))
                .stage(DestinationTracker::apply())
                .stage(Write::new(output)));
        }
        StageKind::Files => pipeline
            .stage(resolver)
            .stage(Changed::new(kind.name(), Arc::clone(&session.changes)))
            .stage(hasher),
        StageKind::Images => pipeline
            .stage(resolver)
            .stage(DestinationTracker::apply())
            .stage(Changed::new(kind.name(), Arc::clone(&session.changes)))
            .stage(DestinationTracker::restore())
            .stage(hasher),
        StageKind::Scripts | StageKind::Styles => pipeline
            .stage(resolver)
            .stage(Minify)
            .stage(hasher),
    };

    Ok(pipeline
        .stage(DestinationTracker::apply())
        .stage(Write::new(output))
        .stage(recorder.clone()))
}
