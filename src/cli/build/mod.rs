//! Site building orchestration.
//!
//! Stages run in a fixed order, each merge-flushing its revision entries:
//!
//! ```text
//! documents -> files -> images -> scripts -> styles -> revisions
//! ```
//!
//! A record that fails stops only its own flow; the build reports every
//! failure once all stages have run.

mod stages;

use std::fs;

use anyhow::{Context, Result, bail};

use crate::cli::clean::clean_output;
use crate::cli::revisions::run_revisions;
use crate::core::{BuildSession, StageKind};
use crate::log;
use crate::pipeline::PipelineError;
use crate::render::describe_error;
use crate::rewrite::RewriteReport;
use crate::utils::plural_count;

pub use stages::run_stage;

/// Outcome of a full build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Artifacts emitted per stage.
    pub emitted: Vec<(StageKind, usize)>,
    pub failures: usize,
    pub rewrite: RewriteReport,
}

/// Run every stage, then the reference rewrite.
pub async fn build_site(session: &BuildSession) -> Result<BuildSummary> {
    let config = &session.config;
    session.begin_cycle();

    let output = config.output_dir();
    if config.build.clean {
        clean_output(output)?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut summary = BuildSummary::default();
    for kind in StageKind::ALL {
        let report = run_stage(session, kind).await?;

        for failure in &report.errors {
            // Render failures were already reported with their template.
            if !matches!(failure.error, PipelineError::Render { .. }) {
                log!("error"; "{}", describe_error(failure));
            }
        }
        if !report.emitted.is_empty() {
            crate::logger::log_size(kind.name(), report.emitted.len(), report.bytes());
        }

        summary.failures += report.errors.len();
        summary.emitted.push((kind, report.emitted.len()));
    }

    summary.rewrite = run_revisions(config)?;

    if summary.failures > 0 {
        bail!("{} failed to build", plural_count(summary.failures, "file"));
    }
    Ok(summary)
}
