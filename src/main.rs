//! Velvet - a static site build pipeline with content-hashed asset revisioning.

mod asset;
mod cli;
mod config;
mod core;
mod hooks;
mod logger;
mod manifest;
mod pipeline;
mod render;
mod rewrite;
mod site;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site};
use config::SiteConfig;
use core::BuildSession;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build(config),
        Commands::Revisions => cli::revisions::run_revisions(&config).map(|_| ()),
        Commands::Manifest => cli::manifest::print_manifest(&config),
        Commands::Clean => {
            let removed = cli::clean::clean_output(config.output_dir())?;
            log!("clean"; "removed {}", utils::plural_count(removed, "item"));
            Ok(())
        }
    }
}

/// Build on a single-threaded runtime: stages overlap on I/O, not threads.
fn build(config: SiteConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let session = BuildSession::new(config);
    let summary = runtime.block_on(build_site(&session))?;

    let total: usize = summary.emitted.iter().map(|(_, n)| n).sum();
    log!("build"; "done, {}", utils::plural_count(total, "artifact"));
    Ok(())
}
