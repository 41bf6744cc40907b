//! `velvet manifest`.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::manifest::load_manifest;

/// Print the persisted manifest as JSON (`{}` when there is none).
pub fn print_manifest(config: &SiteConfig) -> Result<()> {
    let manifest = load_manifest(&config.manifest_path());
    println!("{}", manifest.to_json()?);
    Ok(())
}
