//! `velvet revisions` and the final step of `velvet build`.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::log;
use crate::manifest::load_manifest;
use crate::rewrite::{RewriteReport, rewrite_references};
use crate::utils::plural_count;

/// Rewrite references in the build directory. A missing or empty manifest
/// makes this a no-op.
pub fn run_revisions(config: &SiteConfig) -> Result<RewriteReport> {
    let manifest_path = config.manifest_path();
    let manifest = load_manifest(&manifest_path);
    if manifest.is_empty() {
        log!("revisions"; "no revisioned assets, skipping");
        return Ok(RewriteReport::default());
    }

    let report = rewrite_references(
        config.output_dir(),
        &manifest_path,
        &manifest,
        &config.build.revision.rewrite,
    )?;

    log!(
        "revisions";
        "{} rewritten, {} scanned",
        plural_count(report.rewritten, "file"),
        report.scanned
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest_is_noop() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        fs::create_dir_all(config.output_dir()).unwrap();
        fs::write(config.output_dir().join("index.html"), "css/main.css").unwrap();

        assert_eq!(run_revisions(&config).unwrap(), RewriteReport::default());
        assert_eq!(
            fs::read_to_string(config.output_dir().join("index.html")).unwrap(),
            "css/main.css"
        );
    }

    #[test]
    fn test_custom_manifest_name() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[build.revision]\nmanifest = \"rev.json\"");
        fs::create_dir_all(config.output_dir()).unwrap();
        fs::write(config.output_dir().join("rev.json"), r#"{"a.js": "a.1.js"}"#).unwrap();
        fs::write(config.output_dir().join("index.html"), r#"<script src="a.js">"#).unwrap();

        let report = run_revisions(&config).unwrap();
        assert_eq!(report.rewritten, 1);
        assert_eq!(
            fs::read_to_string(config.output_dir().join("index.html")).unwrap(),
            r#"<script src="a.1.js">"#
        );
    }
}
