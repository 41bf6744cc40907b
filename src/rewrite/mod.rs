//! Reference rewriting.
//!
//! Once every stage has flushed the manifest, references to original
//! destinations inside built HTML, CSS and JS are replaced with their
//! revisioned destinations.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;
use regex::{Captures, Regex, RegexBuilder};

use crate::manifest::RevisionManifest;

/// Compiled-size ceiling for the key alternation; large manifests exceed
/// the `regex` default of 10 MiB.
const PATTERN_SIZE_LIMIT: usize = 1 << 30;

/// Replaces manifest keys in text.
#[derive(Debug)]
pub struct Rewriter {
    pattern: Regex,
    manifest: RevisionManifest,
}

impl Rewriter {
    /// `Ok(None)` for an empty manifest.
    pub fn new(manifest: &RevisionManifest) -> Result<Option<Self>, regex::Error> {
        Self::with_size_limit(manifest, PATTERN_SIZE_LIMIT)
    }

    fn with_size_limit(
        manifest: &RevisionManifest,
        size_limit: usize,
    ) -> Result<Option<Self>, regex::Error> {
        if manifest.is_empty() {
            return Ok(None);
        }

        // Longest first: alternation picks the first branch that matches.
        let mut keys: Vec<&str> = manifest.entries().map(|(k, _)| k).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");

        // A key preceded by a name character is part of a longer path.
        let pattern = RegexBuilder::new(&format!(r"(^|[^A-Za-z0-9_.\-])({alternation})"))
            .size_limit(size_limit)
            .dfa_size_limit(size_limit)
            .build()?;

        Ok(Some(Self {
            pattern,
            manifest: manifest.clone(),
        }))
    }

    /// Already-revisioned references are left alone, so rewriting twice
    /// equals rewriting once.
    pub fn rewrite<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, |caps: &Captures| {
            let key = &caps[2];
            let Some(revisioned) = self.manifest.get(key) else {
                return caps[0].to_string();
            };
            // `<digest>/app.js` still ends in the key `app.js`.
            let end = caps.get(2).map_or(0, |m| m.end());
            if text[..end].ends_with(revisioned) {
                return caps[0].to_string();
            }
            format!("{}{}", &caps[1], revisioned)
        })
    }
}

/// Outcome of a rewrite pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    pub scanned: usize,
    pub rewritten: usize,
}

/// Rewrite every file under `build_root` whose extension is listed in
/// `extensions`. The manifest file is never touched.
pub fn rewrite_references(
    build_root: &Path,
    manifest_path: &Path,
    manifest: &RevisionManifest,
    extensions: &[String],
) -> Result<RewriteReport> {
    let rewriter = Rewriter::new(manifest).with_context(|| {
        format!("failed to build rewrite pattern for {} keys", manifest.len())
    })?;
    let Some(rewriter) = rewriter else {
        crate::debug!("revisions"; "manifest is empty, nothing to rewrite");
        return Ok(RewriteReport::default());
    };
    if !build_root.is_dir() {
        return Ok(RewriteReport::default());
    }

    let files: Vec<PathBuf> = WalkDir::new(build_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| path != manifest_path && has_extension(path, extensions))
        .collect();

    let rewritten = files
        .par_iter()
        .map(|path| rewrite_file(&rewriter, path))
        .collect::<Result<Vec<bool>>>()?
        .into_iter()
        .filter(|changed| *changed)
        .count();

    Ok(RewriteReport {
        scanned: files.len(),
        rewritten,
    })
}

fn rewrite_file(rewriter: &Rewriter, path: &Path) -> Result<bool> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    // Binary files that merely carry a listed extension are skipped.
    let Ok(text) = std::str::from_utf8(&bytes) else {
        return Ok(false);
    };

    let Cow::Owned(updated) = rewriter.rewrite(text) else {
        return Ok(false);
    };
    if updated == text {
        return Ok(false);
    }

    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
    crate::debug!("revisions"; "rewrote {}", path.display());
    Ok(true)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
