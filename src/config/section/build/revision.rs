//! `[build.revision]` content hashing settings.
//!
//! # Example
//!
//! ```toml
//! [build.revision]
//! enable = true                       # Revision implicit objects of asset stages
//! length = 10                         # Hex digits embedded in file names
//! placement = "extension"             # name.<digest>.ext | <digest>/name.ext
//! separator = "."                     # Joins stem and digest for "extension"
//! manifest = "revision-manifest.json" # Relative to the build root
//! rewrite = ["html", "css", "js"]     # Extensions scanned by the rewrite pass
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

/// Longest digest we can embed (blake3 hex output).
pub const MAX_DIGEST_LENGTH: usize = 64;
const MIN_DIGEST_LENGTH: usize = 4;

/// Where the digest goes in a revisioned destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPlacement {
    /// `css/main.css` -> `css/main.<digest>.css`
    #[default]
    Extension,
    /// `css/main.css` -> `css/<digest>/main.css`
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionConfig {
    pub enable: bool,
    pub length: usize,
    pub placement: HashPlacement,
    pub separator: String,
    pub manifest: String,
    pub rewrite: Vec<String>,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            enable: true,
            length: 10,
            placement: HashPlacement::Extension,
            separator: ".".into(),
            manifest: crate::manifest::MANIFEST_FILE.into(),
            rewrite: vec!["html".into(), "css".into(), "js".into()],
        }
    }
}

impl RevisionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(MIN_DIGEST_LENGTH..=MAX_DIGEST_LENGTH).contains(&self.length) {
            diag.error(
                "build.revision.length",
                format!(
                    "digest length {} is outside {MIN_DIGEST_LENGTH}..={MAX_DIGEST_LENGTH}",
                    self.length
                ),
            );
        }

        if self.placement == HashPlacement::Extension
            && (self.separator.is_empty() || self.separator.contains(['/', '\\']))
        {
            diag.error_with_hint(
                "build.revision.separator",
                format!("invalid separator `{}`", self.separator),
                "use a non-empty separator without path characters, e.g. \".\" or \"-\"",
            );
        }

        if self.manifest.is_empty()
            || self.manifest.starts_with('/')
            || self.manifest.contains("..")
        {
            diag.error(
                "build.revision.manifest",
                "manifest must be a relative path inside the build root",
            );
        }
    }
}
