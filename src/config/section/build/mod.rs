//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"              # Source root (object keys are relative to it)
//! output = "build"            # Build root (the revision manifest lives here)
//! templates = "templates"     # Layouts and partials for documents
//! cache = true                # Reuse compiled templates across rebuilds
//! minify = false              # Default minify flag for scripts and styles
//!
//! [build.dirs]
//! styles = "css"              # Stage directories, relative to `source`
//!
//! [build.revision]
//! length = 8
//! ```
//!
//! See submodules for detailed options: [`dirs`], [`revision`].

mod dirs;
mod revision;

pub use dirs::DirsConfig;
pub use revision::{HashPlacement, RevisionConfig};

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Source root directory.
    pub source: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Template directory (layouts, partials).
    pub templates: PathBuf,

    /// Template render cache.
    pub cache: bool,

    /// Minify scripts and styles unless an object says otherwise.
    pub minify: bool,

    /// Clean build directory before building (CLI only).
    #[serde(skip)]
    pub clean: bool,

    /// Per-stage source directories.
    pub dirs: DirsConfig,

    /// Content hashing and manifest settings.
    pub revision: RevisionConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "build".into(),
            templates: "templates".into(),
            cache: true,
            minify: false,
            clean: false,
            dirs: DirsConfig::default(),
            revision: RevisionConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    /// Validate build configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.source == self.output {
            diag.error_with_hint(
                "build.output",
                "build output must differ from the source root",
                "the build directory is cleaned with `--clean`",
            );
        }
        self.dirs.validate(diag);
        self.revision.validate(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.source, PathBuf::from("src"));
        assert_eq!(config.build.output, PathBuf::from("build"));
        assert!(config.build.cache);
        assert!(!config.build.minify);
        assert!(!config.build.clean);
    }

    #[test]
    fn test_build_overrides() {
        let config = test_parse_config(
            r#"
[build]
source = "site"
output = "dist"
cache = false
minify = true
"#,
        );
        assert_eq!(config.build.source, PathBuf::from("site"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.cache);
        assert!(config.build.minify);
    }

    #[test]
    fn test_validate_same_source_and_output() {
        let config = test_parse_config(
            r#"
[build]
source = "site"
output = "site"
"#,
        );
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "build.output");
    }
}
