//! `[build.dirs]` stage source directories.

use crate::config::ConfigDiagnostics;
use crate::core::StageKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source directory of each asset stage, relative to `[build] source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    pub documents: PathBuf,
    pub files: PathBuf,
    pub images: PathBuf,
    pub scripts: PathBuf,
    pub styles: PathBuf,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            documents: "documents".into(),
            files: "files".into(),
            images: "images".into(),
            scripts: "scripts".into(),
            styles: "styles".into(),
        }
    }
}

impl DirsConfig {
    /// Directory for a stage (as configured, not yet joined with the source root).
    pub fn get(&self, kind: StageKind) -> &Path {
        match kind {
            StageKind::Documents => &self.documents,
            StageKind::Files => &self.files,
            StageKind::Images => &self.images,
            StageKind::Scripts => &self.scripts,
            StageKind::Styles => &self.styles,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for kind in StageKind::ALL {
            let dir = self.get(kind);
            if dir.is_absolute() {
                diag.error(
                    format!("build.dirs.{}", kind.name()),
                    format!("`{}` must be relative to the source root", dir.display()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_dirs_override_single_stage() {
        let config = test_parse_config("[build.dirs]\nstyles = \"css\"");
        assert_eq!(config.build.dirs.get(StageKind::Styles), Path::new("css"));
        assert_eq!(config.build.dirs.get(StageKind::Images), Path::new("images"));
    }

    #[test]
    fn test_dirs_reject_absolute() {
        let config = test_parse_config("[build.dirs]\nfiles = \"/tmp/files\"");
        let mut diag = ConfigDiagnostics::new();
        config.build.dirs.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "build.dirs.files");
    }
}
