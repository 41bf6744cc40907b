//! Asset stage kinds.

use std::fmt;
use std::path::Path;

/// One of the fixed, independently built asset stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Templates rendered into pages (documents may fan out into variants).
    Documents,
    /// Files copied as-is.
    Files,
    Images,
    Scripts,
    Styles,
}

impl StageKind {
    /// Stages in build order.
    pub const ALL: [Self; 5] = [
        Self::Documents,
        Self::Files,
        Self::Images,
        Self::Scripts,
        Self::Styles,
    ];

    /// Display name, also the log prefix and config key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Files => "files",
            Self::Images => "images",
            Self::Scripts => "scripts",
            Self::Styles => "styles",
        }
    }

    /// File extensions collected by this stage (`None` = every file).
    pub fn extensions(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Documents => Some(&["html", "htm", "xml", "txt", "json"]),
            Self::Files => None,
            Self::Images => Some(&["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico"]),
            Self::Scripts => Some(&["js", "mjs"]),
            Self::Styles => Some(&["css"]),
        }
    }

    /// Check if a path is collected by this stage.
    pub fn accepts(self, path: &Path) -> bool {
        let Some(extensions) = self.extensions() else {
            return true;
        };
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }

    /// Whether implicit objects of this stage are revisioned.
    ///
    /// Documents are entry points; their names must stay stable.
    pub fn revisions_by_default(self) -> bool {
        !matches!(self, Self::Documents)
    }

    /// Whether implicit objects of this stage are evaluated as templates.
    pub fn renders(self) -> bool {
        matches!(self, Self::Documents)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_by_extension() {
        assert!(StageKind::Styles.accepts(Path::new("styles/main.css")));
        assert!(StageKind::Styles.accepts(Path::new("styles/MAIN.CSS")));
        assert!(!StageKind::Styles.accepts(Path::new("styles/main.scss")));
        assert!(StageKind::Scripts.accepts(Path::new("app.min.js")));
        assert!(!StageKind::Images.accepts(Path::new("images/README")));
    }

    #[test]
    fn test_files_accept_everything() {
        assert!(StageKind::Files.accepts(Path::new("files/robots.txt")));
        assert!(StageKind::Files.accepts(Path::new("files/CNAME")));
    }

    #[test]
    fn test_stage_defaults() {
        assert!(!StageKind::Documents.revisions_by_default());
        assert!(StageKind::ALL[1..].iter().all(|k| k.revisions_by_default()));
        assert!(StageKind::Documents.renders());
        assert!(!StageKind::Styles.renders());
        assert_eq!(StageKind::Images.to_string(), "images");
    }
}
