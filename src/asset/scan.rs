//! Stage input collection.

use std::path::PathBuf;

use jwalk::WalkDir;

use crate::config::SiteConfig;
use crate::core::StageKind;
use crate::site::ConfigRegistry;

/// Files built by `kind`, sorted by path.
///
/// A file belongs to the innermost stage directory containing it. Within
/// that directory the stage takes the extensions it accepts, plus every
/// file an `[[objects]]` entry declares.
pub fn collect_stage_files(
    config: &SiteConfig,
    kind: StageKind,
    registry: &ConfigRegistry,
) -> Vec<PathBuf> {
    let dir = config.stage_dir(kind);
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| registry.stage_of(path) == Some(kind))
        .filter(|path| kind.accepts(path) || registry.is_explicit(path))
        .collect()
}
