//! Small path and formatting helpers.

use std::path::{Component, Path, PathBuf};

/// `path` with `/` separators, as used for destinations and template names.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute form of `path`.
///
/// Canonicalizes when the path exists, otherwise joins relative paths onto
/// the working directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// `plural_count(1, "file")` -> `"1 file"`, `plural_count(3, "file")` -> `"3 files"`.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("css/main.css")), "css/main.css");
        assert_eq!(to_slash(Path::new("./a/b")), "a/b");
        assert_eq!(to_slash(Path::new("")), "");
    }

    #[test]
    fn test_normalize_path_is_absolute() {
        assert!(normalize_path(Path::new("relative/file.txt")).is_absolute());
        assert_eq!(
            normalize_path(Path::new("/no/such/velvet/path")),
            PathBuf::from("/no/such/velvet/path")
        );
    }

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "file"), "1 file");
        assert_eq!(plural_count(5, "file"), "5 files");
    }
}
