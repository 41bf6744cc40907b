//! `velvet clean`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Remove everything inside `dir`, keeping the directory itself.
pub fn clean_output(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("failed to remove {}", path.display()))?;
        removed += 1;
    }

    crate::debug!("clean"; "removed {} entries from {}", removed, dir.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/a.css"), "").unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        assert_eq!(clean_output(dir.path()).unwrap(), 2);
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_output(&dir.path().join("nope")).unwrap(), 0);
    }
}
