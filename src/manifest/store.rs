//! Persisted manifest store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::RevisionManifest;

/// Owner of the persisted manifest for one build root.
///
/// Read-merge-write cycles are serialized through one lock, so stages
/// flushing concurrently still converge on the union of their entries.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    flush_lock: Mutex<()>,
    /// Everything flushed since the last `reset`.
    session: Mutex<RevisionManifest>,
}

impl ManifestStore {
    pub fn new(build_root: &Path, file_name: &str) -> Self {
        Self {
            path: build_root.join(file_name),
            flush_lock: Mutex::new(()),
            session: Mutex::new(RevisionManifest::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `manifest`.
    ///
    /// With `merge`, entries already on disk are kept and `manifest`
    /// overlays them. A missing or corrupt file counts as empty. Without
    /// `merge`, the file is overwritten. Returns what was written.
    pub fn flush(&self, manifest: &RevisionManifest, merge: bool) -> io::Result<RevisionManifest> {
        let _guard = self.flush_lock.lock();

        let mut merged = if merge {
            load_manifest(&self.path)
        } else {
            RevisionManifest::new()
        };
        merged.merge(manifest);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = merged.to_json()?;
        if file_content_matches(&self.path, &json) {
            crate::debug!("manifest"; "unchanged, skipping write");
        } else {
            fs::write(&self.path, &json)?;
            crate::debug!("manifest"; "saved {} entries", merged.len());
        }

        self.session.lock().merge(manifest);
        Ok(merged)
    }

    /// Persisted manifest, empty when missing or unreadable.
    pub fn load(&self) -> RevisionManifest {
        let _guard = self.flush_lock.lock();
        load_manifest(&self.path)
    }

    /// Entries flushed since the last reset.
    pub fn session(&self) -> RevisionManifest {
        self.session.lock().clone()
    }

    pub fn reset(&self) {
        self.session.lock().clear();
    }
}

/// Read a manifest file. Never fails: problems yield an empty manifest.
pub fn load_manifest(path: &Path) -> RevisionManifest {
    let Ok(json) = fs::read_to_string(path) else {
        return RevisionManifest::new();
    };
    if json.trim().is_empty() {
        return RevisionManifest::new();
    }

    serde_json::from_str(&json).unwrap_or_else(|e| {
        crate::log!("manifest"; "ignoring unreadable {}: {}", path.display(), e);
        RevisionManifest::new()
    })
}

fn file_content_matches(path: &Path, content: &str) -> bool {
    fs::read_to_string(path).is_ok_and(|existing| existing == content)
}
