//! Revision manifest.
//!
//! Maps original destinations to revisioned destinations. Every asset stage
//! records into its own [`RevisionManifest`] and merge-flushes it through
//! the shared [`ManifestStore`]; the rewrite pass and deploy tooling read
//! the persisted union.
//!
//! ```json
//! {
//!   "css/main.css": "css/main.1f0e3dad99.css",
//!   "js/app.js": "js/app.8c5f2a9b41.js"
//! }
//! ```

mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use store::{ManifestStore, load_manifest};

/// Default manifest file name, relative to the build root.
pub const MANIFEST_FILE: &str = "revision-manifest.json";

/// Original destination -> revisioned destination.
///
/// Keys are kept sorted so identical entries serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionManifest(BTreeMap<String, String>);

impl RevisionManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry. A later entry for the same key wins.
    pub fn record(&mut self, original: impl Into<String>, revisioned: impl Into<String>) {
        self.0.insert(original.into(), revisioned.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.0.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: &RevisionManifest) {
        self.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RevisionManifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_entry_wins() {
        let mut manifest = RevisionManifest::new();
        manifest.record("a.css", "a.1.css");
        manifest.record("a.css", "a.2.css");
        assert_eq!(manifest.get("a.css"), Some("a.2.css"));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_json_keys_sorted() {
        let manifest: RevisionManifest = [("z.js", "z.1.js"), ("a.css", "a.1.css")]
            .into_iter()
            .collect();
        let json = manifest.to_json().unwrap();
        assert!(json.find("a.css").unwrap() < json.find("z.js").unwrap());
    }

    #[test]
    fn test_merge_overlays() {
        let mut base: RevisionManifest = [("a", "a1"), ("b", "b1")].into_iter().collect();
        let top: RevisionManifest = [("b", "b2"), ("c", "c1")].into_iter().collect();
        base.merge(&top);
        let entries: Vec<_> = base.entries().collect();
        assert_eq!(entries, vec![("a", "a1"), ("b", "b2"), ("c", "c1")]);
    }
}
