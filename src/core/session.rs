//! Process-wide state of one build invocation.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::manifest::ManifestStore;
use crate::pipeline::ChangeCache;
use crate::render::TemplateCache;
use crate::site::{ConfigRegistry, ObjectRegistry};

/// Owns every cache and store the stages share.
///
/// Stages borrow what they need from the session; nothing lives in
/// module-level statics.
pub struct BuildSession {
    pub config: Arc<SiteConfig>,
    pub registry: Arc<ConfigRegistry>,
    pub templates: Arc<TemplateCache>,
    pub manifest: Arc<ManifestStore>,
    pub changes: Arc<ChangeCache>,
}

impl BuildSession {
    pub fn new(config: SiteConfig) -> Self {
        let registry = Arc::new(ConfigRegistry::new(&config));
        let manifest = Arc::new(ManifestStore::new(
            config.output_dir(),
            &config.build.revision.manifest,
        ));

        Self {
            config: Arc::new(config),
            registry,
            templates: Arc::new(TemplateCache::new()),
            manifest,
            changes: Arc::new(ChangeCache::new()),
        }
    }

    /// Registry as the trait object the resolver takes.
    ///
    /// A session always has a registry, so this is always `Some`. The
    /// resolver accepts `None` for pipelines assembled without a session,
    /// which fail with `PipelineError::MissingRegistry`.
    pub fn object_registry(&self) -> Option<Arc<dyn ObjectRegistry>> {
        let registry: Arc<dyn ObjectRegistry> = self.registry.clone();
        Some(registry)
    }

    /// Drop per-pass state before a build cycle.
    ///
    /// Objects are rebuilt and the manifest session restarts. Compiled
    /// templates survive; so do change digests unless caching is off or
    /// the build directory is being cleaned.
    pub fn begin_cycle(&self) {
        self.registry.clear();
        self.manifest.reset();

        if !self.config.build.cache {
            self.templates.clear();
        }
        if self.config.build.clean || !self.config.build.cache {
            self.changes.clear();
        }
    }

    /// Clear everything.
    pub fn reset(&self) {
        self.registry.clear();
        self.manifest.reset();
        self.templates.clear();
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::test_config_at;
    use crate::manifest::RevisionManifest;

    #[test]
    fn test_reset_clears_all() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = BuildSession::new(test_config_at(dir.path(), ""));

        let registry = session.object_registry().unwrap();
        registry.get_object(&dir.path().join("src/styles/a.css"));
        session.changes.changed("k".into(), b"x");
        session
            .manifest
            .flush(&[("a", "b")].into_iter().collect::<RevisionManifest>(), true)
            .unwrap();

        session.reset();
        assert_eq!(session.registry.len(), 0);
        assert_eq!(session.changes.len(), 0);
        assert!(session.manifest.session().is_empty());
        assert_eq!(session.manifest.load().len(), 1);
    }

    #[test]
    fn test_begin_cycle_keeps_change_digests_when_cached() {
        let session = BuildSession::new(test_config_at(Path::new("/site"), ""));
        session.changes.changed("k".into(), b"x");
        session.begin_cycle();
        assert_eq!(session.changes.len(), 1);
    }

    #[test]
    fn test_begin_cycle_without_cache() {
        let config = test_config_at(Path::new("/site"), "[build]\ncache = false");
        let session = BuildSession::new(config);
        session.changes.changed("k".into(), b"x");
        session.begin_cycle();
        assert_eq!(session.changes.len(), 0);
    }
}
