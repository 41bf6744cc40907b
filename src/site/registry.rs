//! Registry backed by `velvet.toml`.
//!
//! Resolution order for an absolute source path:
//!
//! 1. an `[[objects]]` entry whose `source` equals the path relative to
//!    the source root
//! 2. an implicit object, when the path lies in a stage directory and the
//!    stage accepts its extension
//! 3. nothing: the file is not a site object

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::{ObjectRef, ObjectRegistry, SiteObject};
use crate::config::{ObjectEntry, SiteConfig};
use crate::core::StageKind;
use crate::hooks::{CommandHooks, RenderHooks};
use crate::utils::to_slash;

pub struct ConfigRegistry {
    root: PathBuf,
    source: PathBuf,
    output: PathBuf,
    stage_dirs: Vec<(StageKind, PathBuf)>,
    entries: FxHashMap<PathBuf, ObjectEntry>,
    revision_enabled: bool,
    minify: bool,
    /// Objects handed out this pass.
    objects: DashMap<PathBuf, ObjectRef>,
}

impl ConfigRegistry {
    pub fn new(config: &SiteConfig) -> Self {
        let entries = config
            .objects
            .iter()
            .filter_map(|entry| Some((entry.source.clone()?, entry.clone())))
            .collect();

        // Longest first, so nested stage directories win.
        let mut stage_dirs: Vec<_> = StageKind::ALL
            .iter()
            .map(|&kind| (kind, config.stage_dir(kind)))
            .collect();
        stage_dirs.sort_by_key(|(_, dir)| std::cmp::Reverse(dir.components().count()));

        Self {
            root: config.get_root().to_path_buf(),
            source: config.source_dir().to_path_buf(),
            output: config.output_dir().to_path_buf(),
            stage_dirs,
            entries,
            revision_enabled: config.build.revision.enable,
            minify: config.build.minify,
            objects: DashMap::new(),
        }
    }

    /// Stage whose directory contains `path`.
    pub fn stage_of(&self, path: &Path) -> Option<StageKind> {
        self.stage_dirs
            .iter()
            .find(|(_, dir)| path.starts_with(dir))
            .map(|(kind, _)| *kind)
    }

    /// Whether an `[[objects]]` entry declares `path`.
    pub fn is_explicit(&self, path: &Path) -> bool {
        path.strip_prefix(&self.source)
            .is_ok_and(|relative| self.entries.contains_key(relative))
    }

    /// Number of objects resolved this pass.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Forget resolved objects. The next pass builds fresh ones.
    pub fn clear(&self) {
        self.objects.clear();
    }

    fn build(&self, path: &Path) -> Option<SiteObject> {
        let relative = path.strip_prefix(&self.source).ok()?;
        let kind = self.stage_of(path);

        if let Some(entry) = self.entries.get(relative) {
            let base = self.implicit(kind, path, relative);
            return Some(self.from_entry(entry, base));
        }

        let kind = kind.filter(|kind| kind.accepts(path))?;
        Some(self.implicit(Some(kind), path, relative))
    }

    /// Defaults for a file of `kind`.
    fn implicit(&self, kind: Option<StageKind>, path: &Path, relative: &Path) -> SiteObject {
        let destination = match kind {
            // Pages land at the site root.
            Some(StageKind::Documents) => self
                .stage_dirs
                .iter()
                .find(|(k, _)| *k == StageKind::Documents)
                .and_then(|(_, dir)| path.strip_prefix(dir).ok())
                .map_or_else(|| to_slash(relative), to_slash),
            _ => to_slash(relative),
        };

        let mut object = SiteObject::new(destination)
            .with_revision(
                self.revision_enabled && kind.is_some_and(StageKind::revisions_by_default),
            )
            .with_render(kind.is_some_and(StageKind::renders));
        object.minify = self.minify && matches!(kind, Some(StageKind::Scripts | StageKind::Styles));
        object
    }

    /// Overlay `entry` on `base`. Variants overlay their parent.
    fn from_entry(&self, entry: &ObjectEntry, mut object: SiteObject) -> SiteObject {
        if let Some(destination) = &entry.destination {
            object.destination.clone_from(destination);
        }
        if let Some(revision) = entry.revision {
            object.revision = revision;
        }
        if let Some(output) = entry.output {
            object.output = output;
        }
        if let Some(render) = entry.render {
            object.render = render;
        }
        if let Some(minify) = entry.minify {
            object.minify = minify;
        }
        if entry.layout.is_some() {
            object.layout.clone_from(&entry.layout);
        }
        object.data.extend(table_to_map(&entry.data));
        if !entry.hooks.is_empty() {
            let hooks: Arc<dyn RenderHooks> =
                Arc::new(CommandHooks::new(&entry.hooks, &self.root, &self.output));
            object.hooks = hooks;
        }

        let parent = SiteObject {
            variants: Default::default(),
            ..object.clone()
        };
        for (key, variant) in &entry.variants {
            object = object.with_variant(key, self.from_entry(variant, parent.clone()));
        }
        object
    }
}

impl ObjectRegistry for ConfigRegistry {
    fn get_object(&self, path: &Path) -> Option<ObjectRef> {
        if let Some(object) = self.objects.get(path) {
            return Some(Arc::clone(&object));
        }

        let object = self.build(path)?.into_ref();
        self.objects.insert(path.to_path_buf(), Arc::clone(&object));
        Some(object)
    }
}

fn table_to_map(table: &toml::Table) -> Map<String, Value> {
    match serde_json::to_value(table) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
