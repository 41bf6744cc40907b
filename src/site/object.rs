//! Site object descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::hooks::{NoHooks, RenderHooks};

/// Shared handle to a site object.
///
/// Records carrying the same object observe each other's mutations
/// (the hasher rewrites `destination` in place).
pub type ObjectRef = Arc<RwLock<SiteObject>>;

/// Logical descriptor bound to a source file.
#[derive(Clone)]
pub struct SiteObject {
    /// Target path relative to the build root.
    pub destination: String,
    /// Whether this object participates in content hashing.
    pub revision: bool,
    /// Objects with `output = false` emit nothing from the renderer.
    pub output: bool,
    /// Evaluate the contents as a template.
    pub render: bool,
    /// Layout wrapped around the rendered body (`layouts/<name>.html`).
    pub layout: Option<String>,
    pub minify: bool,
    /// Page data exposed to templates.
    pub data: Map<String, Value>,
    /// Variant key (`None` for the default object).
    pub key: Option<String>,
    /// Named variants, iterated in key order.
    pub variants: BTreeMap<String, ObjectRef>,
    /// Content digest, set once the bytes are final.
    pub hash: Option<String>,
    /// Destination before the digest was injected.
    pub original_destination: Option<String>,
    pub hooks: Arc<dyn RenderHooks>,
}

impl SiteObject {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            revision: false,
            output: true,
            render: false,
            layout: None,
            minify: false,
            data: Map::new(),
            key: None,
            variants: BTreeMap::new(),
            hash: None,
            original_destination: None,
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_revision(mut self, revision: bool) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn with_output(mut self, output: bool) -> Self {
        self.output = output;
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RenderHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Add a variant under `key`.
    pub fn with_variant(mut self, key: impl Into<String>, mut variant: SiteObject) -> Self {
        let key = key.into();
        variant.key = Some(key.clone());
        self.variants.insert(key, variant.into_ref());
        self
    }

    pub fn into_ref(self) -> ObjectRef {
        Arc::new(RwLock::new(self))
    }

    /// Destination the object was declared with, ignoring any revisioning.
    pub fn base_destination(&self) -> &str {
        self.original_destination
            .as_deref()
            .unwrap_or(&self.destination)
    }

    /// Every variant below this object, depth-first in key order.
    pub fn variants_depth_first(&self) -> Vec<ObjectRef> {
        let mut out = Vec::new();
        collect_variants(self, &mut out);
        out
    }
}

fn collect_variants(object: &SiteObject, out: &mut Vec<ObjectRef>) {
    for variant in object.variants.values() {
        out.push(Arc::clone(variant));
        collect_variants(&variant.read(), out);
    }
}

impl fmt::Debug for SiteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteObject")
            .field("destination", &self.destination)
            .field("revision", &self.revision)
            .field("output", &self.output)
            .field("render", &self.render)
            .field("layout", &self.layout)
            .field("key", &self.key)
            .field("variants", &self.variants.keys().collect::<Vec<_>>())
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_keys_are_recorded() {
        let object = SiteObject::new("index.html")
            .with_variant("mobile", SiteObject::new("m/index.html"))
            .with_variant("amp", SiteObject::new("amp/index.html"));

        let keys: Vec<_> = object.variants.keys().cloned().collect();
        assert_eq!(keys, vec!["amp", "mobile"]);
        assert_eq!(
            object.variants["mobile"].read().key.as_deref(),
            Some("mobile")
        );
        assert!(object.key.is_none());
    }

    #[test]
    fn test_variants_may_nest() {
        let object = SiteObject::new("a.html").with_variant(
            "print",
            SiteObject::new("print/a.html").with_variant("mono", SiteObject::new("mono/a.html")),
        );
        let print = object.variants["print"].read();
        assert_eq!(print.variants["mono"].read().destination, "mono/a.html");
    }

    #[test]
    fn test_variants_depth_first_order() {
        let object = SiteObject::new("a.html")
            .with_variant(
                "print",
                SiteObject::new("print/a.html")
                    .with_variant("mono", SiteObject::new("mono/a.html")),
            )
            .with_variant("amp", SiteObject::new("amp/a.html"));

        let order: Vec<_> = object
            .variants_depth_first()
            .iter()
            .map(|v| v.read().destination.clone())
            .collect();
        assert_eq!(order, vec!["amp/a.html", "print/a.html", "mono/a.html"]);
    }

    #[test]
    fn test_base_destination_ignores_revision() {
        let mut object = SiteObject::new("css/main.css");
        assert_eq!(object.base_destination(), "css/main.css");

        object.original_destination = Some("css/main.css".into());
        object.destination = "css/main.0123456789.css".into();
        assert_eq!(object.base_destination(), "css/main.css");
    }
}
