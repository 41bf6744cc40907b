//! `[[objects]]` site object declarations.
//!
//! Files without an entry still resolve to an implicit object (see
//! `site::registry`); entries override destination and flags per file.
//!
//! # Example
//!
//! ```toml
//! [[objects]]
//! source = "styles/main.css"      # relative to `[build] source`
//! destination = "css/main.css"    # relative to `[build] output`
//! revision = true
//! minify = true
//!
//! [[objects]]
//! source = "documents/index.html"
//! destination = "index.html"
//! layout = "default"              # templates/layouts/default.html
//! data = { title = "Home" }
//!
//! [objects.variants.mobile]
//! destination = "m/index.html"
//! layout = "mobile"
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ObjectHooksConfig;
use crate::config::ConfigDiagnostics;

/// A declared site object (or, nested under `variants`, one of its variants).
///
/// Unset flags inherit from the stage defaults; a variant inherits from
/// its parent object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectEntry {
    /// Source file, relative to the source root. Required on top-level entries.
    pub source: Option<PathBuf>,
    pub destination: Option<String>,
    pub revision: Option<bool>,
    pub output: Option<bool>,
    pub render: Option<bool>,
    pub layout: Option<String>,
    pub minify: Option<bool>,
    /// Free-form page data exposed to templates as `page.data`.
    pub data: toml::Table,
    pub hooks: ObjectHooksConfig,
    pub variants: BTreeMap<String, ObjectEntry>,
}

impl ObjectEntry {
    /// Validate a top-level entry at `objects[index]`.
    pub fn validate(&self, index: usize, diag: &mut ConfigDiagnostics) {
        let field = format!("objects[{index}]");

        match &self.source {
            None => diag.error(format!("{field}.source"), "object entry has no source path"),
            Some(source) if !is_plain_relative(source) => diag.error_with_hint(
                format!("{field}.source"),
                format!("`{}` must be relative to the source root", source.display()),
                "remove leading `/` and any `..` components",
            ),
            Some(_) => {}
        }

        self.validate_nested(&field, diag);
    }

    fn validate_nested(&self, field: &str, diag: &mut ConfigDiagnostics) {
        if let Some(destination) = &self.destination
            && (destination.is_empty() || !is_plain_relative(Path::new(destination)))
        {
            diag.error_with_hint(
                format!("{field}.destination"),
                format!("`{destination}` is not a relative destination"),
                "destinations are relative to `[build] output`",
            );
        }

        self.hooks.validate(field, diag);

        for (key, variant) in &self.variants {
            let variant_field = format!("{field}.variants.{key}");
            if variant.source.is_some() {
                diag.error(
                    format!("{variant_field}.source"),
                    "variants share their parent's source and cannot set one",
                );
            }
            if variant.destination.is_none() {
                diag.error(
                    format!("{variant_field}.destination"),
                    "a variant needs its own destination",
                );
            }
            variant.validate_nested(&variant_field, diag);
        }
    }
}

/// Relative path without `..`, root or prefix components.
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
