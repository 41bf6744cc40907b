//! Site objects and the registry resolving files to them.

mod object;
mod registry;

use std::path::Path;

pub use object::{ObjectRef, SiteObject};
pub use registry::ConfigRegistry;

/// Maps source files to site objects.
///
/// Must be consistent within one build pass: a path resolves to the same
/// shared object every time it is asked for.
pub trait ObjectRegistry: Send + Sync {
    fn get_object(&self, path: &Path) -> Option<ObjectRef>;
}
