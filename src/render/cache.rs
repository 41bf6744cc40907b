//! Compiled template cache.
//!
//! One entry per source path, tagged with the digest of the source it was
//! compiled from. A render with different source bytes recompiles and
//! replaces the entry; identical bytes reuse it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tera::Tera;

use crate::pipeline::digest;

/// Hex digits of the content digest tagging each entry.
pub const TEMPLATE_DIGEST_LENGTH: usize = 12;

#[derive(Debug)]
struct CacheEntry {
    digest: String,
    template: Arc<Tera>,
}

#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: DashMap<PathBuf, CacheEntry>,
    compiles: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled form of `source`, registered as `name` on top of `env`.
    pub fn get_or_compile(
        &self,
        path: &Path,
        name: &str,
        source: &str,
        env: &Tera,
    ) -> Result<Arc<Tera>, tera::Error> {
        let digest = digest(source.as_bytes(), TEMPLATE_DIGEST_LENGTH);

        if let Some(entry) = self.entries.get(path)
            && entry.digest == digest
        {
            crate::debug!("render"; "cache hit {}:{}", name, digest);
            return Ok(Arc::clone(&entry.template));
        }

        let template = Arc::new(compile(name, source, env)?);
        self.compiles.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                digest,
                template: Arc::clone(&template),
            },
        );
        Ok(template)
    }

    /// Number of compilations performed through the cache.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Compile `source` as template `name`, with layouts and partials of `env`
/// available to it.
pub fn compile(name: &str, source: &str, env: &Tera) -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.extend(env)?;
    tera.add_raw_template(name, source)?;
    Ok(tera)
}
