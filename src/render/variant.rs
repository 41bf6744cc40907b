//! Variant rendering.
//!
//! Every renderable record yields one artifact per variant plus one for the
//! object itself. All of them render concurrently, each wrapped in its own
//! hooks, and the record only succeeds once all of them have.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use jwalk::WalkDir;
use owo_colors::OwoColorize;
use serde_json::Value;
use tera::{Context, Tera};

use super::cache::compile;
use super::{PageContext, RenderError, TemplateCache, describe_error, split_front_matter};
use crate::pipeline::{FileRecord, PipelineError, Stage};
use crate::site::ObjectRef;
use crate::utils::to_slash;

/// Load every file under `dir` as a named template (`layouts/default.html`).
///
/// A missing directory yields an empty environment.
pub fn load_templates(dir: &Path) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);

    if !dir.is_dir() {
        return Ok(tera);
    }

    let files: Vec<(PathBuf, Option<String>)> = WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.path();
            let name = to_slash(path.strip_prefix(dir).unwrap_or(&path));
            (path, Some(name))
        })
        .collect();

    crate::debug!("render"; "loaded {} templates", files.len());
    tera.add_template_files(files)
        .map_err(|e| RenderError::Templates(dir.to_path_buf(), e))?;
    Ok(tera)
}

/// Two-pass template renderer.
pub struct Renderer {
    env: Tera,
    site: Value,
    cache: Arc<TemplateCache>,
    cache_enabled: bool,
}

impl Renderer {
    pub fn new(
        env: Tera,
        site: &toml::Table,
        cache: Arc<TemplateCache>,
        cache_enabled: bool,
    ) -> Self {
        Self {
            env,
            site: serde_json::to_value(site).unwrap_or_default(),
            cache,
            cache_enabled,
        }
    }

    /// Render `source` for `page`, then place the result in the page's
    /// layout if it has one.
    pub fn render(
        &self,
        path: &Path,
        name: &str,
        source: &str,
        page: &PageContext,
    ) -> Result<String, RenderError> {
        let template = if self.cache_enabled {
            self.cache.get_or_compile(path, name, source, &self.env)?
        } else {
            Arc::new(compile(name, source, &self.env)?)
        };

        let mut context = Context::new();
        context.insert("page", page);
        context.insert("site", &self.site);

        let body = template.render(name, &context)?;
        let Some(layout) = &page.layout else {
            return Ok(body);
        };

        context.insert("content", &body);
        Ok(template.render(&format!("layouts/{layout}.html"), &context)?)
    }
}

/// Pipeline stage rendering documents.
pub struct VariantRenderer {
    renderer: Arc<Renderer>,
}

impl VariantRenderer {
    pub fn new(renderer: Arc<Renderer>) -> Self {
        Self { renderer }
    }

    async fn render_variant(
        &self,
        record: &FileRecord,
        object: &ObjectRef,
        front_matter: Option<&toml::Table>,
        body: &str,
    ) -> Result<FileRecord, RenderError> {
        let source = record.source();
        let (mut page, hooks) = {
            let object = object.read();
            (PageContext::for_object(source, &object), Arc::clone(&object.hooks))
        };
        if let Some(table) = front_matter {
            apply_front_matter(&mut page, table);
        }

        hooks.pre_render(&mut page).await?;
        let name = to_slash(&record.relative());
        let rendered = self.renderer.render(source, &name, body, &page)?;
        hooks.post_render(&page, &rendered).await?;

        Ok(FileRecord::new(
            record.base.join(&page.destination),
            &record.base,
            rendered,
        ))
    }
}

/// Front matter keys become page data; `layout` also picks the layout.
fn apply_front_matter(page: &mut PageContext, table: &toml::Table) {
    if let Some(layout) = table.get("layout").and_then(toml::Value::as_str) {
        page.layout = Some(layout.to_string());
    }
    if let Ok(Value::Object(data)) = serde_json::to_value(table) {
        page.data.extend(data);
    }
}

/// Log a failed render with the path relative to the working directory.
fn report_failure(path: &Path, error: &RenderError) {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf());
    crate::log!("render"; "{}\n{}", relative.display().underline(), describe_error(error));
}

#[async_trait]
impl Stage for VariantRenderer {
    fn name(&self) -> &'static str {
        "render"
    }

    async fn process(&self, record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("render", &record.path));
        }
        let (Some(object), Some(bytes)) = (record.object.clone(), record.contents.as_bytes()) else {
            return Ok(vec![record]);
        };

        let targets = {
            let guard = object.read();
            if !guard.output {
                return Ok(vec![]);
            }
            if !guard.render {
                return Ok(vec![record]);
            }
            let mut targets = guard.variants_depth_first();
            targets.push(Arc::clone(&object));
            targets
        };

        let text = String::from_utf8_lossy(bytes).into_owned();
        let path = record.source().to_path_buf();
        let fail = |source: RenderError| {
            report_failure(&path, &source);
            PipelineError::Render {
                path: path.clone(),
                source,
            }
        };

        let (front_matter, body) = split_front_matter(&text).map_err(|e| fail(e.into()))?;

        let renders = targets
            .iter()
            .map(|target| self.render_variant(&record, target, front_matter.as_ref(), body));
        let results = join_all(renders).await;

        results.into_iter().collect::<Result<Vec<_>, _>>().map_err(fail)
    }
}
