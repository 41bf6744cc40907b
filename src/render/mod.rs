//! Document rendering.
//!
//! - [`TemplateCache`]: compiled templates keyed by path and content digest
//! - [`Renderer`]: body render plus optional layout pass
//! - [`VariantRenderer`]: pipeline stage rendering an object and its variants

mod cache;
mod context;
mod front_matter;
mod variant;

use std::path::PathBuf;

use thiserror::Error;

use crate::hooks::HookError;

pub use cache::{TEMPLATE_DIGEST_LENGTH, TemplateCache};
pub use context::PageContext;
pub use front_matter::split_front_matter;
pub use variant::{Renderer, VariantRenderer, load_templates};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error")]
    Template(#[from] tera::Error),

    #[error("invalid front matter")]
    FrontMatter(#[from] toml::de::Error),

    #[error("render hook failed")]
    Hook(#[from] HookError),

    #[error("failed to load templates from `{}`", .0.display())]
    Templates(PathBuf, #[source] tera::Error),
}

/// Error message followed by every underlying cause.
pub fn describe_error(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
