//! Render hooks.
//!
//! This module provides:
//! - `RenderHooks`: the capability every object variant exposes around rendering
//! - `NoHooks`: the default, for objects that declare no hooks
//! - `CommandHooks`: hooks backed by external commands from `velvet.toml`

mod runner;

use async_trait::async_trait;
use thiserror::Error;

use crate::render::PageContext;

pub use runner::{CommandHooks, build_velvet_vars, resolve_args};

/// Hook failures. Surfaced as a render failure of the variant.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook `{name}` could not be started")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hook `{name}` exited with {status}: {stderr}")]
    Failed {
        name: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("hook `{name}` printed invalid page data")]
    InvalidOutput {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Pre/post render capability of an object variant.
///
/// The renderer awaits `pre_render` before evaluating the template and
/// `post_render` before emitting the artifact.
#[async_trait]
pub trait RenderHooks: Send + Sync {
    /// May mutate the page context the template will see.
    async fn pre_render(&self, _page: &mut PageContext) -> Result<(), HookError> {
        Ok(())
    }

    async fn post_render(&self, _page: &PageContext, _output: &str) -> Result<(), HookError> {
        Ok(())
    }
}

/// Objects without hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

#[async_trait]
impl RenderHooks for NoHooks {}
