//! Render hooks configuration.
//!
//! # Example
//!
//! ```toml
//! [[objects]]
//! source = "documents/index.html"
//!
//! # Runs before the template is evaluated. A JSON object printed on
//! # stdout is merged into `page.data`.
//! [[objects.hooks.pre_render]]
//! command = ["./scripts/fetch-data.sh", "$VELVET_DESTINATION"]
//!
//! # Runs after rendering, with the rendered output on stdin.
//! [[objects.hooks.post_render]]
//! command = ["./scripts/check-links.sh"]
//! quiet = false
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

/// Hooks wrapped around each render of an object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectHooksConfig {
    /// Commands run before template evaluation.
    pub pre_render: Vec<HookConfig>,
    /// Commands run after template evaluation, before the artifact is emitted.
    pub post_render: Vec<HookConfig>,
}

impl ObjectHooksConfig {
    pub fn is_empty(&self) -> bool {
        self.pre_render.iter().all(|h| !h.enable) && self.post_render.iter().all(|h| !h.enable)
    }

    pub fn validate(&self, field: &str, diag: &mut ConfigDiagnostics) {
        let phases = [("pre_render", &self.pre_render), ("post_render", &self.post_render)];
        for (phase, hooks) in phases {
            for (i, hook) in hooks.iter().enumerate() {
                if hook.enable && hook.command.is_empty() {
                    diag.error_with_hint(
                        format!("{field}.hooks.{phase}[{i}].command"),
                        "hook command is empty",
                        "set `command = [\"program\", \"arg\"]` or `enable = false`",
                    );
                }
            }
        }
    }
}

/// Configuration for a single hook command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Whether this hook is enabled (default: true).
    pub enable: bool,

    /// Display name for logging (defaults to command[0]).
    pub name: Option<String>,

    /// Command and arguments to execute.
    /// Supports `$VELVET_*` variable substitution.
    pub command: Vec<String>,

    /// Suppress output (default: true).
    pub quiet: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            enable: true,
            name: None,
            command: Vec::new(),
            quiet: true,
        }
    }
}

impl HookConfig {
    /// Returns `name` if set, otherwise falls back to `command[0]`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.command.first().map(String::as_str).unwrap_or("hook"))
    }
}
