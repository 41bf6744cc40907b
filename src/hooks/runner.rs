//! Command-backed render hooks.
//!
//! Provides environment variable building and command execution for the
//! hooks declared on objects in `velvet.toml`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{HookError, RenderHooks};
use crate::config::{HookConfig, ObjectHooksConfig};
use crate::render::PageContext;

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$VELVET_*` environment variables for a hook run
pub fn build_velvet_vars(
    root: &Path,
    build_dir: &Path,
    page: &PageContext,
) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    vars.insert("VELVET_ROOT".into(), root.display().to_string());
    vars.insert("VELVET_BUILD_DIR".into(), build_dir.display().to_string());
    vars.insert("VELVET_SOURCE".into(), page.source.display().to_string());
    vars.insert("VELVET_DESTINATION".into(), page.destination.clone());
    vars.insert(
        "VELVET_VARIANT".into(),
        page.variant.clone().unwrap_or_default(),
    );

    vars
}

// ============================================================================
// Command Argument Resolution
// ============================================================================

/// Resolve `$VELVET_*` variables in command arguments
///
/// Longer names are substituted first so `$VELVET_ROOT` never clobbers a
/// longer variable sharing its prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, &vars[*key]);
            }
            result
        })
        .collect()
}

// ============================================================================
// Hook Execution
// ============================================================================

/// Hooks running external commands.
#[derive(Debug, Clone)]
pub struct CommandHooks {
    pre: Vec<HookConfig>,
    post: Vec<HookConfig>,
    root: PathBuf,
    build_dir: PathBuf,
}

impl CommandHooks {
    pub fn new(config: &ObjectHooksConfig, root: &Path, build_dir: &Path) -> Self {
        Self {
            pre: config.pre_render.iter().filter(|h| h.enable).cloned().collect(),
            post: config.post_render.iter().filter(|h| h.enable).cloned().collect(),
            root: root.to_path_buf(),
            build_dir: build_dir.to_path_buf(),
        }
    }

    /// Run one hook, feeding `stdin` if given. Returns captured stdout.
    async fn run(
        &self,
        hook: &HookConfig,
        page: &PageContext,
        phase: &str,
        stdin: Option<&[u8]>,
    ) -> Result<String, HookError> {
        let name = hook.display_name().to_string();
        let vars = build_velvet_vars(&self.root, &self.build_dir, page);
        let resolved = resolve_args(&hook.command, &vars);
        let Some((program, args)) = resolved.split_first() else {
            return Ok(String::new());
        };

        crate::debug!(phase; "`{}` for {}", name, page.destination);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .envs(&vars)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HookError::Spawn {
                name: name.clone(),
                source,
            })?;

        let input = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(bytes)) = (input, stdin) {
                // The hook may exit without reading its input.
                match pipe.write_all(bytes).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|source| HookError::Spawn {
            name: name.clone(),
            source,
        })?;
        fed.map_err(|source| HookError::Spawn {
            name: name.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(HookError::Failed {
                name,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !hook.quiet && !stdout.is_empty() {
            crate::log!(phase; "`{}` {}", name, stdout);
        }
        Ok(stdout)
    }
}

#[async_trait]
impl RenderHooks for CommandHooks {
    async fn pre_render(&self, page: &mut PageContext) -> Result<(), HookError> {
        for hook in &self.pre {
            let stdout = self.run(hook, page, "pre-render", None).await?;
            if stdout.starts_with('{') {
                let data: Map<String, Value> =
                    serde_json::from_str(&stdout).map_err(|source| HookError::InvalidOutput {
                        name: hook.display_name().to_string(),
                        source,
                    })?;
                page.data.extend(data);
            }
        }
        Ok(())
    }

    async fn post_render(&self, page: &PageContext, output: &str) -> Result<(), HookError> {
        for hook in &self.post {
            self.run(hook, page, "post-render", Some(output.as_bytes()))
                .await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageContext {
        PageContext::new(Path::new("/site/src/documents/index.html"), "index.html")
    }

    fn hook(command: &[&str]) -> HookConfig {
        HookConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            ..HookConfig::default()
        }
    }

    fn hooks(pre: Vec<HookConfig>, post: Vec<HookConfig>) -> CommandHooks {
        let config = ObjectHooksConfig {
            pre_render: pre,
            post_render: post,
        };
        CommandHooks::new(&config, &std::env::temp_dir(), Path::new("/site/build"))
    }

    #[test]
    fn test_resolve_args_simple() {
        let vars = build_velvet_vars(Path::new("/site"), Path::new("/site/build"), &page());
        let args = vec![
            "optimize".into(),
            "$VELVET_BUILD_DIR/$VELVET_DESTINATION".into(),
            "--root=$VELVET_ROOT".into(),
        ];

        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved[0], "optimize");
        assert_eq!(resolved[1], "/site/build/index.html");
        assert_eq!(resolved[2], "--root=/site");
    }

    #[test]
    fn test_resolve_args_no_vars() {
        let vars = FxHashMap::default();
        let args = vec!["echo".into(), "hello".into()];
        assert_eq!(resolve_args(&args, &vars), args);
    }

    #[test]
    fn test_variant_var_empty_for_default() {
        let vars = build_velvet_vars(Path::new("/"), Path::new("/b"), &page());
        assert_eq!(vars["VELVET_VARIANT"], "");
    }

    #[test]
    fn test_disabled_hooks_are_dropped() {
        let mut disabled = hook(&["false"]);
        disabled.enable = false;
        let hooks = hooks(vec![disabled], vec![]);
        assert!(hooks.pre.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pre_render_merges_json_stdout() {
        let hooks = hooks(
            vec![hook(&["sh", "-c", r#"echo '{"title": "From hook"}'"#])],
            vec![],
        );
        let mut page = page();
        hooks.pre_render(&mut page).await.unwrap();
        assert_eq!(page.data["title"], "From hook");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pre_render_sees_destination_env() {
        let hooks = hooks(
            vec![hook(&["sh", "-c", r#"printf '{"dest": "%s"}' "$VELVET_DESTINATION""#])],
            vec![],
        );
        let mut page = page();
        hooks.pre_render(&mut page).await.unwrap();
        assert_eq!(page.data["dest"], "index.html");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_render_receives_output_on_stdin() {
        let hooks = hooks(
            vec![],
            vec![hook(&["sh", "-c", "grep -q '<h1>hello</h1>'"])],
        );
        hooks
            .post_render(&page(), "<h1>hello</h1>")
            .await
            .unwrap();

        let err = hooks
            .post_render(&page(), "<h1>bye</h1>")
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_pre_render_reports_name() {
        let mut failing = hook(&["sh", "-c", "echo boom >&2; exit 3"]);
        failing.name = Some("fetch".into());
        let hooks = hooks(vec![failing], vec![]);

        let err = hooks.pre_render(&mut page()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fetch"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let hooks = hooks(vec![hook(&["velvet-no-such-program-9b1c"])], vec![]);
        let err = hooks.pre_render(&mut page()).await.unwrap_err();
        assert!(matches!(err, HookError::Spawn { .. }));
    }
}
