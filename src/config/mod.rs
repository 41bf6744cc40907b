//! Site configuration management for `velvet.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build], [build.dirs], [build.revision]
//! │   ├── hooks      # render hooks of an object
//! │   └── objects    # [[objects]]
//! ├── types/         # ConfigError, ConfigDiagnostics
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                         |
//! |--------------------|-------------------------------------------------|
//! | `[site]`           | Free-form table exposed to templates as `site`  |
//! | `[build]`          | Source/build/template paths, cache, minify      |
//! | `[build.dirs]`     | Source directory of each asset stage            |
//! | `[build.revision]` | Digest length/placement, manifest, rewrite pass |
//! | `[[objects]]`      | Explicit site objects and their variants        |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildSectionConfig, HashPlacement, HookConfig, ObjectEntry, ObjectHooksConfig, RevisionConfig,
};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    core::StageKind,
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing velvet.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site-wide template data
    #[serde(default)]
    pub site: toml::Table,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Explicit site objects
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = find_config_file(&cli.config)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = crate::utils::normalize_path(&config_path);

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.set_root(&root);
        config.normalize_paths();
        config.apply_command_options(cli);

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // paths
    // ========================================================================

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Source root (absolute after loading).
    pub fn source_dir(&self) -> &Path {
        &self.build.source
    }

    /// Build root (absolute after loading).
    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }

    /// Template directory (absolute after loading).
    pub fn templates_dir(&self) -> &Path {
        &self.build.templates
    }

    /// Source directory of an asset stage.
    pub fn stage_dir(&self, kind: StageKind) -> PathBuf {
        self.build.source.join(self.build.dirs.get(kind))
    }

    /// Path of the persisted revision manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.build.output.join(&self.build.revision.manifest)
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Normalize build paths relative to root directory.
    fn normalize_paths(&mut self) {
        let root = crate::utils::normalize_path(&self.root);
        self.set_root(&root);

        self.build.source = crate::utils::normalize_path(&root.join(&self.build.source));
        self.build.output = crate::utils::normalize_path(&root.join(&self.build.output));
        self.build.templates = crate::utils::normalize_path(&root.join(&self.build.templates));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Build { build_args } = &cli.command {
            self.apply_build_args(build_args);
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        self.build.clean = args.clean;
        if args.no_cache {
            self.build.cache = false;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        for (i, entry) in self.objects.iter().enumerate() {
            entry.validate(i, &mut diag);
        }
        self.validate_unique_sources(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Two entries for one source would make resolution order-dependent.
    fn validate_unique_sources(&self, diag: &mut ConfigDiagnostics) {
        let mut seen = rustc_hash::FxHashSet::default();
        for (i, entry) in self.objects.iter().enumerate() {
            if let Some(source) = &entry.source
                && !seen.insert(source)
            {
                diag.error(
                    format!("objects[{i}].source"),
                    format!("`{}` is declared more than once", source.display()),
                );
            }
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config with a minimal `[site]` table.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let config = format!("[site]\ntitle = \"Test\"\n{extra}");
    let (parsed, ignored) = SiteConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with absolute build paths, as `load` would produce.
#[cfg(test)]
pub fn test_config_at(root: &Path, extra: &str) -> SiteConfig {
    let mut config = test_parse_config(extra);
    config.set_root(root);
    config.build.source = root.join(&config.build.source);
    config.build.output = root.join(&config.build.output);
    config.build.templates = root.join(&config.build.templates);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[build\nsource = \"src\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_table_is_free_form() {
        let config = test_parse_config("author = \"Ada\"\n[site.social]\nmastodon = \"@ada\"");
        assert_eq!(config.site["title"].as_str(), Some("Test"));
        assert_eq!(config.site["author"].as_str(), Some("Ada"));
        assert!(config.site["social"].is_table());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[build]\nunknown_field = 1";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.iter().any(|f| f.contains("unknown_field")));
    }

    #[test]
    fn test_stage_dir_and_manifest_path() {
        let config = test_config_at(Path::new("/site"), "");
        assert_eq!(
            config.stage_dir(StageKind::Styles),
            PathBuf::from("/site/src/styles")
        );
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("/site/build/revision-manifest.json")
        );
        assert_eq!(
            config.root_relative("/site/src/a.css"),
            PathBuf::from("src/a.css")
        );
    }

    #[test]
    fn test_duplicate_sources_rejected() {
        let config = test_config_at(
            Path::new("/site"),
            r#"
[[objects]]
source = "styles/main.css"

[[objects]]
source = "styles/main.css"
"#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
