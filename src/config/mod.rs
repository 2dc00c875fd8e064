//! Project configuration management for `gh-pages-multi.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   └── deploy     # [deploy] and [deploy.commit]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The file is optional. Values are layered as CLI flag > config file >
//! built-in default. Relative paths from the file resolve against the file's
//! directory, relative paths from the command line against the current one.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{CommitConfig, DeployConfig, History};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::DeployArgs,
    deploy::DeployRequest,
    embed::index::{self, INDEX_HTML},
    log,
    logger::Logger,
    utils::{
        git::{Git, Identity},
        path::{normalize_path, resolve_path},
        remote::default_title,
    },
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Config file searched for when `-C` is not given.
pub const CONFIG_FILE: &str = "gh-pages-multi.toml";

/// Index title when neither the flag, the file nor the remote provides one.
const FALLBACK_TITLE: &str = "gh-pages-multi";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing gh-pages-multi.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Base for relative paths in the file: its directory, else cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Deployment settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

impl ProjectConfig {
    /// Load configuration for a deploy run from the current directory.
    pub fn load(explicit: Option<&Path>, args: &DeployArgs, logger: Logger) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(&cwd, explicit, args, logger)
    }

    /// Load configuration as if invoked from `cwd`.
    ///
    /// An explicit config path must exist; the default file is optional.
    pub fn load_from(
        cwd: &Path,
        explicit: Option<&Path>,
        args: &DeployArgs,
        logger: Logger,
    ) -> Result<Self> {
        let name = explicit.unwrap_or(Path::new(CONFIG_FILE));
        let found = find_config_file(name, cwd);

        if explicit.is_some() && found.is_none() {
            let err = io::Error::new(io::ErrorKind::NotFound, "config file not found");
            return Err(ConfigError::Io(name.to_path_buf(), err).into());
        }

        let mut config = match &found {
            Some(path) => Self::from_path(path, logger)?,
            None => Self::default(),
        };

        let cwd = normalize_path(cwd);
        config.root = found
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| cwd.clone(), normalize_path);
        config.config_path = found.as_deref().map(normalize_path);

        let root = config.root.clone();
        config.deploy.resolve_paths(&root);
        config.apply_deploy_args(args, &cwd);
        config.fill_defaults(&cwd, logger);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path, logger: Logger) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path, logger);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub(crate) fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            // `Option` fields show up as a `?` segment
            let path = path.to_string();
            let segments: Vec<&str> = path.split('.').filter(|s| *s != "?").collect();
            ignored.push(segments.join("."));
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path, logger: Logger) {
        log!(logger, "warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            log!(logger, "warning"; "- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply `deploy` flags on top of the file values.
    fn apply_deploy_args(&mut self, args: &DeployArgs, cwd: &Path) {
        let deploy = &mut self.deploy;

        if let Some(src) = &args.src {
            deploy.src = resolve_path(src, cwd);
        }
        if let Some(template) = &args.template {
            deploy.template = Some(section::resolve_template(template, cwd));
        }
        if let Some(remote) = &args.remote {
            deploy.remote = Some(section::resolve_remote(remote.clone(), cwd));
        }

        Self::update_option(&mut deploy.target, args.target.as_ref());
        Self::update_option(&mut deploy.branch, args.branch.as_ref());
        if args.title.is_some() {
            deploy.title = args.title.clone();
        }

        if args.no_history {
            deploy.history = History::Erase;
        }
        deploy.better_target |= args.better_target;
    }

    /// Derive the remote from `origin` and the title from the remote.
    fn fill_defaults(&mut self, cwd: &Path, logger: Logger) {
        let deploy = &mut self.deploy;

        if deploy.remote.is_none()
            && let Some(origin) = Git::new(cwd, None, logger).origin_url()
        {
            deploy.remote = Some(section::resolve_remote(origin, cwd));
        }

        if deploy.title.is_none() {
            let title = deploy
                .remote
                .as_deref()
                .and_then(default_title)
                .unwrap_or_else(|| FALLBACK_TITLE.to_string());
            deploy.title = Some(title);
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

    /// Validate configuration, collecting all errors before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.deploy.validate(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    // ========================================================================
    // request
    // ========================================================================

    /// Build the deployment request, loading a custom index template if set.
    pub fn to_request(&self, dry_run: bool) -> Result<DeployRequest> {
        let deploy = &self.deploy;

        let template = match &deploy.template {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|err| ConfigError::Io(path.clone(), err))?;
                index::from_user(content)
                    .map_err(|msg| ConfigError::Template(path.clone(), msg))?
            }
            None => INDEX_HTML,
        };

        let identity = deploy.commit.as_ref().and_then(|commit| {
            Some(Identity {
                name: commit.name.clone()?,
                email: commit.email.clone()?,
            })
        });

        Ok(DeployRequest {
            src: deploy.src.clone(),
            target: deploy.target.clone(),
            better_target: deploy.better_target,
            remote: deploy.remote.clone().unwrap_or_default(),
            branch: deploy.branch.clone(),
            template,
            title: deploy
                .title
                .clone()
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            history: deploy.history,
            dry_run,
            identity,
        })
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
