//! `[deploy]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [deploy]
//! src = "docs"                          # Directory to publish
//! target = "latest"                     # Subdirectory on the branch
//! remote = "git@github.com:owner/repo.git"
//! branch = "gh-pages"
//! template = "~/templates/index.html"   # Index template (default: embedded)
//! title = "My docs"                     # Index title (default: repo name)
//! history = "preserve"                  # preserve | erase
//! better_target = false                 # Map `1.2.3` to `1.2`
//!
//! [deploy.commit]
//! name = "Docs Bot"
//! email = "docs@example.com"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::{path::resolve_path, version::better_target};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happens to earlier commits touching the target directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum History {
    /// Add a commit on top and push normally.
    #[default]
    Preserve,
    /// Strip the directory from every commit, then force-push.
    Erase,
}

/// Deploy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Local directory whose contents are published.
    pub src: PathBuf,

    /// Subdirectory of the branch receiving the contents.
    pub target: String,

    /// Remote repository (URL or local path). Defaults to `origin`.
    pub remote: Option<String>,

    /// Branch to publish to.
    pub branch: String,

    /// Custom index template file.
    pub template: Option<PathBuf>,

    /// Index page title. Defaults to the repository name.
    pub title: Option<String>,

    pub history: History,

    /// Normalize version-like targets to `major.minor`.
    pub better_target: bool,

    /// Commit identity; git's own configuration applies when absent.
    pub commit: Option<CommitConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("docs"),
            target: "latest".to_string(),
            remote: None,
            branch: "gh-pages".to_string(),
            template: None,
            title: None,
            history: History::Preserve,
            better_target: false,
            commit: None,
        }
    }
}

/// `[deploy.commit]` identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Field paths of the `[deploy]` section, for diagnostics.
pub struct DeployFields {
    pub src: FieldPath,
    pub target: FieldPath,
    pub remote: FieldPath,
    pub branch: FieldPath,
    pub template: FieldPath,
    pub commit: FieldPath,
}

impl DeployConfig {
    pub const FIELDS: DeployFields = DeployFields {
        src: FieldPath::new("deploy.src"),
        target: FieldPath::new("deploy.target"),
        remote: FieldPath::new("deploy.remote"),
        branch: FieldPath::new("deploy.branch"),
        template: FieldPath::new("deploy.template"),
        commit: FieldPath::new("deploy.commit"),
    };

    /// Target name after the better-target policy.
    pub fn effective_target(&self) -> String {
        if self.better_target {
            better_target(&self.target)
        } else {
            self.target.clone()
        }
    }

    /// Resolve relative paths against `base` and expand `~` in the template path.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.src = resolve_path(&self.src, base);
        if let Some(template) = self.template.take() {
            self.template = Some(resolve_template(&template, base));
        }
        if let Some(remote) = self.remote.take() {
            self.remote = Some(resolve_remote(remote, base));
        }
    }

    /// Validate deploy configuration.
    ///
    /// # Checks
    /// - `src` exists and is a directory.
    /// - The effective target is a single visible path component.
    /// - `branch` is non-empty and not option-like.
    /// - `remote` is set and not option-like.
    /// - `template`, when set, is a file.
    /// - `commit.name` and `commit.email` come together.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = &Self::FIELDS;

        if !self.src.exists() {
            diag.error(
                fields.src,
                format!("source directory not found: {}", self.src.display()),
            );
        } else if !self.src.is_dir() {
            diag.error(
                fields.src,
                format!("source is not a directory: {}", self.src.display()),
            );
        }

        if let Err(message) = check_target(&self.effective_target()) {
            diag.error_with_hint(
                fields.target,
                message,
                "use a plain directory name such as `latest` or `1.2`",
            );
        }

        if self.branch.trim().is_empty() {
            diag.error(fields.branch, "branch name is empty");
        } else if self.branch.starts_with('-') {
            diag.error(
                fields.branch,
                format!("branch name must not start with `-`: {}", self.branch),
            );
        }

        match self.remote.as_deref() {
            None | Some("") => diag.error_with_hint(
                fields.remote,
                "no remote repository",
                "pass --remote or run inside a repository with an `origin` remote",
            ),
            Some(remote) if remote.starts_with('-') => diag.error(
                fields.remote,
                format!("remote must not start with `-`: {remote}"),
            ),
            Some(_) => {}
        }

        if let Some(template) = &self.template
            && !template.is_file()
        {
            diag.error(
                fields.template,
                format!("template file not found: {}", template.display()),
            );
        }

        if let Some(commit) = &self.commit
            && commit.name.is_some() != commit.email.is_some()
        {
            diag.error(fields.commit, "`name` and `email` must be set together");
        }
    }
}

/// A target must be one visible path component other than the index file.
fn check_target(target: &str) -> Result<(), String> {
    if target.is_empty() {
        return Err("target is empty".to_string());
    }
    if target == "." || target == ".." {
        return Err(format!("target `{target}` is not a directory name"));
    }
    if target.contains(['/', '\\']) {
        return Err(format!("target `{target}` must be a single path component"));
    }
    if target.starts_with('.') {
        return Err(format!("target `{target}` is hidden"));
    }
    if target == "index.html" {
        return Err("target `index.html` would collide with the generated index".to_string());
    }
    Ok(())
}

/// Expand `~` in a template path, then resolve it against `base`.
pub fn resolve_template(path: &Path, base: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    resolve_path(&expanded, base)
}

/// Make a relative remote naming an existing local repository absolute.
///
/// Git later runs inside the scratch workspace, where the relative path
/// would no longer resolve.
pub fn resolve_remote(remote: String, base: &Path) -> String {
    let path = Path::new(&remote);
    if remote.contains("://") || path.is_absolute() {
        return remote;
    }
    let local = base.join(path);
    if local.exists() {
        resolve_path(path, base).to_string_lossy().into_owned()
    } else {
        remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProjectConfig, test_parse_config};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_deploy_config() {
        let config = test_parse_config(
            r#"[deploy]
src = "site"
target = "v1.2.3"
remote = "git@github.com:owner/repo.git"
branch = "pages"
template = "index.tpl"
title = "Docs"
history = "erase"
better_target = true

[deploy.commit]
name = "Bot"
email = "bot@example.com""#,
        );

        let deploy = &config.deploy;
        assert_eq!(deploy.src, PathBuf::from("site"));
        assert_eq!(deploy.target, "v1.2.3");
        assert_eq!(deploy.effective_target(), "1.2");
        assert_eq!(deploy.remote.as_deref(), Some("git@github.com:owner/repo.git"));
        assert_eq!(deploy.branch, "pages");
        assert_eq!(deploy.template, Some(PathBuf::from("index.tpl")));
        assert_eq!(deploy.title.as_deref(), Some("Docs"));
        assert_eq!(deploy.history, History::Erase);
        assert_eq!(
            deploy.commit,
            Some(CommitConfig {
                name: Some("Bot".into()),
                email: Some("bot@example.com".into()),
            })
        );
    }

    #[test]
    fn test_deploy_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.deploy.src, PathBuf::from("docs"));
        assert_eq!(config.deploy.target, "latest");
        assert_eq!(config.deploy.branch, "gh-pages");
        assert_eq!(config.deploy.history, History::Preserve);
        assert!(config.deploy.remote.is_none());
        assert!(!config.deploy.better_target);
        assert_eq!(config.deploy.effective_target(), "latest");
    }

    #[test]
    fn test_deploy_history_rejects_unknown_value() {
        let result = ProjectConfig::parse_with_ignored("[deploy]\nhistory = \"squash\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_deploy_unknown_field_detected() {
        let (_, ignored) =
            ProjectConfig::parse_with_ignored("[deploy]\nforce = true\n[deploy.commit]\nkey = 1")
                .unwrap();
        assert_eq!(ignored, ["deploy.force", "deploy.commit.key"]);
    }

    #[test]
    fn test_check_target() {
        assert!(check_target("latest").is_ok());
        assert!(check_target("1.2").is_ok());
        assert!(check_target("").is_err());
        assert!(check_target(".").is_err());
        assert!(check_target("..").is_err());
        assert!(check_target(".git").is_err());
        assert!(check_target("a/b").is_err());
        assert!(check_target("index.html").is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let tmp = TempDir::new().unwrap();
        let base = crate::utils::path::normalize_path(tmp.path());
        fs::create_dir_all(base.join("remote.git")).unwrap();

        let mut deploy = DeployConfig {
            template: Some(PathBuf::from("tpl/index.html")),
            remote: Some("remote.git".into()),
            ..Default::default()
        };
        deploy.resolve_paths(&base);

        assert_eq!(deploy.src, base.join("docs"));
        assert_eq!(deploy.template, Some(base.join("tpl/index.html")));
        assert_eq!(
            deploy.remote.as_deref(),
            base.join("remote.git").to_str()
        );

        let mut hosted = DeployConfig {
            remote: Some("git@github.com:owner/repo.git".into()),
            ..Default::default()
        };
        hosted.resolve_paths(&base);
        assert_eq!(hosted.remote.as_deref(), Some("git@github.com:owner/repo.git"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let tmp = TempDir::new().unwrap();
        let deploy = DeployConfig {
            src: tmp.path().join("missing"),
            target: ".hidden".into(),
            remote: None,
            branch: "-x".into(),
            template: Some(tmp.path().join("nope.html")),
            commit: Some(CommitConfig {
                name: Some("Bot".into()),
                email: None,
            }),
            ..Default::default()
        };

        let mut diag = ConfigDiagnostics::new();
        deploy.validate(&mut diag);

        let fields = &DeployConfig::FIELDS;
        assert_eq!(diag.len(), 6);
        for field in [
            fields.src,
            fields.target,
            fields.branch,
            fields.remote,
            fields.template,
            fields.commit,
        ] {
            assert!(diag.has_error_for(field), "missing error for {}", field.as_str());
        }
    }

    #[test]
    fn test_validate_ok() {
        let tmp = TempDir::new().unwrap();
        let deploy = DeployConfig {
            src: tmp.path().to_path_buf(),
            remote: Some("https://github.com/owner/repo.git".into()),
            ..Default::default()
        };

        let mut diag = ConfigDiagnostics::new();
        deploy.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_validate_checks_effective_target() {
        let tmp = TempDir::new().unwrap();
        let mut deploy = DeployConfig {
            src: tmp.path().to_path_buf(),
            target: ".v2.0.1".into(),
            remote: Some("https://github.com/owner/repo.git".into()),
            better_target: true,
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        deploy.validate(&mut diag);
        assert!(diag.is_empty());

        deploy.target = "../up".into();
        deploy.better_target = false;
        let mut diag = ConfigDiagnostics::new();
        deploy.validate(&mut diag);
        assert!(diag.has_error_for(DeployConfig::FIELDS.target));
    }
}
