//! Deployment pipeline.
//!
//! One run, in order:
//!
//! ```text
//! scratch dir ─► branch checkout (clone | orphan) ─► strip history (erase only)
//!      ─► replace <target> ─► index.html + .nojekyll ─► add ─► diff ─► commit ─► push
//! ```
//!
//! Each step is a fallible call composed with `?`. Nothing is rolled back: on
//! failure the scratch directory is kept for inspection.

mod index;
mod report;
mod workspace;

#[cfg(test)]
mod tests;

use index::write_index;
use report::describe;
use workspace::Checkout;

use crate::{
    config::History,
    debug,
    embed::{Template, index::IndexVars},
    log,
    logger::Logger,
    utils::{
        git::{Git, Identity, PushMode},
        path::{copy_dir_all, exists, remove_dir_if_exists},
        version::better_target,
    },
};
use anyhow::{Context, Result};
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

/// Prefix of the scratch directory name.
const WORKSPACE_PREFIX: &str = "gh-pages-multi-";

/// Everything one deployment needs.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Directory whose contents are published.
    pub src: PathBuf,
    /// Subdirectory name on the branch, before the better-target policy.
    pub target: String,
    pub better_target: bool,
    pub remote: String,
    pub branch: String,
    pub template: Template<IndexVars<'static>>,
    pub title: String,
    pub history: History,
    /// Stage everything but skip commit and push.
    pub dry_run: bool,
    pub identity: Option<Identity>,
}

impl DeployRequest {
    /// Target directory name after the better-target policy.
    pub fn target(&self) -> Cow<'_, str> {
        if self.better_target {
            Cow::Owned(better_target(&self.target))
        } else {
            Cow::Borrowed(&self.target)
        }
    }
}

/// How a deployment ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// A commit was created and pushed.
    Pushed { message: String, report: String },
    /// The staged diff was empty; nothing was committed.
    Unchanged,
    /// The populated, staged workspace, left on disk.
    DryRun { workspace: PathBuf },
}

/// Runs deployments.
#[derive(Debug, Clone)]
pub struct Deployer {
    logger: Logger,
    /// Parent of the scratch directory; the system temp dir when unset.
    scratch_root: Option<PathBuf>,
}

impl Deployer {
    pub const fn new(logger: Logger) -> Self {
        Self {
            logger,
            scratch_root: None,
        }
    }

    /// Create scratch directories under `dir` instead of the system temp dir.
    #[cfg(test)]
    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// Publish `request.src` into `<branch>/<target>` of the remote.
    ///
    /// The scratch directory is removed after a pushed or unchanged run and
    /// kept after a dry run or a failure.
    pub fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("Failed to create scratch directory")?;
        debug!(self.logger, "deploy"; "workspace {}", scratch.path().display());

        match self.run(request, scratch.path()) {
            Ok(outcome @ DeployOutcome::DryRun { .. }) => {
                let kept = scratch.keep();
                log!(self.logger, "deploy"; "dry run, workspace kept at {}", kept.display());
                Ok(outcome)
            }
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let kept = scratch.keep();
                log!(self.logger, "error"; "workspace kept at {}", kept.display());
                Err(err)
            }
        }
    }

    fn run(&self, request: &DeployRequest, dir: &Path) -> Result<DeployOutcome> {
        let target = request.target();
        let git = Git::new(dir, request.identity.clone(), self.logger);

        match workspace::checkout(&git, &request.remote, &request.branch, self.logger)? {
            Checkout::Cloned => log!(self.logger, "deploy"; "updating branch {}", request.branch),
            Checkout::Orphan => log!(self.logger, "deploy"; "creating branch {}", request.branch),
        }

        let target_dir = dir.join(target.as_ref());
        if exists(&target_dir)? {
            if request.history == History::Erase {
                log!(self.logger, "deploy"; "erasing history of {}", target);
                git.strip_history(&target)?;
            }
            remove_dir_if_exists(&target_dir)?;
        }

        let copied = copy_dir_all(&request.src, &target_dir)?;
        debug!(self.logger, "deploy"; "copied {} files into {}", copied, target);

        let names = write_index(dir, &request.template, &request.title)?;
        debug!(self.logger, "deploy"; "index lists {}", names.join(", "));

        git.add_all()?;

        if request.dry_run {
            return Ok(DeployOutcome::DryRun {
                workspace: dir.to_path_buf(),
            });
        }

        let staged = git.staged_names()?;
        if staged.is_empty() {
            log!(self.logger, "deploy"; "no changes to push");
            return Ok(DeployOutcome::Unchanged);
        }
        debug!(self.logger, "deploy"; "{} staged files", staged.len());

        let message = format!("Pushed {target} by gh-pages-multi");
        git.commit(&message)?;

        let mode = match request.history {
            History::Preserve => PushMode::Normal,
            History::Erase => PushMode::Force,
        };
        git.push(&request.branch, mode)?;

        let report = describe(&request.remote, &request.branch, &target, &request.src);
        Ok(DeployOutcome::Pushed { message, report })
    }
}
