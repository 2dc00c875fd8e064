//! Branch checkout into the scratch directory.

use crate::{debug, logger::Logger, utils::git::Git};
use anyhow::Result;

/// How the branch got into the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkout {
    /// The branch existed and was cloned with its history.
    Cloned,
    /// The branch was started empty, with no parent commit.
    Orphan,
}

/// Put `branch` of `remote` into the runner's directory.
///
/// An existing branch is cloned alone. A missing one is created as an orphan
/// on top of a default clone, with every inherited file removed.
pub fn checkout(git: &Git, remote: &str, branch: &str, logger: Logger) -> Result<Checkout> {
    if git.remote_branch_exists(remote, branch)? {
        debug!(logger, "deploy"; "cloning {} of {}", branch, remote);
        git.clone_branch(remote, branch, git.dir())?;
        return Ok(Checkout::Cloned);
    }

    debug!(logger, "deploy"; "{} not on {}, starting an orphan branch", branch, remote);
    git.clone_default(remote, git.dir())?;
    git.checkout_orphan(branch)?;
    git.remove_all_tracked()?;
    Ok(Checkout::Orphan)
}
