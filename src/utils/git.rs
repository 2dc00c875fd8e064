//! Git operations, run as `git` subprocesses.
//!
//! Every call goes through [`Cmd`] with an explicit argument list, so branch
//! names, paths and messages are never interpreted by a shell.

use crate::{
    debug,
    logger::Logger,
    utils::exec::{Cmd, ExecError, FilterRule},
};
use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    process::Output,
};

/// Environment variable carrying the directory stripped by [`Git::strip_history`].
pub const STRIP_PATH_ENV: &str = "GH_PAGES_MULTI_TARGET";

/// Index filter for `git filter-branch`; reads the path from the environment.
const STRIP_FILTER: &str =
    r#"git rm -r -q --cached --ignore-unmatch -- "$GH_PAGES_MULTI_TARGET""#;

/// Progress chatter git prints on stderr for successful runs.
static GIT_NOISE: FilterRule = FilterRule::new(&[
    "Cloning into",
    "Switched to a new branch",
    "hint:",
    "To ",
    "branch '",
    "Rewrite ",
    "Ref '",
    "WARNING: Ref",
]);

/// Author/committer identity applied to every git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    fn env_vars(&self) -> [(&'static str, &str); 4] {
        [
            ("GIT_AUTHOR_NAME", self.name.as_str()),
            ("GIT_AUTHOR_EMAIL", self.email.as_str()),
            ("GIT_COMMITTER_NAME", self.name.as_str()),
            ("GIT_COMMITTER_EMAIL", self.email.as_str()),
        ]
    }
}

/// Push mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// Fails when the remote branch moved since the clone.
    Normal,
    /// Overwrites the remote branch unconditionally.
    Force,
}

/// A `git` runner bound to a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
    identity: Option<Identity>,
    logger: Logger,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>, identity: Option<Identity>, logger: Logger) -> Self {
        Self {
            dir: dir.into(),
            identity,
            logger,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check the `git` executable is available on `PATH`.
    pub fn ensure_installed() -> Result<PathBuf> {
        which::which("git").context("`git` was not found on PATH; it is required to deploy")
    }

    /// Build a git command in this runner's directory.
    fn cmd<I, S>(&self, args: I) -> Cmd
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let cmd = Cmd::new("git")
            .args(args)
            .cwd(&self.dir)
            .filter(&GIT_NOISE);
        match &self.identity {
            Some(identity) => cmd.envs(identity.env_vars()),
            None => cmd,
        }
    }

    fn run(&self, cmd: Cmd) -> Result<Output, ExecError> {
        debug!(self.logger, "git"; "{}", cmd.display());
        cmd.run(&self.logger)
    }

    /// Whether `refs/heads/<branch>` exists on `remote`.
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        let output = self.run(self.cmd(["ls-remote", "--heads", remote, branch]))?;
        let wanted = format!("refs/heads/{branch}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .any(|name| name == wanted))
    }

    /// Clone only `branch` of `remote` into `dest` (full history).
    pub fn clone_branch(&self, remote: &str, branch: &str, dest: &Path) -> Result<()> {
        self.run(
            self.cmd(["clone", "--single-branch", "--branch", branch, "--", remote])
                .arg(dest),
        )?;
        Ok(())
    }

    /// Clone the default state of `remote` into `dest`.
    pub fn clone_default(&self, remote: &str, dest: &Path) -> Result<()> {
        self.run(self.cmd(["clone", "--", remote]).arg(dest))?;
        Ok(())
    }

    /// Start `branch` with no parent commit.
    pub fn checkout_orphan(&self, branch: &str) -> Result<()> {
        self.run(self.cmd(["checkout", "--orphan", branch]))?;
        Ok(())
    }

    /// Remove every tracked file from the index and the working tree.
    pub fn remove_all_tracked(&self) -> Result<()> {
        self.run(self.cmd(["rm", "-r", "-f", "-q", "--ignore-unmatch", "--", "."]))?;
        Ok(())
    }

    /// Rewrite every commit of HEAD to drop `path`, pruning emptied commits.
    pub fn strip_history(&self, path: &str) -> Result<()> {
        let cmd = self
            .cmd([
                "filter-branch",
                "--force",
                "--index-filter",
                STRIP_FILTER,
                "--prune-empty",
                "HEAD",
            ])
            .envs([
                (STRIP_PATH_ENV, path),
                ("FILTER_BRANCH_SQUELCH_WARNING", "1"),
            ]);
        self.run(cmd)?;
        Ok(())
    }

    /// Stage every change, including deletions.
    pub fn add_all(&self) -> Result<()> {
        self.run(self.cmd(["add", "-A"]))?;
        Ok(())
    }

    /// Names of staged files.
    pub fn staged_names(&self) -> Result<Vec<String>> {
        let output = self.run(self.cmd(["diff", "--cached", "--name-only"]))?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(self.cmd(["commit", "-q", "-m", message]))?;
        Ok(())
    }

    /// Push `branch` to `origin`, setting upstream.
    pub fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        let cmd = match mode {
            PushMode::Normal => self.cmd(["push", "-u", "origin", branch]),
            PushMode::Force => self.cmd(["push", "--force", "-u", "origin", branch]),
        };
        self.run(cmd)?;
        Ok(())
    }

    /// Resolve a revision to its object id.
    #[cfg(test)]
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        let output = self.run(self.cmd(["rev-parse", "--verify", "-q", rev]))?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// URL of the `origin` remote of the repository containing this directory.
    pub fn origin_url(&self) -> Option<String> {
        let output = self.run(self.cmd(["remote", "get-url", "origin"])).ok()?;
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!url.is_empty()).then_some(url)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{identity, seeded_remote};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_remote_branch_exists_exact_match() {
        let tmp = TempDir::new().unwrap();
        let remote = seeded_remote(tmp.path());
        let remote = remote.to_str().unwrap();
        let git = Git::new(tmp.path(), None, Logger::quiet());

        assert!(git.remote_branch_exists(remote, "main").unwrap());
        assert!(!git.remote_branch_exists(remote, "gh-pages").unwrap());
        assert!(!git.remote_branch_exists(remote, "mai").unwrap());
    }

    #[test]
    fn test_staged_names() {
        let tmp = TempDir::new().unwrap();
        let remote = seeded_remote(tmp.path());
        let work = tmp.path().join("work");
        let git = Git::new(tmp.path(), identity(), Logger::quiet());
        git.clone_branch(remote.to_str().unwrap(), "main", &work).unwrap();

        let git = Git::new(&work, identity(), Logger::quiet());
        assert!(git.staged_names().unwrap().is_empty());

        fs::write(work.join("new file.txt"), "x").unwrap();
        git.add_all().unwrap();
        assert_eq!(git.staged_names().unwrap(), vec!["new file.txt".to_string()]);
    }

    #[test]
    fn test_normal_push_rejected_when_remote_diverged() {
        let tmp = TempDir::new().unwrap();
        let remote = seeded_remote(tmp.path());
        let remote_str = remote.to_str().unwrap();
        let root = Git::new(tmp.path(), identity(), Logger::quiet());

        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        root.clone_branch(remote_str, "main", &a).unwrap();
        root.clone_branch(remote_str, "main", &b).unwrap();

        let git_b = Git::new(&b, identity(), Logger::quiet());
        fs::write(b.join("b.txt"), "b").unwrap();
        git_b.add_all().unwrap();
        git_b.commit("from b").unwrap();
        git_b.push("main", PushMode::Normal).unwrap();

        let remote_git = Git::new(&remote, None, Logger::quiet());
        let head_before = remote_git.rev_parse("main").unwrap();

        let git_a = Git::new(&a, identity(), Logger::quiet());
        fs::write(a.join("a.txt"), "a").unwrap();
        git_a.add_all().unwrap();
        git_a.commit("from a").unwrap();
        let err = git_a.push("main", PushMode::Normal).unwrap_err();
        assert!(err.downcast_ref::<ExecError>().is_some());

        assert_eq!(remote_git.rev_parse("main").unwrap(), head_before);

        git_a.push("main", PushMode::Force).unwrap();
        assert_eq!(
            remote_git.rev_parse("main").unwrap(),
            git_a.rev_parse("HEAD").unwrap()
        );
    }

    #[test]
    fn test_origin_url() {
        let tmp = TempDir::new().unwrap();
        let remote = seeded_remote(tmp.path());
        let git = Git::new(tmp.path().join("seed"), None, Logger::quiet());
        assert_eq!(git.origin_url().as_deref(), remote.to_str());

        let outside = TempDir::new().unwrap();
        let git = Git::new(outside.path(), None, Logger::quiet());
        assert_eq!(git.origin_url(), None);
    }
}
