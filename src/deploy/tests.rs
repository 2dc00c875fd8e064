//! End-to-end runs against a local bare repository.

use super::*;
use crate::{
    embed::index::INDEX_HTML,
    utils::git::test_support::{git_stdout, identity, seeded_remote},
};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    tmp: TempDir,
    remote: PathBuf,
    src: PathBuf,
    /// Parent of every scratch workspace.
    scratch: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let remote = seeded_remote(tmp.path());
        let src = tmp.path().join("docs");
        fs::create_dir_all(&src).unwrap();
        let scratch = tmp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        Self {
            tmp,
            remote,
            src,
            scratch,
        }
    }

    fn write_src(&self, files: &[(&str, &str)]) {
        fs::remove_dir_all(&self.src).unwrap();
        for (path, content) in files {
            let path = self.src.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn request(&self, target: &str) -> DeployRequest {
        DeployRequest {
            src: self.src.clone(),
            target: target.to_string(),
            better_target: false,
            remote: self.remote.to_str().unwrap().to_string(),
            branch: "gh-pages".to_string(),
            template: INDEX_HTML,
            title: "Docs".to_string(),
            history: History::Preserve,
            dry_run: false,
            identity: identity(),
        }
    }

    fn deployer(&self) -> Deployer {
        Deployer::new(Logger::quiet()).with_scratch_root(&self.scratch)
    }

    fn deploy(&self, request: &DeployRequest) -> DeployOutcome {
        self.deployer().deploy(request).unwrap()
    }

    /// Names of the workspaces left under the scratch root.
    fn workspaces(&self) -> Vec<String> {
        fs::read_dir(&self.scratch)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// Output lines of a git command run in the bare remote.
    fn remote_git(&self, args: &[&str]) -> Vec<String> {
        git_stdout(&self.remote, args)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn branch_head(&self) -> String {
        git_stdout(&self.remote, &["rev-parse", "gh-pages"])
            .trim()
            .to_string()
    }
}

#[test]
fn test_new_branch_has_exactly_index_marker_and_target() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "<h1>v1</h1>"), ("guide/intro.html", "intro")]);

    let outcome = fx.deploy(&fx.request("latest"));

    let DeployOutcome::Pushed { message, report } = outcome else {
        panic!("expected a push, got {outcome:?}");
    };
    assert_eq!(message, "Pushed latest by gh-pages-multi");
    assert_eq!(
        report,
        format!(
            "pushed {} to {}:gh-pages/latest",
            fx.src.display(),
            fx.remote.display()
        )
    );

    assert_eq!(
        fx.remote_git(&["ls-tree", "--name-only", "gh-pages"]),
        vec![".nojekyll", "index.html", "latest"]
    );
    assert_eq!(
        fx.remote_git(&["ls-tree", "-r", "--name-only", "gh-pages", "latest"]),
        vec!["latest/guide/intro.html", "latest/index.html"]
    );
    // The seeded branch is untouched.
    assert_eq!(
        fx.remote_git(&["ls-tree", "--name-only", "main"]),
        vec!["README.md"]
    );
}

#[test]
fn test_redeploy_unchanged_is_noop() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "same")]);
    let request = fx.request("latest");

    assert!(matches!(fx.deploy(&request), DeployOutcome::Pushed { .. }));
    let head = fx.branch_head();

    assert_eq!(fx.deploy(&request), DeployOutcome::Unchanged);
    assert_eq!(fx.branch_head(), head);
}

#[test]
fn test_targets_accumulate_in_index() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "one")]);
    fx.deploy(&fx.request("1.0"));
    fx.deploy(&fx.request("latest"));

    assert_eq!(
        fx.remote_git(&["ls-tree", "--name-only", "gh-pages"]),
        vec![".nojekyll", "1.0", "index.html", "latest"]
    );
    let index = git_stdout(&fx.remote, &["show", "gh-pages:index.html"]);
    assert!(index.contains(r#"href="1.0/""#));
    assert!(index.contains(r#"href="latest/""#));
    assert!(index.contains("<title>Docs</title>"));
}

#[test]
fn test_redeploy_replaces_target_contents() {
    let fx = Fixture::new();
    fx.write_src(&[("a.html", "a"), ("b.html", "b")]);
    fx.deploy(&fx.request("latest"));

    fx.write_src(&[("b.html", "b2")]);
    let outcome = fx.deploy(&fx.request("latest"));
    assert!(matches!(outcome, DeployOutcome::Pushed { .. }));

    assert_eq!(
        fx.remote_git(&["ls-tree", "-r", "--name-only", "gh-pages", "latest"]),
        vec!["latest/b.html"]
    );
    assert_eq!(
        git_stdout(&fx.remote, &["show", "gh-pages:latest/b.html"]),
        "b2"
    );
    // Preserved history: two commits on the branch.
    assert_eq!(fx.remote_git(&["rev-list", "gh-pages"]).len(), 2);
}

#[test]
fn test_erase_history_drops_old_blobs() {
    let fx = Fixture::new();
    let old = "old content, only in the first deployment\n";
    fx.write_src(&[("page.html", old)]);
    fx.deploy(&fx.request("latest"));
    fx.deploy(&fx.request("1.0"));

    let old_file = fx.tmp.path().join("old.txt");
    fs::write(&old_file, old).unwrap();
    let seed = fx.tmp.path().join("seed");
    let old_blob = git_stdout(&seed, &["hash-object", old_file.to_str().unwrap()])
        .trim()
        .to_string();
    assert!(
        fx.remote_git(&["rev-list", "--objects", "--all"])
            .iter()
            .any(|line| line.starts_with(&old_blob))
    );

    // Rewrite `latest` only; `1.0` still carries the old blob.
    fx.write_src(&[("page.html", "new content\n")]);
    let mut request = fx.request("latest");
    request.history = History::Erase;
    assert!(matches!(fx.deploy(&request), DeployOutcome::Pushed { .. }));

    assert_eq!(
        git_stdout(&fx.remote, &["show", "gh-pages:latest/page.html"]),
        "new content\n"
    );
    assert_eq!(
        git_stdout(&fx.remote, &["show", "gh-pages:1.0/page.html"]),
        old
    );

    // Now erase `1.0` too: no reachable object holds the old content.
    let mut request = fx.request("1.0");
    request.history = History::Erase;
    fx.deploy(&request);

    assert!(
        !fx.remote_git(&["rev-list", "--objects", "--all"])
            .iter()
            .any(|line| line.starts_with(&old_blob))
    );
    let subjects = fx.remote_git(&["log", "--format=%s", "gh-pages"]);
    assert!(subjects.iter().all(|s| s.starts_with("Pushed ")));
}

#[test]
fn test_dry_run_stages_without_pushing() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "dry")]);
    let mut request = fx.request("latest");
    request.dry_run = true;

    let outcome = fx.deploy(&request);
    let DeployOutcome::DryRun { workspace } = outcome else {
        panic!("expected a dry run, got {outcome:?}");
    };

    assert!(workspace.starts_with(&fx.scratch));
    assert!(workspace.join("latest/index.html").is_file());
    assert!(workspace.join(".nojekyll").is_file());
    let staged = git_stdout(&workspace, &["diff", "--cached", "--name-only"]);
    assert!(staged.lines().any(|line| line == "latest/index.html"));
    let work_git = Git::new(&workspace, None, Logger::quiet());
    assert!(work_git.rev_parse("HEAD").is_err(), "nothing is committed");

    let git = Git::new(fx.tmp.path(), None, Logger::quiet());
    assert!(
        !git.remote_branch_exists(fx.remote.to_str().unwrap(), "gh-pages")
            .unwrap()
    );
}

#[test]
fn test_better_target_applied() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "v")]);
    let mut request = fx.request("v2.3.4");
    request.better_target = true;

    let DeployOutcome::Pushed { message, .. } = fx.deploy(&request) else {
        panic!("expected a push");
    };
    assert_eq!(message, "Pushed 2.3 by gh-pages-multi");
    assert_eq!(
        fx.remote_git(&["ls-tree", "--name-only", "gh-pages"]),
        vec![".nojekyll", "2.3", "index.html"]
    );
}

#[test]
fn test_request_target() {
    let fx = Fixture::new();
    let mut request = fx.request("release-1.4.2");
    assert_eq!(request.target(), "release-1.4.2");
    request.better_target = true;
    assert_eq!(request.target(), "1.4");
}

#[test]
fn test_workspace_removed_after_push_and_unchanged() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "v1")]);
    let request = fx.request("latest");

    assert!(matches!(fx.deploy(&request), DeployOutcome::Pushed { .. }));
    assert!(fx.workspaces().is_empty());

    assert_eq!(fx.deploy(&request), DeployOutcome::Unchanged);
    assert!(fx.workspaces().is_empty());
}

#[test]
fn test_workspace_kept_after_failure() {
    let fx = Fixture::new();
    fx.write_src(&[("index.html", "v1")]);
    let mut request = fx.request("latest");
    request.remote = fx.tmp.path().join("missing.git").to_str().unwrap().to_string();

    assert!(fx.deployer().deploy(&request).is_err());

    let kept = fx.workspaces();
    assert_eq!(kept.len(), 1);
    assert!(kept[0].starts_with(WORKSPACE_PREFIX));
}
