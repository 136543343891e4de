//! `GitCli` against throwaway repositories built with the real `git` binary.

use std::path::Path;
use std::process::Command;

use branch_board::git::{AheadBehind, GitBackend, GitCli, GitError};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    git_at(dir, args, 1_700_000_000);
}

/// Run git with author and committer dates pinned to `epoch`.
fn git_at(dir: &Path, args: &[&str], epoch: i64) {
    let date = format!("@{epoch} +0000");
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

fn commit(dir: &Path, message: &str, epoch: i64) {
    git_at(
        dir,
        &["commit", "--allow-empty", "-q", "--no-gpg-sign", "-m", message],
        epoch,
    );
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
}

/// main: c1 (1000), c2 (3000)
/// feature: c1, f1 (2000), f2 (4000)
fn fixture() -> Option<(TempDir, GitCli)> {
    if !git_available() {
        eprintln!("git not found, skipping");
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();
    init_repo(path);
    commit(path, "c1", 1000);
    git(path, &["branch", "feature"]);
    commit(path, "c2", 3000);
    git(path, &["checkout", "-q", "feature"]);
    commit(path, "f1", 2000);
    commit(path, "f2", 4000);
    git(path, &["checkout", "-q", "main"]);
    let cli = GitCli::new(path);
    Some((dir, cli))
}

#[test]
fn lists_local_branches_and_current() {
    let Some((_dir, cli)) = fixture() else { return };
    assert_eq!(cli.list_local_branches(), ["feature", "main"]);
    assert_eq!(cli.current_branch().as_deref(), Some("main"));
    assert!(cli.branch_exists("feature"));
    assert!(!cli.branch_exists("nope"));
}

#[test]
fn toplevel_resolves_from_subdirectory() {
    let Some((dir, _)) = fixture() else { return };
    let nested = dir.path().join("sub");
    std::fs::create_dir(&nested).unwrap();
    let top = GitCli::new(&nested).toplevel().unwrap();
    assert_eq!(
        top.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn toplevel_outside_repository_is_none() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // The temp dir may itself live inside a checkout.
    let out = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    if out.status.success() {
        return;
    }
    assert!(GitCli::new(dir.path()).toplevel().is_none());
}

#[test]
fn commit_and_creation_times() {
    let Some((_dir, cli)) = fixture() else { return };
    let last = cli.last_commit_time("feature").unwrap();
    let created = cli.creation_time("feature").unwrap();
    assert_eq!(last.timestamp(), 4000);
    // Oldest reachable commit, shared with main.
    assert_eq!(created.timestamp(), 1000);
    assert_eq!(cli.last_commit_time("main").unwrap().timestamp(), 3000);
}

#[test]
fn ahead_behind_against_main() {
    let Some((_dir, cli)) = fixture() else { return };
    assert_eq!(
        cli.ahead_behind("main", "feature"),
        AheadBehind {
            ahead: 2,
            behind: 1
        }
    );
    assert_eq!(cli.ahead_behind("main", "missing"), AheadBehind::default());
}

#[test]
fn checkout_switches_branch() {
    let Some((_dir, cli)) = fixture() else { return };
    let msg = cli.checkout("feature").unwrap();
    assert_eq!(msg, "Switched to branch feature");
    assert_eq!(cli.current_branch().as_deref(), Some("feature"));
}

#[test]
fn checkout_missing_branch_fails() {
    let Some((_dir, cli)) = fixture() else { return };
    assert!(matches!(
        cli.checkout("missing"),
        Err(GitError::NoSuchBranch(_))
    ));
}

#[test]
fn delete_unmerged_branch() {
    let Some((_dir, cli)) = fixture() else { return };
    cli.delete_branch("feature").unwrap();
    assert_eq!(cli.list_local_branches(), ["main"]);
}

#[test]
fn delete_current_branch_fails_with_stderr() {
    let Some((_dir, cli)) = fixture() else { return };
    let err = cli.delete_branch("main").unwrap_err();
    match err {
        GitError::Failed { branch, stderr, .. } => {
            assert_eq!(branch, "main");
            assert!(!stderr.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn no_origin_means_no_remote_branch() {
    let Some((_dir, cli)) = fixture() else { return };
    assert!(!cli.is_remote_branch("main"));
    assert!(cli.fetch("main").is_err());
}

#[test]
fn fetch_and_pull_from_origin() {
    let Some((origin, _)) = fixture() else { return };
    let work = tempfile::tempdir().unwrap();
    let origin_path = origin.path().to_string_lossy().into_owned();
    git(work.path(), &["clone", "-q", &origin_path, "clone"]);
    let clone = work.path().join("clone");
    git(&clone, &["config", "user.name", "Test"]);
    git(&clone, &["config", "user.email", "test@example.com"]);
    git(&clone, &["branch", "-q", "feature", "origin/feature"]);
    let cli = GitCli::new(&clone);

    assert!(cli.is_remote_branch("main"));
    assert!(cli.is_remote_branch("feature"));

    commit(origin.path(), "c3", 5000);
    git(origin.path(), &["checkout", "-q", "feature"]);
    commit(origin.path(), "f3", 6000);
    git(origin.path(), &["checkout", "-q", "main"]);

    cli.fetch("main").unwrap();
    cli.pull("main").unwrap();
    assert_eq!(cli.last_commit_time("main").unwrap().timestamp(), 5000);

    // Not checked out: the local ref is fast-forwarded in place.
    cli.pull("feature").unwrap();
    assert_eq!(cli.last_commit_time("feature").unwrap().timestamp(), 6000);
    assert_eq!(cli.current_branch().as_deref(), Some("main"));
}
