// Every repository query and mutation goes through the `git` binary.

mod cli;
pub mod stub;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use cli::GitCli;
pub use stub::{StubBranch, StubGit};

/// Commits on a branch that are not on its base (`ahead`), and vice versa.
///
/// `(0, 0)` is both "in sync" and "could not be computed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

/// A failed branch mutation (delete, checkout, pull, fetch).
#[derive(Debug, Error)]
pub enum GitError {
    #[error("cannot run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {command} failed for branch '{branch}': {stderr}")]
    Failed {
        command: String,
        branch: String,
        stderr: String,
    },
    #[error("branch '{0}' does not exist")]
    NoSuchBranch(String),
}

/// The set of git capabilities the branch board needs.
///
/// Queries never fail: they degrade to an empty list, `false`, `None` or a
/// zero count so the table always renders. Mutations report a [`GitError`]
/// and return a short human-readable message on success.
pub trait GitBackend: Send + Sync {
    fn branch_exists(&self, name: &str) -> bool;
    fn list_local_branches(&self) -> Vec<String>;
    fn current_branch(&self) -> Option<String>;
    fn last_commit_time(&self, branch: &str) -> Option<DateTime<Utc>>;
    /// Timestamp of the oldest commit reachable from `branch`.
    ///
    /// This walks the whole history, so it approximates branch creation
    /// rather than finding the fork point.
    fn creation_time(&self, branch: &str) -> Option<DateTime<Utc>>;
    fn ahead_behind(&self, base: &str, branch: &str) -> AheadBehind;
    /// Whether `origin/<name>` resolves.
    fn is_remote_branch(&self, name: &str) -> bool;

    fn delete_branch(&self, name: &str) -> Result<String, GitError>;
    fn checkout(&self, name: &str) -> Result<String, GitError>;
    fn pull(&self, name: &str) -> Result<String, GitError>;
    fn fetch(&self, name: &str) -> Result<String, GitError>;
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Split `for-each-ref` output into branch names, skipping blank lines.
pub fn parse_branch_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a Unix-seconds timestamp as printed by `--format=%ct`.
pub fn parse_unix_seconds(stdout: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = stdout.lines().next()?.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Parse `rev-list --left-right --count base...branch` output.
///
/// The left count is what `base` has that `branch` lacks (behind), the right
/// count is the reverse (ahead). Anything but two integers yields `(0, 0)`.
pub fn parse_ahead_behind(stdout: &str) -> AheadBehind {
    let parts: Vec<&str> = stdout.split_whitespace().collect();
    let [left, right] = parts.as_slice() else {
        return AheadBehind::default();
    };
    match (left.parse(), right.parse()) {
        (Ok(behind), Ok(ahead)) => AheadBehind { ahead, behind },
        _ => AheadBehind::default(),
    }
}
