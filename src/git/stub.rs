use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{AheadBehind, GitBackend, GitError};

/// Per-branch fixture data served by [`StubGit`].
#[derive(Debug, Clone, Default)]
pub struct StubBranch {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
    pub ahead_behind: AheadBehind,
    pub has_remote: bool,
}

impl StubBranch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Set both timestamps from Unix seconds.
    pub fn times(mut self, created: i64, last_commit: i64) -> Self {
        self.created = DateTime::from_timestamp(created, 0);
        self.last_commit = DateTime::from_timestamp(last_commit, 0);
        self
    }

    pub fn ahead_behind(mut self, ahead: u32, behind: u32) -> Self {
        self.ahead_behind = AheadBehind { ahead, behind };
        self
    }

    pub fn remote(mut self) -> Self {
        self.has_remote = true;
        self
    }
}

/// Number of times each adapter call was made, for memoization checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub last_commit_time: usize,
    pub creation_time: usize,
    pub ahead_behind: usize,
    pub delete: Vec<String>,
    pub checkout: Vec<String>,
    pub pull: Vec<String>,
    pub fetch: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    branches: Vec<StubBranch>,
    current: Option<String>,
    failing: HashSet<String>,
    calls: CallCounts,
}

/// An in-memory [`GitBackend`] that never spawns a process.
///
/// Useful for integration tests and demos that must not depend on a real
/// repository. Mutations succeed unless the branch was marked with
/// [`StubGit::fail_on`].
#[derive(Debug, Default)]
pub struct StubGit {
    inner: Mutex<Inner>,
}

impl StubGit {
    pub fn new(branches: Vec<StubBranch>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                branches,
                ..Inner::default()
            }),
        }
    }

    pub fn with_current(self, name: &str) -> Self {
        self.lock().current = Some(name.to_owned());
        self
    }

    /// Make every mutation on `name` fail.
    pub fn fail_on(self, name: &str) -> Self {
        self.lock().failing.insert(name.to_owned());
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find<T>(&self, name: &str, f: impl FnOnce(&StubBranch) -> T) -> Option<T> {
        self.lock().branches.iter().find(|b| b.name == name).map(f)
    }

    fn check_failing(inner: &Inner, command: &str, name: &str) -> Result<(), GitError> {
        if inner.failing.contains(name) {
            return Err(GitError::Failed {
                command: command.to_owned(),
                branch: name.to_owned(),
                stderr: "stub failure".to_owned(),
            });
        }
        Ok(())
    }
}

impl GitBackend for StubGit {
    fn branch_exists(&self, name: &str) -> bool {
        self.find(name, |_| ()).is_some()
    }

    fn list_local_branches(&self) -> Vec<String> {
        let mut inner = self.lock();
        inner.calls.list += 1;
        let mut names: Vec<String> = inner.branches.iter().map(|b| b.name.clone()).collect();
        names.sort();
        names
    }

    fn current_branch(&self) -> Option<String> {
        self.lock().current.clone()
    }

    fn last_commit_time(&self, branch: &str) -> Option<DateTime<Utc>> {
        self.lock().calls.last_commit_time += 1;
        self.find(branch, |b| b.last_commit).flatten()
    }

    fn creation_time(&self, branch: &str) -> Option<DateTime<Utc>> {
        self.lock().calls.creation_time += 1;
        self.find(branch, |b| b.created).flatten()
    }

    fn ahead_behind(&self, _base: &str, branch: &str) -> AheadBehind {
        self.lock().calls.ahead_behind += 1;
        self.find(branch, |b| b.ahead_behind).unwrap_or_default()
    }

    fn is_remote_branch(&self, name: &str) -> bool {
        self.find(name, |b| b.has_remote).unwrap_or(false)
    }

    fn delete_branch(&self, name: &str) -> Result<String, GitError> {
        let mut inner = self.lock();
        inner.calls.delete.push(name.to_owned());
        Self::check_failing(&inner, "branch -D", name)?;
        let before = inner.branches.len();
        inner.branches.retain(|b| b.name != name);
        if inner.branches.len() == before {
            return Err(GitError::NoSuchBranch(name.to_owned()));
        }
        Ok(format!("Deleted branch {name}"))
    }

    fn checkout(&self, name: &str) -> Result<String, GitError> {
        let mut inner = self.lock();
        inner.calls.checkout.push(name.to_owned());
        Self::check_failing(&inner, "checkout", name)?;
        if !inner.branches.iter().any(|b| b.name == name) {
            return Err(GitError::NoSuchBranch(name.to_owned()));
        }
        inner.current = Some(name.to_owned());
        Ok(format!("Switched to branch {name}"))
    }

    fn pull(&self, name: &str) -> Result<String, GitError> {
        let mut inner = self.lock();
        inner.calls.pull.push(name.to_owned());
        Self::check_failing(&inner, "pull", name)?;
        Ok(format!("Pulled {name}"))
    }

    fn fetch(&self, name: &str) -> Result<String, GitError> {
        let mut inner = self.lock();
        inner.calls.fetch.push(name.to_owned());
        Self::check_failing(&inner, "fetch", name)?;
        Ok(format!("Fetched origin/{name}"))
    }
}
