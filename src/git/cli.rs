use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, Utc};

use super::{
    AheadBehind, GitBackend, GitError, parse_ahead_behind, parse_branch_list, parse_unix_seconds,
};

/// [`GitBackend`] backed by the `git` binary found on `PATH`.
///
/// Every call spawns one blocking `git` process with `repo` as its working
/// directory. There are no retries and no timeouts.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo
    }

    /// Root of the working tree containing `repo`, or `None` outside a
    /// repository.
    pub fn toplevel(&self) -> Option<PathBuf> {
        self.query(&["rev-parse", "--show-toplevel"])
            .map(|s| PathBuf::from(s.trim()))
            .filter(|p| !p.as_os_str().is_empty())
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
    }

    /// Run a query and return its stdout, or `None` on spawn failure or a
    /// non-zero exit.
    fn query(&self, args: &[&str]) -> Option<String> {
        match self.run(args) {
            Ok(o) if o.status.success() => Some(String::from_utf8_lossy(&o.stdout).into_owned()),
            Ok(o) => {
                tracing::debug!(
                    ?args,
                    stderr = %String::from_utf8_lossy(&o.stderr).trim(),
                    "git query failed"
                );
                None
            }
            Err(e) => {
                tracing::debug!(?args, error = %e, "cannot spawn git");
                None
            }
        }
    }

    /// Run a mutation; `ok` becomes the success message.
    fn mutate(&self, args: &[&str], branch: &str, ok: String) -> Result<String, GitError> {
        let command = args.join(" ");
        tracing::info!(%command, "running git");
        let output = self.run(args).map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;
        if output.status.success() {
            Ok(ok)
        } else {
            Err(GitError::Failed {
                command,
                branch: branch.to_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

impl GitBackend for GitCli {
    fn branch_exists(&self, name: &str) -> bool {
        self.run(&["rev-parse", "--verify", "--quiet", name])
            .is_ok_and(|o| o.status.success())
    }

    fn list_local_branches(&self) -> Vec<String> {
        self.query(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])
            .map(|out| parse_branch_list(&out))
            .unwrap_or_default()
    }

    fn current_branch(&self) -> Option<String> {
        let out = self.query(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        let name = out.trim();
        if name.is_empty() { None } else { Some(name.to_owned()) }
    }

    fn last_commit_time(&self, branch: &str) -> Option<DateTime<Utc>> {
        self.query(&["log", "-1", "--format=%ct", branch])
            .and_then(|out| parse_unix_seconds(&out))
    }

    fn creation_time(&self, branch: &str) -> Option<DateTime<Utc>> {
        // `-n 1` would be applied before `--reverse`, so take the first line
        // of the full reversed listing instead.
        self.query(&["log", "--reverse", "--format=%ct", branch])
            .and_then(|out| parse_unix_seconds(&out))
    }

    fn ahead_behind(&self, base: &str, branch: &str) -> AheadBehind {
        let range = format!("{base}...{branch}");
        self.query(&["rev-list", "--left-right", "--count", &range])
            .map(|out| parse_ahead_behind(&out))
            .unwrap_or_default()
    }

    fn is_remote_branch(&self, name: &str) -> bool {
        let remote_ref = format!("refs/remotes/origin/{name}");
        self.branch_exists(&remote_ref)
    }

    fn delete_branch(&self, name: &str) -> Result<String, GitError> {
        self.mutate(&["branch", "-D", name], name, format!("Deleted branch {name}"))
    }

    fn checkout(&self, name: &str) -> Result<String, GitError> {
        if !self.branch_exists(name) {
            return Err(GitError::NoSuchBranch(name.to_owned()));
        }
        self.mutate(&["checkout", name], name, format!("Switched to branch {name}"))
    }

    fn pull(&self, name: &str) -> Result<String, GitError> {
        if self.current_branch().as_deref() == Some(name) {
            self.mutate(
                &["pull", "--ff-only", "origin", name],
                name,
                format!("Pulled {name}"),
            )
        } else {
            // Not checked out: fast-forward the local ref without touching
            // the working tree.
            let refspec = format!("{name}:{name}");
            self.mutate(
                &["fetch", "origin", &refspec],
                name,
                format!("Fast-forwarded {name} from origin"),
            )
        }
    }

    fn fetch(&self, name: &str) -> Result<String, GitError> {
        self.mutate(
            &["fetch", "origin", name],
            name,
            format!("Fetched origin/{name}"),
        )
    }
}
