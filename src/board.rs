use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::git::{AheadBehind, GitBackend};
use crate::labels::{self, Labels};
use crate::sort::{SortKey, SortState, sort_branches};

const MAIN: &str = "main";
const MASTER: &str = "master";

// ---------------------------------------------------------------------------
// Cached per-branch info
// ---------------------------------------------------------------------------

/// Display data for one branch, computed on first use and kept until the
/// next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub ahead: u32,
    pub behind: u32,
    pub last_commit: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub display_name: String,
}

impl BranchInfo {
    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Actions and outcomes
// ---------------------------------------------------------------------------

/// Everything the user can ask the board to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    First,
    Last,
    PageUp(usize),
    PageDown(usize),
    /// Select an absolute row (mouse click). Out-of-range rows are ignored.
    Select(usize),
    Checkout,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    Refresh,
    Fetch,
    Pull,
    SortBy(SortKey),
    CycleSort,
    ReverseSort,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// The working tree changed; the board has nothing left to show.
    CheckedOut(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit(ExitReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    ConfirmingDelete { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Board options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub labels_path: PathBuf,
    /// Comparison base override; `None` picks "main", then "master".
    pub base_branch: Option<String>,
    pub sort: SortState,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            labels_path: PathBuf::from(labels::DEFAULT_LABELS_FILE),
            base_branch: None,
            sort: SortState::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// BranchBoard
// ---------------------------------------------------------------------------

/// The branch list, its selection, and everything needed to act on it.
pub struct BranchBoard {
    git: Arc<dyn GitBackend>,
    options: BoardOptions,
    default_branch: String,
    current_branch: Option<String>,
    labels: Labels,
    branches: Vec<String>,
    selected: usize,
    mode: Mode,
    sort: SortState,
    cache: Mutex<HashMap<String, BranchInfo>>,
    status: Option<StatusMessage>,
}

impl std::fmt::Debug for BranchBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchBoard")
            .field("default_branch", &self.default_branch)
            .field("branches", &self.branches)
            .field("selected", &self.selected)
            .field("mode", &self.mode)
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

impl BranchBoard {
    /// Build a board and load it with a first [`refresh`](Self::refresh).
    pub fn open(git: Arc<dyn GitBackend>, options: BoardOptions) -> Self {
        let sort = options.sort;
        let mut board = Self {
            git,
            options,
            default_branch: MAIN.to_owned(),
            current_branch: None,
            labels: Labels::new(),
            branches: Vec::new(),
            selected: 0,
            mode: Mode::Browsing,
            sort,
            cache: Mutex::new(HashMap::new()),
            status: None,
        };
        board.refresh();
        board
    }

    /// Re-read everything from git and the labels file.
    ///
    /// Clears the info cache, re-applies the current sort, resets the
    /// selection to the first row and leaves any confirmation.
    pub fn refresh(&mut self) {
        self.default_branch = self.resolve_default_branch();
        self.labels = labels::load_labels(&self.options.labels_path);
        self.branches = self.git.list_local_branches();
        self.current_branch = self.git.current_branch();
        self.cache_mut().clear();
        sort_branches(&mut self.branches, self.sort, self.git.as_ref());
        self.selected = 0;
        self.mode = Mode::Browsing;
        tracing::debug!(
            branches = self.branches.len(),
            default_branch = %self.default_branch,
            "refreshed branch list"
        );
    }

    fn resolve_default_branch(&self) -> String {
        if let Some(ref base) = self.options.base_branch {
            return base.clone();
        }
        if !self.git.branch_exists(MAIN) && self.git.branch_exists(MASTER) {
            MASTER.to_owned()
        } else {
            MAIN.to_owned()
        }
    }

    fn cache_mut(&mut self) -> &mut HashMap<String, BranchInfo> {
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached info for `branch`, computed under the cache lock on first use.
    pub fn info_for(&self, branch: &str) -> BranchInfo {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = cache.get(branch) {
            return info.clone();
        }

        let AheadBehind { ahead, behind } = if branch == self.default_branch {
            AheadBehind::default()
        } else {
            self.git.ahead_behind(&self.default_branch, branch)
        };
        let tags = self.labels.get(branch).cloned().unwrap_or_default();
        let info = BranchInfo {
            ahead,
            behind,
            last_commit: self.git.last_commit_time(branch),
            display_name: labels::display_name(branch, &tags),
            labels: tags,
        };
        cache.insert(branch.to_owned(), info.clone());
        info
    }

    // -- accessors ----------------------------------------------------------

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_branch(&self) -> Option<&str> {
        self.branches.get(self.selected).map(String::as_str)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_confirming_delete(&self) -> bool {
        matches!(self.mode, Mode::ConfirmingDelete { .. })
    }

    pub fn pending_delete(&self) -> Option<&str> {
        match self.mode {
            Mode::ConfirmingDelete { ref target } => Some(target.as_str()),
            Mode::Browsing => None,
        }
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Show a message from outside the state machine (custom commands).
    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    /// "main", "master" and the resolved default branch are never deleted.
    pub fn is_protected(&self, name: &str) -> bool {
        name == MAIN || name == MASTER || name == self.default_branch
    }

    // -- state machine ------------------------------------------------------

    pub fn apply(&mut self, action: Action) -> Outcome {
        if action == Action::Quit {
            return Outcome::Exit(ExitReason::Quit);
        }
        match self.mode {
            Mode::ConfirmingDelete { .. } => {
                match action {
                    Action::ConfirmDelete => self.confirm_delete(),
                    Action::CancelDelete => {
                        self.mode = Mode::Browsing;
                        self.status = Some(StatusMessage::info("Cancelled"));
                    }
                    _ => {}
                }
                Outcome::Continue
            }
            Mode::Browsing => self.apply_browsing(action),
        }
    }

    fn apply_browsing(&mut self, action: Action) -> Outcome {
        let last = self.branches.len().saturating_sub(1);
        match action {
            Action::MoveUp => self.move_to(self.selected.saturating_sub(1)),
            Action::MoveDown => self.move_to((self.selected + 1).min(last)),
            Action::First => self.move_to(0),
            Action::Last => self.move_to(last),
            Action::PageUp(n) => self.move_to(self.selected.saturating_sub(n)),
            Action::PageDown(n) => self.move_to(self.selected.saturating_add(n).min(last)),
            Action::Select(row) => {
                if row < self.branches.len() {
                    self.move_to(row);
                }
            }
            Action::Checkout => return self.checkout(),
            Action::RequestDelete => self.request_delete(),
            Action::Refresh => {
                self.refresh();
                self.status = None;
            }
            Action::Fetch => self.sync_remote(false),
            Action::Pull => self.sync_remote(true),
            Action::SortBy(key) => self.resort(SortState::new(key, self.sort.direction)),
            Action::CycleSort => {
                self.resort(SortState::new(self.sort.key.next(), self.sort.direction));
            }
            Action::ReverseSort => {
                self.resort(SortState::new(self.sort.key, self.sort.direction.toggle()));
            }
            Action::ConfirmDelete | Action::CancelDelete | Action::Quit => {}
        }
        Outcome::Continue
    }

    fn move_to(&mut self, row: usize) {
        self.selected = row;
        self.status = None;
    }

    fn checkout(&mut self) -> Outcome {
        let Some(name) = self.selected_branch().map(str::to_owned) else {
            return Outcome::Continue;
        };
        match self.git.checkout(&name) {
            Ok(msg) => {
                tracing::info!(branch = %name, "checked out, leaving");
                self.status = Some(StatusMessage::info(msg));
                Outcome::Exit(ExitReason::CheckedOut(name))
            }
            Err(e) => {
                tracing::warn!(branch = %name, error = %e, "checkout failed");
                self.status = Some(StatusMessage::error(format!("Checkout failed: {e}")));
                Outcome::Continue
            }
        }
    }

    fn request_delete(&mut self) {
        let Some(name) = self.selected_branch().map(str::to_owned) else {
            return;
        };
        if self.is_protected(&name) {
            self.status = Some(StatusMessage::info(format!("Refusing to delete {name}")));
            return;
        }
        self.status = None;
        self.mode = Mode::ConfirmingDelete { target: name };
    }

    fn confirm_delete(&mut self) {
        let Mode::ConfirmingDelete { target } = std::mem::replace(&mut self.mode, Mode::Browsing)
        else {
            return;
        };
        let status = match self.git.delete_branch(&target) {
            Ok(msg) => StatusMessage::info(msg),
            Err(e) => {
                tracing::warn!(branch = %target, error = %e, "delete failed");
                StatusMessage::error(format!("Delete failed: {e}"))
            }
        };
        self.refresh();
        self.status = Some(status);
    }

    fn sync_remote(&mut self, pull: bool) {
        let Some(name) = self.selected_branch().map(str::to_owned) else {
            return;
        };
        if !self.git.is_remote_branch(&name) {
            self.status = Some(StatusMessage::info(format!("{name} has no origin/{name}")));
            return;
        }
        let result = if pull {
            self.git.pull(&name)
        } else {
            self.git.fetch(&name)
        };
        let status = match result {
            Ok(msg) => StatusMessage::info(msg),
            Err(e) => {
                tracing::warn!(branch = %name, error = %e, pull, "remote sync failed");
                let verb = if pull { "Pull" } else { "Fetch" };
                StatusMessage::error(format!("{verb} failed: {e}"))
            }
        };
        self.refresh();
        self.status = Some(status);
    }

    /// Re-sort with `sort`, keeping the same branch selected.
    fn resort(&mut self, sort: SortState) {
        let keep = self.selected_branch().map(str::to_owned);
        self.sort = sort;
        sort_branches(&mut self.branches, sort, self.git.as_ref());
        self.selected = keep
            .and_then(|name| self.branches.iter().position(|b| *b == name))
            .unwrap_or(0);
        self.status = Some(StatusMessage::info(format!("Sorted by {}", sort.label())));
    }
}
