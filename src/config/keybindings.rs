use std::collections::HashSet;

use anyhow::{Context as _, Result};
use iocraft::prelude::{KeyCode, KeyEventKind, KeyModifiers};
use serde::Deserialize;

use crate::board::Action;
use crate::sort::SortKey;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// A single key binding: maps a key chord to either a built-in action or a
/// shell command template.
#[derive(Debug, Clone, Deserialize)]
pub struct Keybinding {
    pub key: String,
    pub builtin: Option<String>,
    pub command: Option<String>,
    pub name: Option<String>,
}

/// Keybinding overrides from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub universal: Vec<Keybinding>,
    pub branches: Vec<Keybinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAction {
    MoveDown,
    MoveUp,
    First,
    Last,
    PageDown,
    PageUp,
    Refresh,
    ToggleHelp,
    Quit,
    Checkout,
    DeleteBranch,
    Fetch,
    Pull,
    SortByName,
    SortByCreated,
    SortByCommit,
    CycleSort,
    ReverseSort,
}

impl BuiltinAction {
    /// Parse a builtin action name from the config string.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "move_down" => Self::MoveDown,
            "move_up" => Self::MoveUp,
            "first" => Self::First,
            "last" => Self::Last,
            "page_down" => Self::PageDown,
            "page_up" => Self::PageUp,
            "refresh" => Self::Refresh,
            "toggle_help" => Self::ToggleHelp,
            "quit" => Self::Quit,
            "checkout" => Self::Checkout,
            "delete_branch" => Self::DeleteBranch,
            "fetch" => Self::Fetch,
            "pull" => Self::Pull,
            "sort_by_name" => Self::SortByName,
            "sort_by_created" => Self::SortByCreated,
            "sort_by_commit" => Self::SortByCommit,
            "cycle_sort" => Self::CycleSort,
            "reverse_sort" => Self::ReverseSort,
            _ => return None,
        })
    }

    /// Human-readable description of this action (for help overlay).
    pub fn description(self) -> &'static str {
        match self {
            Self::MoveDown => "Move cursor down",
            Self::MoveUp => "Move cursor up",
            Self::First => "Jump to first branch",
            Self::Last => "Jump to last branch",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Refresh => "Reload branches",
            Self::ToggleHelp => "Toggle help overlay",
            Self::Quit => "Quit",
            Self::Checkout => "Checkout branch and exit",
            Self::DeleteBranch => "Delete branch",
            Self::Fetch => "Fetch from origin",
            Self::Pull => "Pull from origin",
            Self::SortByName => "Sort by name",
            Self::SortByCreated => "Sort by creation time",
            Self::SortByCommit => "Sort by last commit",
            Self::CycleSort => "Cycle sort key",
            Self::ReverseSort => "Reverse sort direction",
        }
    }

    /// The board action this builtin triggers, or `None` for actions handled
    /// by the view itself (help).
    ///
    /// `page` is the number of rows a page step moves.
    pub fn to_action(self, page: usize) -> Option<Action> {
        Some(match self {
            Self::MoveDown => Action::MoveDown,
            Self::MoveUp => Action::MoveUp,
            Self::First => Action::First,
            Self::Last => Action::Last,
            Self::PageDown => Action::PageDown(page),
            Self::PageUp => Action::PageUp(page),
            Self::Refresh => Action::Refresh,
            Self::Quit => Action::Quit,
            Self::Checkout => Action::Checkout,
            Self::DeleteBranch => Action::RequestDelete,
            Self::Fetch => Action::Fetch,
            Self::Pull => Action::Pull,
            Self::SortByName => Action::SortBy(SortKey::Name),
            Self::SortByCreated => Action::SortBy(SortKey::CreationTime),
            Self::SortByCommit => Action::SortBy(SortKey::CommitTime),
            Self::CycleSort => Action::CycleSort,
            Self::ReverseSort => Action::ReverseSort,
            Self::ToggleHelp => return None,
        })
    }
}

/// Resolved binding: what to do when a key is pressed.
#[derive(Debug, Clone)]
pub enum ResolvedBinding {
    Builtin(BuiltinAction),
    ShellCommand(String),
}

// ---------------------------------------------------------------------------
// Key string conversion
// ---------------------------------------------------------------------------

/// Convert a key event to our canonical key string format.
///
/// Examples: `"j"`, `"G"`, `"ctrl+c"`, `"alt+d"`, `"enter"`, `"delete"`,
/// `"pagedown"`, `"up"`, `"?"`.
pub fn key_event_to_string(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<String> {
    if kind == KeyEventKind::Release {
        return None;
    }

    let base = match code {
        KeyCode::Char(' ') => "space".to_owned(),
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
            c.to_ascii_lowercase().to_string()
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_owned(),
        KeyCode::Esc => "esc".to_owned(),
        KeyCode::Backspace => "backspace".to_owned(),
        KeyCode::Tab => "tab".to_owned(),
        KeyCode::Delete => "delete".to_owned(),
        KeyCode::Up => "up".to_owned(),
        KeyCode::Down => "down".to_owned(),
        KeyCode::Left => "left".to_owned(),
        KeyCode::Right => "right".to_owned(),
        KeyCode::PageUp => "pageup".to_owned(),
        KeyCode::PageDown => "pagedown".to_owned(),
        KeyCode::Home => "home".to_owned(),
        KeyCode::End => "end".to_owned(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };

    // No shift prefix: the char itself encodes the case ('G' vs 'g').
    let mut prefix = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        prefix.push_str("ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        prefix.push_str("alt+");
    }

    Some(format!("{prefix}{base}"))
}

// ---------------------------------------------------------------------------
// Default keybindings
// ---------------------------------------------------------------------------

fn kb(key: &str, builtin: &str, name: &str) -> Keybinding {
    Keybinding {
        key: key.to_owned(),
        builtin: Some(builtin.to_owned()),
        command: None,
        name: Some(name.to_owned()),
    }
}

/// Navigation and app-level keys.
pub fn default_universal() -> Vec<Keybinding> {
    vec![
        kb("j", "move_down", "Move cursor down"),
        kb("down", "move_down", "Move cursor down"),
        kb("k", "move_up", "Move cursor up"),
        kb("up", "move_up", "Move cursor up"),
        kb("g", "first", "Jump to first branch"),
        kb("home", "first", "Jump to first branch"),
        kb("G", "last", "Jump to last branch"),
        kb("end", "last", "Jump to last branch"),
        kb("ctrl+d", "page_down", "Page down"),
        kb("pagedown", "page_down", "Page down"),
        kb("ctrl+u", "page_up", "Page up"),
        kb("pageup", "page_up", "Page up"),
        kb("r", "refresh", "Reload branches"),
        kb("?", "toggle_help", "Toggle help"),
        kb("q", "quit", "Quit"),
        kb("ctrl+c", "quit", "Quit"),
    ]
}

/// Branch operations and sorting.
pub fn default_branches() -> Vec<Keybinding> {
    vec![
        kb("enter", "checkout", "Checkout branch and exit"),
        kb("d", "delete_branch", "Delete branch"),
        kb("delete", "delete_branch", "Delete branch"),
        kb("f", "fetch", "Fetch from origin"),
        kb("p", "pull", "Pull from origin"),
        kb("s", "cycle_sort", "Cycle sort key"),
        kb("S", "reverse_sort", "Reverse sort direction"),
        kb("1", "sort_by_name", "Sort by name"),
        kb("2", "sort_by_created", "Sort by creation time"),
        kb("3", "sort_by_commit", "Sort by last commit"),
    ]
}

// ---------------------------------------------------------------------------
// Merged keybinding set
// ---------------------------------------------------------------------------

/// Defaults merged with user overrides. User overrides replace defaults for
/// the same key.
#[derive(Debug, Clone)]
pub struct MergedBindings {
    pub universal: Vec<Keybinding>,
    pub branches: Vec<Keybinding>,
}

impl Default for MergedBindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl MergedBindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        Self {
            universal: merge_lists(&default_universal(), &config.universal),
            branches: merge_lists(&default_branches(), &config.branches),
        }
    }

    /// Look up a key string, branch bindings first, then universal.
    pub fn resolve(&self, key: &str) -> Option<ResolvedBinding> {
        find_binding(&self.branches, key).or_else(|| find_binding(&self.universal, key))
    }

    /// `(group label, bindings)` pairs for the help overlay.
    pub fn groups(&self) -> Vec<(&'static str, &[Keybinding])> {
        vec![
            ("Universal", self.universal.as_slice()),
            ("Branch", self.branches.as_slice()),
        ]
    }
}

fn merge_lists(defaults: &[Keybinding], overrides: &[Keybinding]) -> Vec<Keybinding> {
    let override_keys: HashSet<&str> = overrides.iter().map(|b| b.key.as_str()).collect();

    let mut result: Vec<Keybinding> = defaults
        .iter()
        .filter(|b| !override_keys.contains(b.key.as_str()))
        .cloned()
        .collect();

    result.extend(overrides.iter().cloned());
    result
}

fn find_binding(bindings: &[Keybinding], key: &str) -> Option<ResolvedBinding> {
    for b in bindings.iter().filter(|b| b.key == key) {
        if let Some(ref builtin) = b.builtin {
            if let Some(action) = BuiltinAction::from_name(builtin) {
                return Some(ResolvedBinding::Builtin(action));
            }
            tracing::warn!(key, builtin, "unknown builtin action in keybinding");
        }
        if let Some(ref cmd) = b.command {
            return Some(ResolvedBinding::ShellCommand(cmd.clone()));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Template variable expansion
// ---------------------------------------------------------------------------

/// Variables available to custom command templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    pub branch: String,
    pub default_branch: String,
}

/// Expand `{{.Branch}}` and `{{.DefaultBranch}}` in a command string.
///
/// Values are substituted as single-quoted shell words, since branch names
/// may contain `;`, `$` or backticks and the result runs under `sh -c`.
pub fn expand_template(template: &str, vars: &TemplateVars) -> String {
    template
        .replace("{{.Branch}}", &shell_quote(&vars.branch))
        .replace("{{.DefaultBranch}}", &shell_quote(&vars.default_branch))
}

/// Wrap `value` in single quotes, closing and reopening around each `'`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

// ---------------------------------------------------------------------------
// Shell command execution
// ---------------------------------------------------------------------------

/// Run an expanded command through `sh -c` in `cwd` and return its trimmed
/// stdout.
pub fn execute_shell_command(command: &str, cwd: &std::path::Path) -> Result<String> {
    tracing::info!(command, "running custom command");
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .context("spawning shell command")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        Ok(stdout.trim().to_owned())
    } else {
        anyhow::bail!(
            "command failed (exit {}): {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )
    }
}
