use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::keybindings::KeybindingsConfig;
use crate::config::types::AppConfig;

/// Repo-local config file name, looked up at the repository root.
pub const LOCAL_CONFIG_FILE: &str = ".branch-board.toml";

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `.branch-board.toml` at the root of the repository containing `start_dir`
/// 3. `$BRANCH_BOARD_CONFIG` environment variable
/// 4. `$XDG_CONFIG_HOME/branch-board/config.toml`
/// 5. `~/.config/branch-board/config.toml`
///
/// When both a global and a repo-local config exist, `[defaults]` and
/// `[theme]` come from the local file, and each keybinding list is taken
/// from the local file when it is non-empty.
pub fn load_config(explicit_path: Option<&Path>, start_dir: &Path) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        return read_config(path);
    }

    let global = find_global_config();
    let local = find_repo_local_config(start_dir);
    tracing::debug!(?global, ?local, "config discovery");

    match (global, local) {
        (Some(global), Some(local)) => Ok(merge_configs(
            read_config(&global)?,
            read_config(&local)?,
        )),
        (Some(path), None) | (None, Some(path)) => read_config(&path),
        (None, None) => Ok(AppConfig::default()),
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn merge_configs(global: AppConfig, local: AppConfig) -> AppConfig {
    let pick = |g: Vec<_>, l: Vec<_>| if l.is_empty() { g } else { l };
    AppConfig {
        defaults: local.defaults,
        theme: local.theme,
        keybindings: KeybindingsConfig {
            universal: pick(global.keybindings.universal, local.keybindings.universal),
            branches: pick(global.keybindings.branches, local.keybindings.branches),
        },
    }
}

/// Walk up from `start` looking for the config file, stopping at the first
/// directory that holds `.git`.
fn find_repo_local_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.canonicalize().ok()?;
    loop {
        let candidate = dir.join(LOCAL_CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() || !dir.pop() {
            return None;
        }
    }
}

fn find_global_config() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BRANCH_BOARD_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("branch-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    let home = std::env::var("HOME").ok().map(PathBuf::from)?;
    let p = home.join(".config/branch-board/config.toml");
    p.is_file().then_some(p)
}
