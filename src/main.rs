use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use iocraft::prelude::*;

use branch_board::app::{App, ExitSlot};
use branch_board::board::{BoardOptions, BranchBoard, ExitReason};
use branch_board::color::ColorDepth;
use branch_board::config::keybindings::MergedBindings;
use branch_board::config::loader;
use branch_board::config::types::AppConfig;
use branch_board::git::{GitBackend, GitCli};
use branch_board::theme::{Background, ResolvedTheme};
use branch_board::util::format_date;

#[derive(Parser)]
#[command(name = "branch-board", version, about = "Browse and manage local git branches")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Branch labels file (YAML). Defaults to `.known_branches.yml`.
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Repository to operate on.
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the branch table once and exit.
    List,
    /// Delete one branch without the interactive board.
    Delete {
        /// Branch to delete. The default branch, main and master are refused.
        branch: String,
    },
}

fn main() -> Result<()> {
    // Install a panic hook that writes to a file, since the fullscreen TUI
    // swallows stderr.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        let msg = format!("{info}\n\n{backtrace}");
        let _ = std::fs::write("panic.log", &msg);
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    let cli_git = GitCli::new(&cli.repo);
    let Some(toplevel) = cli_git.toplevel() else {
        bail!("{} is not inside a git repository", cli.repo.display());
    };
    let config = loader::load_config(cli.config.as_deref(), &cli.repo)?;
    let options = board_options(&cli, &config);
    let git: Arc<dyn GitBackend> = Arc::new(GitCli::new(&toplevel));

    tracing::info!(repo = %toplevel.display(), "branch-board starting");

    match cli.command {
        Some(Commands::List) => {
            list_branches(git, options, &config.defaults.date_format);
            return Ok(());
        }
        Some(Commands::Delete { ref branch }) => return delete_branch(git, options, branch),
        None => {}
    }

    let color_depth = ColorDepth::detect();
    let theme = ResolvedTheme::resolve(&config.theme, Background::detect());
    let keybindings = MergedBindings::from_config(&config.keybindings);
    let repo_name = toplevel
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| toplevel.display().to_string());
    let exit_slot: ExitSlot = Arc::new(Mutex::new(None));

    // Enter fullscreen TUI (iocraft uses smol internally).
    smol::block_on(
        element! {
            App(
                config: &config,
                git: &git,
                board_options: &options,
                theme: &theme,
                keybindings: &keybindings,
                color_depth,
                repo_path: toplevel.as_path(),
                repo_name: repo_name.as_str(),
                exit_slot: &exit_slot,
            )
        }
        .fullscreen(),
    )
    .context("running the terminal UI")?;

    let reason = exit_slot
        .lock()
        .map(|mut slot| slot.take())
        .unwrap_or_default();
    if let Some(ExitReason::CheckedOut(branch)) = reason {
        println!("Switched to branch {branch}");
    }
    Ok(())
}

/// Labels path from `--labels` or the config, relative paths taken from the
/// `--repo` directory.
fn board_options(cli: &Cli, config: &AppConfig) -> BoardOptions {
    let labels = cli
        .labels
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.labels_file));
    BoardOptions {
        labels_path: resolve_against(&cli.repo, labels),
        base_branch: config.defaults.base_branch.clone(),
        sort: config.defaults.sort_state(),
    }
}

fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn list_branches(git: Arc<dyn GitBackend>, options: BoardOptions, date_format: &str) {
    let board = BranchBoard::open(git, options);
    let infos: Vec<_> = board
        .branches()
        .iter()
        .map(|name| (name, board.info_for(name)))
        .collect();
    let name_width = infos
        .iter()
        .map(|(_, info)| info.display_name.chars().count())
        .max()
        .unwrap_or(0);

    for (i, (name, info)) in infos.iter().enumerate() {
        let marker = if board.current_branch() == Some(name.as_str()) {
            '*'
        } else {
            ' '
        };
        let date = info
            .last_commit
            .as_ref()
            .map(|dt| format_date(dt, date_format))
            .unwrap_or_default();
        println!(
            "{:>4} {marker} {:<name_width$}  {date:<16}  +{}/-{}",
            i + 1,
            info.display_name,
            info.ahead,
            info.behind,
        );
    }
}

fn delete_branch(git: Arc<dyn GitBackend>, options: BoardOptions, branch: &str) -> Result<()> {
    let board = BranchBoard::open(git.clone(), options);
    if board.is_protected(branch) {
        bail!("refusing to delete {branch}");
    }
    let msg = git.delete_branch(branch)?;
    println!("{msg}");
    Ok(())
}
