use std::path::Path;
use std::sync::{Arc, Mutex};

use iocraft::prelude::*;

use crate::board::{BoardOptions, ExitReason};
use crate::color::ColorDepth;
use crate::config::keybindings::MergedBindings;
use crate::config::types::AppConfig;
use crate::git::GitBackend;
use crate::theme::ResolvedTheme;
use crate::views::branches::BranchesView;

/// Filled by the view just before the app leaves fullscreen, so `main` can
/// report what happened once the terminal is restored.
pub type ExitSlot = Arc<Mutex<Option<ExitReason>>>;

// ---------------------------------------------------------------------------
// Root App component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct AppProps<'a> {
    pub config: Option<&'a AppConfig>,
    pub git: Option<&'a Arc<dyn GitBackend>>,
    pub board_options: Option<&'a BoardOptions>,
    pub theme: Option<&'a ResolvedTheme>,
    pub keybindings: Option<&'a MergedBindings>,
    pub color_depth: ColorDepth,
    pub repo_path: Option<&'a Path>,
    pub repo_name: Option<&'a str>,
    pub exit_slot: Option<&'a ExitSlot>,
}

#[component]
pub fn App<'a>(props: &AppProps<'a>, mut hooks: Hooks) -> impl Into<AnyElement<'a>> {
    let (width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();
    let should_exit = hooks.use_state(|| false);

    if should_exit.get() {
        system.exit();
    }

    let config = props.config;
    let show_separator = config.is_none_or(|c| c.theme.ui.table.show_separator);
    let date_format = config.map(|c| c.defaults.date_format.as_str());

    element! {
        View(width: u32::from(width), height: u32::from(height), flex_direction: FlexDirection::Column) {
            BranchesView(
                git: props.git,
                options: props.board_options,
                theme: props.theme,
                keybindings: props.keybindings,
                color_depth: props.color_depth,
                width,
                height,
                show_separator,
                date_format,
                repo_name: props.repo_name,
                repo_path: props.repo_path,
                should_exit,
                exit_slot: props.exit_slot,
            )
        }
    }
}
