use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use crossterm::event::{MouseButton, MouseEventKind};
use iocraft::prelude::*;

use crate::app::ExitSlot;
use crate::board::{Action, BoardOptions, BranchBoard, BranchInfo, Outcome, StatusMessage};
use crate::color::ColorDepth;
use crate::components::footer::{Footer, RenderedFooter};
use crate::components::help_overlay::{HelpOverlay, RenderedHelpOverlay};
use crate::components::prompt::{ConfirmPrompt, RenderedPrompt};
use crate::components::table::{
    Cell, Column, RenderedTable, Row, ScrollableTable, TableBuildConfig,
};
use crate::config::keybindings::{
    BuiltinAction, MergedBindings, ResolvedBinding, TemplateVars, execute_shell_command,
    expand_template, key_event_to_string,
};
use crate::git::GitBackend;
use crate::sort::SortState;
use crate::theme::ResolvedTheme;

// Rows above the table: the title line.
const TITLE_HEIGHT: u16 = 1;
// Footer: top border plus one line. The confirm prompt has the same shape.
const FOOTER_HEIGHT: u16 = 2;
const PROMPT_HEIGHT: u16 = 2;

// ---------------------------------------------------------------------------
// Table columns and row conversion
// ---------------------------------------------------------------------------

fn branch_columns() -> Vec<Column> {
    vec![
        Column::fixed("index", "#", 5).align(TextAlign::Right),
        Column::fixed("marker", "", 3),
        Column::flex("branch", "Branch", 1.0),
        Column::fixed("date", "Last commit", 18),
        Column::fixed("divergence", "+ahead/-behind", 15).align(TextAlign::Right),
    ]
}

/// Everything one table row needs besides the theme.
struct RowInput<'a> {
    index: usize,
    info: &'a BranchInfo,
    is_current: bool,
    is_selected: bool,
}

fn branch_to_row(input: &RowInput<'_>, theme: &ResolvedTheme, date_format: &str) -> Row {
    let mut row = HashMap::new();

    row.insert(
        "index".to_owned(),
        Cell::colored(format!("{} ", input.index + 1), theme.text_faint),
    );
    row.insert(
        "marker".to_owned(),
        Cell::colored(
            marker(input.is_selected, input.is_current),
            theme.text_success,
        ),
    );

    let name_color = if input.info.has_labels() {
        theme.text_labeled
    } else if input.is_current {
        theme.text_success
    } else {
        theme.text_primary
    };
    let mut name = Cell::colored(&input.info.display_name, name_color);
    if input.is_selected {
        name = name.bold();
    }
    row.insert("branch".to_owned(), name);

    let date = input
        .info
        .last_commit
        .as_ref()
        .map(|dt| crate::util::format_date(dt, date_format))
        .unwrap_or_default();
    row.insert("date".to_owned(), Cell::colored(date, theme.text_secondary));

    row.insert(
        "divergence".to_owned(),
        Cell::colored(
            format!("+{}/-{} ", input.info.ahead, input.info.behind),
            theme.text_faint,
        ),
    );

    row
}

/// Selection arrow, then `*` for the checked-out branch.
fn marker(is_selected: bool, is_current: bool) -> String {
    let arrow = if is_selected { '\u{25b6}' } else { ' ' };
    let star = if is_current { '*' } else { ' ' };
    format!("{arrow}{star}")
}

fn title_text(repo_name: &str, count: usize, sort: SortState) -> String {
    let noun = if count == 1 { "branch" } else { "branches" };
    format!(
        " {repo_name}  \u{2022}  {count} {noun}  \u{2022}  sort: {}",
        sort.label()
    )
}

// ---------------------------------------------------------------------------
// Scroll geometry
// ---------------------------------------------------------------------------

/// Smallest change to `offset` that keeps `selected` inside the window.
fn keep_visible(offset: usize, selected: usize, visible: usize) -> usize {
    if selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    }
}

/// Absolute branch index under terminal row `y`, if `y` is a body row.
fn row_at(y: u16, first_body_y: u16, offset: usize, visible: usize) -> Option<usize> {
    let rel = usize::from(y.checked_sub(first_body_y)?);
    (rel < visible).then_some(offset + rel)
}

// ---------------------------------------------------------------------------
// Key handling outside normal browsing
// ---------------------------------------------------------------------------

fn is_ctrl_c(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL)
}

/// Action for a key pressed while a delete is pending.
///
/// Confirm and cancel keys are fixed so the dialog never depends on user
/// bindings. Any key bound to quit still quits.
fn confirm_key_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    keybindings: &MergedBindings,
) -> Option<Action> {
    if is_ctrl_c(code, modifiers) {
        return Some(Action::Quit);
    }
    match code {
        KeyCode::Enter | KeyCode::Char('y' | 'Y') => Some(Action::ConfirmDelete),
        KeyCode::Esc | KeyCode::Char('n' | 'N') => Some(Action::CancelDelete),
        _ => {
            let key = key_event_to_string(code, modifiers, KeyEventKind::Press)?;
            matches!(
                keybindings.resolve(&key),
                Some(ResolvedBinding::Builtin(BuiltinAction::Quit))
            )
            .then_some(Action::Quit)
        }
    }
}

// ---------------------------------------------------------------------------
// BranchesView component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct BranchesViewProps<'a> {
    pub git: Option<&'a Arc<dyn GitBackend>>,
    pub options: Option<&'a BoardOptions>,
    pub theme: Option<&'a ResolvedTheme>,
    pub keybindings: Option<&'a MergedBindings>,
    pub color_depth: ColorDepth,
    pub width: u16,
    pub height: u16,
    pub show_separator: bool,
    pub date_format: Option<&'a str>,
    pub repo_name: Option<&'a str>,
    /// Working directory for custom keybinding commands.
    pub repo_path: Option<&'a Path>,
    pub should_exit: Option<State<bool>>,
    pub exit_slot: Option<&'a ExitSlot>,
}

#[component]
#[allow(clippy::too_many_lines)]
pub fn BranchesView<'a>(
    props: &BranchesViewProps<'a>,
    mut hooks: Hooks,
) -> impl Into<AnyElement<'a>> {
    let theme = props.theme.cloned().unwrap_or_else(super::default_theme);
    let depth = props.color_depth;
    let date_format = props.date_format.unwrap_or("relative");
    let should_exit = props.should_exit;

    let git = props.git.cloned();
    let options = props.options.cloned().unwrap_or_default();
    let board = hooks.use_state(move || git.map(|git| BranchBoard::open(git, options)));
    let mut scroll_offset = hooks.use_state(|| 0usize);
    let mut help_visible = hooks.use_state(|| false);

    let confirming = board
        .read()
        .as_ref()
        .is_some_and(BranchBoard::is_confirming_delete);
    let header_height = RenderedTable::header_height(props.show_separator);
    let prompt_height = if confirming { PROMPT_HEIGHT } else { 0 };
    let visible_rows = usize::from(
        props
            .height
            .saturating_sub(TITLE_HEIGHT + header_height + FOOTER_HEIGHT + prompt_height)
            .max(1),
    );
    let first_body_y = TITLE_HEIGHT + header_height;

    // The board may move the selection on its own (refresh, re-sort).
    let selected = board.read().as_ref().map_or(0, BranchBoard::selected);
    let offset = keep_visible(scroll_offset.get(), selected, visible_rows);
    if offset != scroll_offset.get() {
        scroll_offset.set(offset);
    }

    let keybindings = props.keybindings.cloned().unwrap_or_default();
    let exit_slot = props.exit_slot.cloned();
    let repo_path: PathBuf = props.repo_path.map_or_else(PathBuf::new, Path::to_path_buf);
    hooks.use_terminal_events(move |event| {
        let dispatch = |action: Action| {
            apply_action(board, action, exit_slot.as_ref(), should_exit);
        };

        match event {
            TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) if kind != KeyEventKind::Release => {
                if help_visible.get() {
                    if is_ctrl_c(code, modifiers) {
                        dispatch(Action::Quit);
                    } else if matches!(code, KeyCode::Char('?' | 'q') | KeyCode::Esc) {
                        help_visible.set(false);
                    }
                    return;
                }

                let confirming = board
                    .read()
                    .as_ref()
                    .is_some_and(BranchBoard::is_confirming_delete);
                if confirming {
                    if let Some(action) = confirm_key_action(code, modifiers, &keybindings) {
                        dispatch(action);
                    }
                    return;
                }

                let Some(key_str) = key_event_to_string(code, modifiers, kind) else {
                    return;
                };
                match keybindings.resolve(&key_str) {
                    Some(ResolvedBinding::Builtin(builtin)) => match builtin.to_action(visible_rows)
                    {
                        Some(action) => dispatch(action),
                        None => help_visible.set(true),
                    },
                    Some(ResolvedBinding::ShellCommand(cmd)) => {
                        let mut state = board;
                        let mut guard = state.write();
                        let Some(b) = guard.as_mut() else {
                            return;
                        };
                        let vars = TemplateVars {
                            branch: b.selected_branch().unwrap_or_default().to_owned(),
                            default_branch: b.default_branch().to_owned(),
                        };
                        let expanded = expand_template(&cmd, &vars);
                        let status = match execute_shell_command(&expanded, &repo_path) {
                            Ok(out) if out.is_empty() => StatusMessage::info(format!("Ran: {expanded}")),
                            Ok(out) => StatusMessage::info(out.lines().last().unwrap_or_default()),
                            Err(e) => {
                                tracing::warn!(command = %expanded, error = %e, "custom command failed");
                                StatusMessage::error(e.to_string())
                            }
                        };
                        b.set_status(status);
                    }
                    None => {}
                }
            }
            TerminalEvent::FullscreenMouse(FullscreenMouseEvent { kind, row, .. }) => match kind {
                MouseEventKind::ScrollUp => dispatch(Action::MoveUp),
                MouseEventKind::ScrollDown => dispatch(Action::MoveDown),
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(index) =
                        row_at(row, first_body_y, scroll_offset.get(), visible_rows)
                    {
                        dispatch(Action::Select(index));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    });

    let guard = board.read();
    let Some(b) = guard.as_ref() else {
        return element! { View }.into_any();
    };

    // Only the visible window is rendered, so git is queried for at most
    // `visible_rows` branches per frame.
    let branches = b.branches();
    let end = (offset + visible_rows).min(branches.len());
    let window = branches.get(offset..end).unwrap_or_default();
    let rows: Vec<Row> = window
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let index = offset + i;
            let info = b.info_for(name);
            branch_to_row(
                &RowInput {
                    index,
                    info: &info,
                    is_current: b.current_branch() == Some(name.as_str()),
                    is_selected: index == b.selected(),
                },
                &theme,
                date_format,
            )
        })
        .collect();

    let columns = branch_columns();
    let rendered_table = RenderedTable::build(&TableBuildConfig {
        columns: &columns,
        rows: &rows,
        first_row: offset,
        cursor: b.selected(),
        total_width: props.width,
        depth,
        selected_bg: Some(theme.bg_selected),
        header_color: Some(theme.text_secondary),
        border_color: Some(theme.border_faint),
        show_separator: props.show_separator,
        empty_message: Some("No local branches"),
    });

    let rendered_prompt = b
        .pending_delete()
        .map(|target| RenderedPrompt::delete(target, &theme, depth));

    let rendered_footer = RenderedFooter::build(
        b.status(),
        (b.selected(), branches.len()),
        &theme,
        depth,
    );

    let rendered_help = help_visible
        .get()
        .then(|| RenderedHelpOverlay::build(&keybindings_for_help(props.keybindings), &theme, depth));

    let title = title_text(
        props.repo_name.unwrap_or("repository"),
        branches.len(),
        b.sort_state(),
    );
    let title_fg = theme.text_primary.to_crossterm_color(depth);

    let width = u32::from(props.width);
    let height = u32::from(props.height);

    element! {
        View(flex_direction: FlexDirection::Column, width, height) {
            Text(content: title, color: title_fg, weight: Weight::Bold, wrap: TextWrap::NoWrap)
            View(flex_grow: 1.0, flex_direction: FlexDirection::Column, overflow: Overflow::Hidden) {
                ScrollableTable(table: rendered_table)
            }
            ConfirmPrompt(prompt: rendered_prompt)
            Footer(footer: rendered_footer)
            HelpOverlay(overlay: rendered_help, width: props.width, height: props.height)
        }
    }
    .into_any()
}

/// Run `action` on the board and hand an exit reason to the app.
fn apply_action(
    mut board: State<Option<BranchBoard>>,
    action: Action,
    exit_slot: Option<&ExitSlot>,
    should_exit: Option<State<bool>>,
) {
    let outcome = match board.write().as_mut() {
        Some(b) => b.apply(action),
        None => return,
    };
    if let Outcome::Exit(reason) = outcome {
        if let Some(slot) = exit_slot {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason);
        }
        if let Some(mut exit) = should_exit {
            exit.set(true);
        }
    }
}

fn keybindings_for_help(bindings: Option<&MergedBindings>) -> MergedBindings {
    bindings.cloned().unwrap_or_default()
}
