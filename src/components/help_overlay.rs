use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::config::keybindings::{BuiltinAction, Keybinding, MergedBindings};
use crate::theme::ResolvedTheme;

// ---------------------------------------------------------------------------
// Help overlay
// ---------------------------------------------------------------------------

pub struct RenderedHelpOverlay {
    pub groups: Vec<HelpGroup>,
    pub title_fg: Color,
    pub key_fg: Color,
    pub desc_fg: Color,
    pub border_fg: Color,
}

#[derive(Debug, PartialEq, Eq)]
pub struct HelpGroup {
    pub title: String,
    pub rows: Vec<HelpRow>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct HelpRow {
    pub keys: String,
    pub description: String,
}

impl RenderedHelpOverlay {
    pub fn build(bindings: &MergedBindings, theme: &ResolvedTheme, depth: ColorDepth) -> Self {
        Self {
            groups: build_help_groups(bindings),
            title_fg: theme.text_primary.to_crossterm_color(depth),
            key_fg: theme.text_warning.to_crossterm_color(depth),
            desc_fg: theme.text_secondary.to_crossterm_color(depth),
            border_fg: theme.border_primary.to_crossterm_color(depth),
        }
    }
}

/// One row per description; keys bound to the same description are joined
/// (`"j / ↓"`).
pub fn build_help_groups(bindings: &MergedBindings) -> Vec<HelpGroup> {
    bindings
        .groups()
        .into_iter()
        .filter_map(|(label, keybindings)| {
            let mut rows: Vec<HelpRow> = Vec::new();
            for kb in keybindings {
                let description = kb.name.clone().unwrap_or_else(|| describe(kb));
                let key = format_key_display(&kb.key);
                match rows.iter_mut().find(|r| r.description == description) {
                    Some(row) => {
                        row.keys.push_str(" / ");
                        row.keys.push_str(&key);
                    }
                    None => rows.push(HelpRow {
                        keys: key,
                        description,
                    }),
                }
            }
            (!rows.is_empty()).then(|| HelpGroup {
                title: label.to_owned(),
                rows,
            })
        })
        .collect()
}

fn format_key_display(key: &str) -> String {
    match key {
        "space" => "Space".to_owned(),
        "enter" => "Enter".to_owned(),
        "esc" => "Esc".to_owned(),
        "delete" => "Del".to_owned(),
        "pageup" => "PgUp".to_owned(),
        "pagedown" => "PgDn".to_owned(),
        "up" => "\u{2191}".to_owned(),
        "down" => "\u{2193}".to_owned(),
        "home" => "Home".to_owned(),
        "end" => "End".to_owned(),
        s => match s.strip_prefix("ctrl+") {
            Some(rest) => format!("Ctrl+{rest}"),
            None => s.to_owned(),
        },
    }
}

fn describe(kb: &Keybinding) -> String {
    if let Some(action) = kb.builtin.as_deref().and_then(BuiltinAction::from_name) {
        return action.description().to_owned();
    }
    match kb.command {
        Some(ref cmd) => format!("Run: {cmd}"),
        None => "(unbound)".to_owned(),
    }
}

#[derive(Default, Props)]
pub struct HelpOverlayProps {
    pub overlay: Option<RenderedHelpOverlay>,
    pub width: u16,
    pub height: u16,
}

#[component]
pub fn HelpOverlay(props: &mut HelpOverlayProps) -> impl Into<AnyElement<'static>> {
    let Some(overlay) = props.overlay.take() else {
        return element! { View }.into_any();
    };

    let width = u32::from(props.width);
    let height = u32::from(props.height);
    let overlay_width = (width * 3 / 5).max(40).min(width.saturating_sub(4));
    let overlay_height = (height * 4 / 5).max(10).min(height.saturating_sub(2));
    let pad_left = width.saturating_sub(overlay_width) / 2;
    let pad_top = height.saturating_sub(overlay_height) / 2;

    let mut lines: Vec<(String, Color, Weight)> = vec![
        ("Keybindings".to_owned(), overlay.title_fg, Weight::Bold),
        (String::new(), overlay.desc_fg, Weight::Normal),
    ];
    for group in overlay.groups {
        lines.push((format!("  {}", group.title), overlay.title_fg, Weight::Bold));
        for row in group.rows {
            let line = format!("    {:>14}  {}", row.keys, row.description);
            lines.push((line, overlay.desc_fg, Weight::Normal));
        }
        lines.push((String::new(), overlay.desc_fg, Weight::Normal));
    }
    lines.push(("  Press ? to close".to_owned(), overlay.key_fg, Weight::Normal));
    lines.truncate(overlay_height.saturating_sub(2) as usize);

    element! {
        View(width, height, position: Position::Absolute) {
            View(
                margin_left: pad_left,
                margin_top: pad_top,
                width: overlay_width,
                height: overlay_height,
                flex_direction: FlexDirection::Column,
                border_style: BorderStyle::Double,
                border_color: overlay.border_fg,
                background_color: Color::Reset,
                padding_left: 1,
                padding_right: 1,
                overflow: Overflow::Hidden,
            ) {
                #(lines.into_iter().map(|(text, color, weight)| {
                    element! {
                        Text(content: text, color, weight, wrap: TextWrap::NoWrap)
                    }
                }))
            }
        }
    }
    .into_any()
}
