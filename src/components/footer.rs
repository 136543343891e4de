use iocraft::prelude::*;

use crate::board::{StatusKind, StatusMessage};
use crate::color::ColorDepth;
use crate::theme::ResolvedTheme;

// ---------------------------------------------------------------------------
// Footer component: key hints, status or position, help hint
// ---------------------------------------------------------------------------

const KEY_HINTS: &str = "enter checkout \u{2022} d delete \u{2022} f fetch \u{2022} p pull \u{2022} s sort";

pub struct RenderedFooter {
    pub hints: String,
    /// Status message if one is set, else the `n/total` position.
    pub context_text: String,
    pub context_fg: Color,
    pub help_hint: String,
    pub text_fg: Color,
    pub border_fg: Color,
}

impl RenderedFooter {
    pub fn build(
        status: Option<&StatusMessage>,
        position: (usize, usize),
        theme: &ResolvedTheme,
        depth: ColorDepth,
    ) -> Self {
        let text_fg = theme.text_faint.to_crossterm_color(depth);
        let (context_text, context_fg) = match status {
            Some(msg) => {
                let color = match msg.kind {
                    StatusKind::Info => theme.text_success,
                    StatusKind::Error => theme.text_error,
                };
                (msg.text.clone(), color.to_crossterm_color(depth))
            }
            None => (format_position(position), text_fg),
        };

        Self {
            hints: KEY_HINTS.to_owned(),
            context_text,
            context_fg,
            help_hint: "? help".to_owned(),
            text_fg,
            border_fg: theme.border_faint.to_crossterm_color(depth),
        }
    }
}

/// `"3/12"` for a one-based selection, empty when there is nothing to show.
pub fn format_position((selected, total): (usize, usize)) -> String {
    if total == 0 {
        String::new()
    } else {
        format!("{}/{total}", selected + 1)
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub footer: Option<RenderedFooter>,
}

#[component]
pub fn Footer(props: &mut FooterProps) -> impl Into<AnyElement<'static>> {
    let Some(f) = props.footer.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: f.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            Text(content: f.hints, color: f.text_fg, wrap: TextWrap::NoWrap)
            Text(content: " \u{2502} ", color: f.text_fg, wrap: TextWrap::NoWrap)
            View(flex_grow: 1.0) {
                Text(content: f.context_text, color: f.context_fg, wrap: TextWrap::NoWrap)
            }
            Text(content: " \u{2502} ", color: f.text_fg, wrap: TextWrap::NoWrap)
            Text(content: f.help_hint, color: f.text_fg, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based() {
        assert_eq!(format_position((0, 12)), "1/12");
        assert_eq!(format_position((11, 12)), "12/12");
        assert_eq!(format_position((0, 0)), "");
    }
}
