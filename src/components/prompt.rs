use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::theme::ResolvedTheme;

// ---------------------------------------------------------------------------
// Pre-rendered confirmation prompt
// ---------------------------------------------------------------------------

pub struct RenderedPrompt {
    pub question: String,
    pub hint: String,
    pub question_fg: Color,
    pub hint_fg: Color,
    pub border_fg: Color,
}

impl RenderedPrompt {
    /// Prompt shown while a delete is pending.
    pub fn delete(branch: &str, theme: &ResolvedTheme, depth: ColorDepth) -> Self {
        Self {
            question: delete_question(branch),
            hint: "enter/y confirm \u{2022} esc/n cancel".to_owned(),
            question_fg: theme.text_warning.to_crossterm_color(depth),
            hint_fg: theme.text_faint.to_crossterm_color(depth),
            border_fg: theme.border_primary.to_crossterm_color(depth),
        }
    }
}

pub fn delete_question(branch: &str) -> String {
    format!("Delete branch \"{branch}\"? (y/n)")
}

#[derive(Default, Props)]
pub struct ConfirmPromptProps {
    pub prompt: Option<RenderedPrompt>,
}

#[component]
pub fn ConfirmPrompt(props: &mut ConfirmPromptProps) -> impl Into<AnyElement<'static>> {
    let Some(prompt) = props.prompt.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(
            flex_direction: FlexDirection::Row,
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: prompt.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            View(flex_grow: 1.0) {
                Text(
                    content: prompt.question,
                    color: prompt.question_fg,
                    weight: Weight::Bold,
                    wrap: TextWrap::NoWrap,
                )
            }
            Text(content: prompt.hint, color: prompt.hint_fg, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_quotes_branch() {
        assert_eq!(delete_question("feature/x"), "Delete branch \"feature/x\"? (y/n)");
    }
}
