use crate::color::Color;
use crate::config::types::Theme;

/// Detected terminal background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    /// Detect whether the terminal has a dark or light background.
    ///
    /// Heuristic: check `COLORFGBG` (format "fg;bg"), fall back to dark.
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|val| Self::from_colorfgbg(&val))
            .unwrap_or(Background::Dark)
    }

    fn from_colorfgbg(val: &str) -> Option<Self> {
        let n = val.rsplit(';').next()?.parse::<u8>().ok()?;
        // ANSI colors 0-6 and 8 are dark.
        Some(if n > 6 && n != 8 {
            Background::Light
        } else {
            Background::Dark
        })
    }
}

/// Every color slot the board paints, with user overrides applied.
#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_faint: Color,
    pub text_warning: Color,
    pub text_success: Color,
    pub text_error: Color,
    pub text_labeled: Color,
    pub bg_selected: Color,
    pub border_primary: Color,
    pub border_faint: Color,
}

impl ResolvedTheme {
    pub fn resolve(theme: &Theme, bg: Background) -> Self {
        let d = Self::defaults(bg);
        let text = &theme.colors.text;
        let border = &theme.colors.border;
        Self {
            text_primary: text.primary.unwrap_or(d.text_primary),
            text_secondary: text.secondary.unwrap_or(d.text_secondary),
            text_faint: text.faint.unwrap_or(d.text_faint),
            text_warning: text.warning.unwrap_or(d.text_warning),
            text_success: text.success.unwrap_or(d.text_success),
            text_error: text.error.unwrap_or(d.text_error),
            text_labeled: text.labeled.unwrap_or(d.text_labeled),
            bg_selected: theme.colors.background.selected.unwrap_or(d.bg_selected),
            border_primary: border.primary.unwrap_or(d.border_primary),
            border_faint: border.faint.unwrap_or(d.border_faint),
        }
    }

    fn defaults(bg: Background) -> Self {
        match bg {
            Background::Dark => Self {
                text_primary: Color::Ansi256(7),
                text_secondary: Color::Ansi256(245),
                text_faint: Color::Ansi256(243),
                text_warning: Color::Ansi256(11),
                text_success: Color::Ansi256(10),
                text_error: Color::Ansi256(9),
                text_labeled: Color::Ansi256(11),
                bg_selected: Color::Ansi256(237),
                border_primary: Color::Ansi256(244),
                border_faint: Color::Ansi256(241),
            },
            Background::Light => Self {
                text_primary: Color::Ansi256(0),
                text_secondary: Color::Ansi256(240),
                text_faint: Color::Ansi256(248),
                text_warning: Color::Ansi256(3),
                text_success: Color::Ansi256(2),
                text_error: Color::Ansi256(1),
                text_labeled: Color::Ansi256(3),
                bg_selected: Color::Ansi256(254),
                border_primary: Color::Ansi256(240),
                border_faint: Color::Ansi256(252),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorfgbg_light_and_dark() {
        assert_eq!(Background::from_colorfgbg("0;15"), Some(Background::Light));
        assert_eq!(Background::from_colorfgbg("15;0"), Some(Background::Dark));
        assert_eq!(Background::from_colorfgbg("15;8"), Some(Background::Dark));
        assert_eq!(Background::from_colorfgbg("garbage"), None);
    }

    #[test]
    fn user_override_wins() {
        let mut theme = Theme::default();
        theme.colors.text.labeled = Some(Color::Ansi256(5));
        let resolved = ResolvedTheme::resolve(&theme, Background::Dark);
        assert_eq!(resolved.text_labeled, Color::Ansi256(5));
        assert_eq!(resolved.text_primary, Color::Ansi256(7));
    }
}
