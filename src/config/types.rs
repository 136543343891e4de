use serde::Deserialize;

use crate::color::Color;
use crate::config::keybindings::KeybindingsConfig;
use crate::sort::{SortDirection, SortKey, SortState};

// ---------------------------------------------------------------------------
// Custom Color deserialization
// ---------------------------------------------------------------------------

/// Deserialize an `Option<Color>` from a TOML string value.
pub(crate) mod color_de {
    use serde::{self, Deserialize, Deserializer};

    use crate::color::Color;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| Color::parse(&s, "<theme>").map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub theme: Theme,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub sort: SortKey,
    pub direction: SortDirection,
    /// `strftime` pattern, or `"relative"` for `3d`-style ages.
    pub date_format: String,
    /// Labels YAML, relative to the working directory.
    pub labels_file: String,
    /// Ahead/behind comparison base; unset picks "main", then "master".
    pub base_branch: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            sort: SortKey::Name,
            direction: SortDirection::Ascending,
            date_format: "%Y-%m-%d %H:%M".to_owned(),
            labels_file: crate::labels::DEFAULT_LABELS_FILE.to_owned(),
            base_branch: None,
        }
    }
}

impl Defaults {
    pub fn sort_state(&self) -> SortState {
        SortState::new(self.sort, self.direction)
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub ui: UiTheme,
    pub colors: ColorsTheme,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiTheme {
    pub table: TableTheme,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableTheme {
    pub show_separator: bool,
}

impl Default for TableTheme {
    fn default() -> Self {
        Self {
            show_separator: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorsTheme {
    pub text: TextColors,
    pub background: BgColors,
    pub border: BorderColors,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub secondary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub warning: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub success: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub error: Option<Color>,
    /// Branches that carry labels.
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub labeled: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BgColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub selected: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BorderColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
}
