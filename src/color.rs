use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A configured color: an ANSI palette index or an RGB hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Ansi256(u8),
    Hex { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDepth {
    #[default]
    TrueColor,
    Color256,
    Color16,
}

#[derive(Debug, Error)]
#[error("invalid color value for field \"{field}\": \"{value}\"")]
pub struct ColorParseError {
    pub field: String,
    pub value: String,
}

impl Color {
    /// Parse `"0"`..`"255"`, `"#RRGGBB"` or `"#RGB"`.
    ///
    /// `field` only feeds the error message.
    pub fn parse(s: &str, field: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            field: field.to_owned(),
            value: s.to_owned(),
        };

        let Some(hex) = s.strip_prefix('#') else {
            return s.parse::<u8>().map(Color::Ansi256).map_err(|_| err());
        };
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        let (r, g, b) = match hex.len() {
            6 => (channel(0..2), channel(2..4), channel(4..6)),
            3 => (channel(0..1), channel(1..2), channel(2..3)),
            _ => return Err(err()),
        };
        let (Ok(r), Ok(g), Ok(b)) = (r, g, b) else {
            return Err(err());
        };
        if hex.len() == 3 {
            Ok(Color::Hex {
                r: r * 17,
                g: g * 17,
                b: b * 17,
            })
        } else {
            Ok(Color::Hex { r, g, b })
        }
    }

    /// Convert to a `crossterm::style::Color` the terminal can display.
    ///
    /// Indices 0–15 map to crossterm's named colors so the terminal applies
    /// its own 16-color palette.
    pub fn to_crossterm_color(self, depth: ColorDepth) -> crossterm::style::Color {
        use crossterm::style::Color as Ct;
        match (self, depth) {
            (Color::Ansi256(n), ColorDepth::TrueColor | ColorDepth::Color256) => named_or_indexed(n),
            (Color::Hex { r, g, b }, ColorDepth::TrueColor) => Ct::Rgb { r, g, b },
            (Color::Hex { r, g, b }, ColorDepth::Color256) => Ct::AnsiValue(cube_index(r, g, b)),
            (_, ColorDepth::Color16) => {
                let (r, g, b) = self.to_rgb();
                named_or_indexed(nearest_basic(r, g, b))
            }
        }
    }

    fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Hex { r, g, b } => (r, g, b),
            Color::Ansi256(n) => palette_rgb(n),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Ansi256(n) => write!(f, "{n}"),
            Color::Hex { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s, "<unknown>")
    }
}

impl ColorDepth {
    /// Detect terminal color depth from `COLORTERM` and `TERM`.
    pub fn detect() -> Self {
        if let Ok(ct) = std::env::var("COLORTERM")
            && (ct == "truecolor" || ct == "24bit")
        {
            return ColorDepth::TrueColor;
        }
        if let Ok(term) = std::env::var("TERM")
            && term.contains("256color")
        {
            return ColorDepth::Color256;
        }
        ColorDepth::Color16
    }
}

// ---------------------------------------------------------------------------
// Palette helpers
// ---------------------------------------------------------------------------

const BASIC_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn named_or_indexed(n: u8) -> crossterm::style::Color {
    use crossterm::style::Color as Ct;
    match n {
        0 => Ct::Black,
        1 => Ct::DarkRed,
        2 => Ct::DarkGreen,
        3 => Ct::DarkYellow,
        4 => Ct::DarkBlue,
        5 => Ct::DarkMagenta,
        6 => Ct::DarkCyan,
        7 => Ct::Grey,
        8 => Ct::DarkGrey,
        9 => Ct::Red,
        10 => Ct::Green,
        11 => Ct::Yellow,
        12 => Ct::Blue,
        13 => Ct::Magenta,
        14 => Ct::Cyan,
        15 => Ct::White,
        _ => Ct::AnsiValue(n),
    }
}

fn palette_rgb(n: u8) -> (u8, u8, u8) {
    match n {
        0..=15 => BASIC_RGB[usize::from(n)],
        16..=231 => {
            let i = n - 16;
            let level = |c: u8| if c == 0 { 0 } else { 55 + 40 * c };
            (level(i / 36), level((i / 6) % 6), level(i % 6))
        }
        232..=255 => {
            let v = 8 + 10 * (n - 232);
            (v, v, v)
        }
    }
}

/// Nearest index in the 6x6x6 cube or the grayscale ramp.
fn cube_index(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            249..=255 => 231,
            // (248 - 8) / 10 = 24, so the ramp offset stays within 0..=23.
            v => 232 + ((v - 8) / 10).min(23),
        };
    }
    let step = |v: u8| match v {
        0..=47 => 0,
        48..=114 => 1,
        v => ((v - 35) / 40).min(5),
    };
    16 + 36 * step(r) + 6 * step(g) + step(b)
}

/// Closest of the 16 basic colors by squared RGB distance.
fn nearest_basic(r: u8, g: u8, b: u8) -> u8 {
    let dist = |&(pr, pg, pb): &(u8, u8, u8)| {
        let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).pow(2);
        d(r, pr) + d(g, pg) + d(b, pb)
    };
    let (idx, _) = BASIC_RGB
        .iter()
        .enumerate()
        .min_by_key(|(_, rgb)| dist(*rgb))
        .unwrap_or((0, &BASIC_RGB[0]));
    u8::try_from(idx).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_index_pure_red() {
        assert_eq!(cube_index(255, 0, 0), 196);
    }

    #[test]
    fn cube_index_gray_ramp() {
        assert_eq!(cube_index(128, 128, 128), 244);
        assert_eq!(cube_index(0, 0, 0), 16);
    }

    #[test]
    fn nearest_basic_exact_match() {
        assert_eq!(nearest_basic(255, 0, 0), 9);
        assert_eq!(nearest_basic(0, 0, 0), 0);
    }

    #[test]
    fn palette_roundtrip_cube() {
        assert_eq!(palette_rgb(196), (255, 0, 0));
    }
}
