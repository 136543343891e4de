use branch_board::color::{Color, ColorDepth};
use branch_board::config::types::AppConfig;
use branch_board::theme::{Background, ResolvedTheme};

use crossterm::style::Color as Ct;

#[test]
fn parse_hex_6_digit() {
    let c = Color::parse("#c0caf5", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
}

#[test]
fn parse_hex_3_digit_expands() {
    // #f0a → r=0xff, g=0x00, b=0xaa
    let c = Color::parse("#f0a", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xff,
            g: 0x00,
            b: 0xaa
        }
    );
}

#[test]
fn parse_ansi256_bounds() {
    assert_eq!(Color::parse("0", "f").unwrap(), Color::Ansi256(0));
    assert_eq!(Color::parse("255", "f").unwrap(), Color::Ansi256(255));
    let err = Color::parse("256", "bg.selected").unwrap_err();
    assert!(err.to_string().contains("bg.selected"));
    assert!(err.to_string().contains("256"));
}

#[test]
fn parse_invalid_values() {
    assert!(Color::parse("foobar", "text.primary").is_err());
    assert!(Color::parse("#ab", "border.faint").is_err());
    assert!(Color::parse("#gggggg", "text.error").is_err());
    assert!(Color::parse("#\u{e9}\u{e9}\u{e9}", "text.error").is_err());
}

#[test]
fn truecolor_hex_is_rgb() {
    let c = Color::Hex {
        r: 0xc0,
        g: 0xca,
        b: 0xf5,
    };
    assert_eq!(
        c.to_crossterm_color(ColorDepth::TrueColor),
        Ct::Rgb {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
}

#[test]
fn low_indices_use_named_colors() {
    assert_eq!(
        Color::Ansi256(9).to_crossterm_color(ColorDepth::TrueColor),
        Ct::Red
    );
    assert_eq!(
        Color::Ansi256(100).to_crossterm_color(ColorDepth::Color256),
        Ct::AnsiValue(100)
    );
}

#[test]
fn color256_approximates_hex() {
    let ct = Color::Hex { r: 255, g: 0, b: 0 }.to_crossterm_color(ColorDepth::Color256);
    assert_eq!(ct, Ct::AnsiValue(196));
}

#[test]
fn color16_never_emits_indexed_values() {
    for c in [
        Color::Ansi256(196),
        Color::Ansi256(244),
        Color::Hex {
            r: 0x7a,
            g: 0xa2,
            b: 0xf7,
        },
    ] {
        let ct = c.to_crossterm_color(ColorDepth::Color16);
        assert!(!matches!(ct, Ct::AnsiValue(_) | Ct::Rgb { .. }), "{c} → {ct:?}");
    }
}

#[test]
fn display_round_trips_through_parse() {
    for s in ["42", "#c0caf5"] {
        assert_eq!(s.parse::<Color>().unwrap().to_string(), s);
    }
}

#[test]
fn mixed_theme_config_resolves_at_all_depths() {
    let config: AppConfig = toml::from_str(
        r##"
[theme.colors.text]
primary = "#c0caf5"
secondary = "245"
labeled = "#e0af68"

[theme.colors.background]
selected = "237"
"##,
    )
    .unwrap();

    for bg in [Background::Dark, Background::Light] {
        let theme = ResolvedTheme::resolve(&config.theme, bg);
        assert_eq!(theme.text_secondary, Color::Ansi256(245));
        assert_eq!(theme.bg_selected, Color::Ansi256(237));
        for depth in [
            ColorDepth::TrueColor,
            ColorDepth::Color256,
            ColorDepth::Color16,
        ] {
            for color in [
                theme.text_primary,
                theme.text_secondary,
                theme.text_faint,
                theme.text_warning,
                theme.text_success,
                theme.text_error,
                theme.text_labeled,
                theme.bg_selected,
                theme.border_primary,
                theme.border_faint,
            ] {
                let _ = color.to_crossterm_color(depth);
            }
        }
    }
}

#[test]
fn invalid_color_in_config_mentions_value() {
    let result: Result<AppConfig, _> = toml::from_str(
        r#"
[theme.colors.border]
primary = "999"
"#,
    );
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("999"), "error should mention the value: {msg}");
}
