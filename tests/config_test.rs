use std::path::Path;

use branch_board::color::Color;
use branch_board::config::loader::{LOCAL_CONFIG_FILE, load_config};
use branch_board::config::types::AppConfig;
use branch_board::sort::{SortDirection, SortKey, SortState};

#[test]
fn parse_empty_config_uses_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();
    assert_eq!(config.defaults.sort, SortKey::Name);
    assert_eq!(config.defaults.direction, SortDirection::Ascending);
    assert_eq!(config.defaults.labels_file, ".known_branches.yml");
    assert!(config.defaults.base_branch.is_none());
    assert!(config.theme.ui.table.show_separator);
    assert!(config.keybindings.universal.is_empty());
    assert!(config.keybindings.branches.is_empty());
}

#[test]
fn parse_defaults_section() {
    let toml = r#"
[defaults]
sort = "creation_time"
direction = "descending"
date_format = "%d/%m/%Y"
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    assert_eq!(
        config.defaults.sort_state(),
        SortState::new(SortKey::CreationTime, SortDirection::Descending)
    );
    assert_eq!(config.defaults.date_format, "%d/%m/%Y");
}

#[test]
fn parse_unknown_sort_key_fails() {
    let toml = r#"
[defaults]
sort = "size"
"#;
    assert!(toml::from_str::<AppConfig>(toml).is_err());
}

#[test]
fn parse_theme_colors_ansi() {
    let toml = r#"
[theme.colors.text]
primary = "7"
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.theme.colors.text.primary, Some(Color::Ansi256(7)));
    assert!(config.theme.colors.text.secondary.is_none());
}

#[test]
fn parse_keybindings() {
    let toml = r#"
[[keybindings.branches]]
key = "D"
builtin = "delete_branch"

[[keybindings.branches]]
key = "o"
command = "echo {{.Branch}}"
name = "Echo"
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    let branches = &config.keybindings.branches;
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].builtin.as_deref(), Some("delete_branch"));
    assert_eq!(branches[1].command.as_deref(), Some("echo {{.Branch}}"));
    assert_eq!(branches[1].name.as_deref(), Some("Echo"));
}

#[test]
fn load_global_fixture() {
    let path = Path::new("tests/fixtures/global_config.toml");
    let config = load_config(Some(path), Path::new(".")).unwrap();
    assert_eq!(config.defaults.sort, SortKey::CommitTime);
    assert_eq!(config.defaults.direction, SortDirection::Descending);
    assert_eq!(config.defaults.date_format, "relative");
    assert_eq!(config.defaults.labels_file, "branches.yml");
    assert_eq!(config.defaults.base_branch.as_deref(), Some("develop"));
    assert!(!config.theme.ui.table.show_separator);
    assert_eq!(config.theme.colors.text.labeled, Some(Color::Ansi256(214)));
    assert_eq!(config.keybindings.universal.len(), 1);
    assert_eq!(config.keybindings.branches.len(), 1);
}

#[test]
fn invalid_toml_produces_error() {
    let path = Path::new("tests/fixtures/invalid_toml.toml");
    let err = load_config(Some(path), Path::new(".")).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("invalid_toml.toml"), "error should name the file: {msg}");
}

#[test]
fn invalid_color_in_fixture_produces_error() {
    let path = Path::new("tests/fixtures/invalid_color.toml");
    let err = load_config(Some(path), Path::new(".")).unwrap_err();
    assert!(format!("{err:#}").contains("not-a-color"));
}

#[test]
fn unknown_keys_in_fixture_tolerated() {
    let path = Path::new("tests/fixtures/unknown_keys_config.toml");
    let config = load_config(Some(path), Path::new(".")).unwrap();
    assert_eq!(config.defaults.sort, SortKey::Name);
}

#[test]
fn missing_config_file_produces_error() {
    let path = Path::new("tests/fixtures/nonexistent.toml");
    assert!(load_config(Some(path), Path::new(".")).is_err());
}

#[test]
fn repo_local_config_is_discovered_from_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    std::fs::write(
        dir.path().join(LOCAL_CONFIG_FILE),
        "[defaults]\nsort = \"creation_time\"\nbase_branch = \"trunk\"\n",
    )
    .unwrap();
    let nested = dir.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    let config = load_config(None, &nested).unwrap();
    assert_eq!(config.defaults.sort, SortKey::CreationTime);
    assert_eq!(config.defaults.base_branch.as_deref(), Some("trunk"));
}

#[test]
fn explicit_path_wins_over_repo_local() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    std::fs::write(
        dir.path().join(LOCAL_CONFIG_FILE),
        "[defaults]\nsort = \"creation_time\"\n",
    )
    .unwrap();

    let explicit = Path::new("tests/fixtures/global_config.toml");
    let config = load_config(Some(explicit), dir.path()).unwrap();
    assert_eq!(config.defaults.sort, SortKey::CommitTime);
}
