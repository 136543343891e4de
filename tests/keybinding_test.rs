use branch_board::board::Action;
use branch_board::config::keybindings::{
    BuiltinAction, Keybinding, KeybindingsConfig, MergedBindings, ResolvedBinding, TemplateVars,
    default_branches, default_universal, execute_shell_command, expand_template,
    key_event_to_string, shell_quote,
};
use branch_board::sort::SortKey;

use iocraft::prelude::{KeyCode, KeyEventKind, KeyModifiers};

fn builtin(key: &str, name: &str) -> Keybinding {
    Keybinding {
        key: key.to_owned(),
        builtin: Some(name.to_owned()),
        command: None,
        name: None,
    }
}

fn resolves_to(bindings: &MergedBindings, key: &str, expected: BuiltinAction) {
    match bindings.resolve(key) {
        Some(ResolvedBinding::Builtin(action)) => assert_eq!(action, expected, "key {key}"),
        other => panic!("key {key}: expected {expected:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Rebinding
// ---------------------------------------------------------------------------

#[test]
fn override_replaces_default() {
    let config = KeybindingsConfig {
        universal: vec![builtin("q", "refresh")],
        branches: vec![],
    };
    let bindings = MergedBindings::from_config(&config);
    resolves_to(&bindings, "q", BuiltinAction::Refresh);
    // ctrl+c still quits.
    resolves_to(&bindings, "ctrl+c", BuiltinAction::Quit);
}

#[test]
fn rebind_delete_to_another_key() {
    let config = KeybindingsConfig {
        universal: vec![],
        branches: vec![builtin("x", "delete_branch")],
    };
    let bindings = MergedBindings::from_config(&config);
    resolves_to(&bindings, "x", BuiltinAction::DeleteBranch);
    // The default key stays bound until overridden.
    resolves_to(&bindings, "d", BuiltinAction::DeleteBranch);
}

#[test]
fn custom_shell_command_binding() {
    let config = KeybindingsConfig {
        universal: vec![],
        branches: vec![Keybinding {
            key: "o".to_owned(),
            builtin: None,
            command: Some("git log -1 {{.Branch}}".to_owned()),
            name: Some("Last commit".to_owned()),
        }],
    };
    let bindings = MergedBindings::from_config(&config);
    match bindings.resolve("o") {
        Some(ResolvedBinding::ShellCommand(cmd)) => assert_eq!(cmd, "git log -1 {{.Branch}}"),
        other => panic!("expected shell command, got {other:?}"),
    }
}

#[test]
fn branch_bindings_take_priority_over_universal() {
    let config = KeybindingsConfig {
        universal: vec![builtin("z", "refresh")],
        branches: vec![builtin("z", "pull")],
    };
    let bindings = MergedBindings::from_config(&config);
    resolves_to(&bindings, "z", BuiltinAction::Pull);
}

#[test]
fn universal_fallback() {
    let bindings = MergedBindings::default();
    resolves_to(&bindings, "j", BuiltinAction::MoveDown);
    resolves_to(&bindings, "?", BuiltinAction::ToggleHelp);
}

#[test]
fn unknown_key_returns_none() {
    assert!(MergedBindings::default().resolve("ctrl+z").is_none());
}

#[test]
fn help_groups_list_both_sets() {
    let bindings = MergedBindings::default();
    let groups = bindings.groups();
    let labels: Vec<&str> = groups.iter().map(|(label, _)| *label).collect();
    assert_eq!(labels, ["Universal", "Branch"]);
    assert!(groups.iter().all(|(_, list)| !list.is_empty()));
}

// ---------------------------------------------------------------------------
// Template expansion
// ---------------------------------------------------------------------------

#[test]
fn expand_all_template_vars() {
    let vars = TemplateVars {
        branch: "feature/login".to_owned(),
        default_branch: "main".to_owned(),
    };
    assert_eq!(
        expand_template("git diff {{.DefaultBranch}}...{{.Branch}}", &vars),
        "git diff 'main'...'feature/login'"
    );
}

#[test]
fn expand_template_no_placeholders() {
    let vars = TemplateVars::default();
    assert_eq!(expand_template("git status", &vars), "git status");
}

#[test]
fn expand_template_repeated_vars() {
    let vars = TemplateVars {
        branch: "x".to_owned(),
        default_branch: "main".to_owned(),
    };
    assert_eq!(expand_template("{{.Branch}} {{.Branch}}", &vars), "'x' 'x'");
}

#[test]
fn expanded_branch_name_is_one_shell_word() {
    let dir = tempfile::tempdir().unwrap();
    let vars = TemplateVars {
        branch: "x;touch pwned;echo $(id) `id` it's".to_owned(),
        default_branch: "main".to_owned(),
    };
    let cmd = expand_template("printf '%s' {{.Branch}}", &vars);
    let out = execute_shell_command(&cmd, dir.path()).unwrap();
    assert_eq!(out, vars.branch);
    assert!(!dir.path().join("pwned").exists());
}

#[test]
fn shell_quote_escapes_single_quotes() {
    assert_eq!(shell_quote("plain"), "'plain'");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(shell_quote(""), "''");
}

// ---------------------------------------------------------------------------
// Key string conversion
// ---------------------------------------------------------------------------

#[test]
fn key_string_regular_chars() {
    assert_eq!(
        key_event_to_string(
            KeyCode::Char('a'),
            KeyModifiers::empty(),
            KeyEventKind::Press
        ),
        Some("a".to_owned())
    );
    assert_eq!(
        key_event_to_string(KeyCode::Char('S'), KeyModifiers::SHIFT, KeyEventKind::Press),
        Some("S".to_owned())
    );
}

#[test]
fn key_string_ctrl_modifier() {
    assert_eq!(
        key_event_to_string(
            KeyCode::Char('d'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press
        ),
        Some("ctrl+d".to_owned())
    );
}

#[test]
fn key_string_special_keys() {
    for (code, expected) in [
        (KeyCode::Enter, "enter"),
        (KeyCode::Esc, "esc"),
        (KeyCode::Delete, "delete"),
        (KeyCode::PageDown, "pagedown"),
        (KeyCode::Home, "home"),
    ] {
        assert_eq!(
            key_event_to_string(code, KeyModifiers::empty(), KeyEventKind::Press).as_deref(),
            Some(expected)
        );
    }
}

#[test]
fn key_string_release_returns_none() {
    assert!(
        key_event_to_string(
            KeyCode::Char('a'),
            KeyModifiers::empty(),
            KeyEventKind::Release
        )
        .is_none()
    );
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn defaults_universal_has_navigation() {
    let keys: Vec<String> = default_universal().into_iter().map(|b| b.key).collect();
    for key in ["j", "k", "g", "G", "q", "?"] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
}

#[test]
fn defaults_branches_cover_operations() {
    let bindings = MergedBindings::default();
    resolves_to(&bindings, "enter", BuiltinAction::Checkout);
    resolves_to(&bindings, "d", BuiltinAction::DeleteBranch);
    resolves_to(&bindings, "f", BuiltinAction::Fetch);
    resolves_to(&bindings, "p", BuiltinAction::Pull);
    resolves_to(&bindings, "s", BuiltinAction::CycleSort);
    resolves_to(&bindings, "S", BuiltinAction::ReverseSort);
    assert!(default_branches().iter().all(|b| b.builtin.is_some()));
}

#[test]
fn builtins_map_to_board_actions() {
    assert_eq!(BuiltinAction::PageDown.to_action(7), Some(Action::PageDown(7)));
    assert_eq!(BuiltinAction::DeleteBranch.to_action(1), Some(Action::RequestDelete));
    assert_eq!(
        BuiltinAction::SortByCreated.to_action(1),
        Some(Action::SortBy(SortKey::CreationTime))
    );
    assert_eq!(BuiltinAction::ToggleHelp.to_action(1), None);
}

#[test]
fn builtin_from_name_unknown_returns_none() {
    assert!(BuiltinAction::from_name("approve").is_none());
    assert!(BuiltinAction::from_name("").is_none());
}
