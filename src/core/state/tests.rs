use super::*;
use tempfile::TempDir;

#[test]
fn load_or_init_persists_fresh_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = StateStore::in_dir(&temp_dir.path().join("state"));
    assert!(!store.path().exists());

    let state = store.load_or_init();
    assert_eq!(state, ClientState::default());
    assert_eq!(state.theme, DEFAULT_THEME);
    assert!(store.path().exists(), "defaults are written immediately");

    let reloaded = store.load().expect("fresh state should load");
    assert_eq!(reloaded, state);
}

#[test]
fn load_or_init_replaces_corrupt_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = StateStore::in_dir(temp_dir.path());
    std::fs::write(store.path(), "provider = [").expect("write corrupt state");

    assert!(matches!(store.load(), Err(StateError::Parse { .. })));
    let state = store.load_or_init();
    assert_eq!(state, ClientState::default());
    assert_eq!(store.load().expect("rewritten"), state);
}

#[test]
fn save_round_trips_selection() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = StateStore::in_dir(temp_dir.path());

    let mut state = ClientState::default();
    assert!(state.select("anthropic", "claude-3"));
    assert!(!state.select("anthropic", "claude-3"));
    store.save(&state).expect("save succeeds");

    let contents = std::fs::read_to_string(store.path()).expect("read state");
    assert!(contents.contains("provider = \"anthropic\""));
    assert_eq!(store.load().expect("load succeeds"), state);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = StateStore::in_dir(temp_dir.path());
    std::fs::write(store.path(), "model = \"gpt-4o\"\n").expect("write partial state");

    let state = store.load().expect("partial state loads");
    assert_eq!(state.theme, DEFAULT_THEME);
    assert_eq!(state.provider, "");
    assert_eq!(state.model, "gpt-4o");
    assert!(!state.has_selection());
}

#[test]
fn config_overrides_split_model_at_first_slash() {
    let mut state = ClientState::default();
    state.apply_config_overrides(&ConfigInfo {
        theme: Some("tokyonight".into()),
        model: Some("openrouter/anthropic/claude-3".into()),
        keybinds: None,
    });

    assert_eq!(state.theme, "tokyonight");
    assert_eq!(state.provider, "openrouter");
    assert_eq!(state.model, "anthropic/claude-3");
}

#[test]
fn config_overrides_ignore_absent_values() {
    let mut state = ClientState {
        theme: "dark".into(),
        provider: "openai".into(),
        model: "gpt-4o".into(),
    };
    state.apply_config_overrides(&ConfigInfo::default());
    assert_eq!(state.theme, "dark");
    assert_eq!(state.provider, "openai");
    assert_eq!(state.model, "gpt-4o");
}
