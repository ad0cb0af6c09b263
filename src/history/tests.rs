//! Unit tests for the persisted conversation record.

use super::{ConversationStore, Message, Role};
use std::fs;

fn store_in(dir: &tempfile::TempDir) -> ConversationStore {
    ConversationStore::new(dir.path().join("chat_history.json"))
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let messages = vec![
        Message::user("hi"),
        Message::assistant("hello, welcome to the portfolio"),
    ];
    store.save(&messages).unwrap();

    let loaded = store.load();
    assert_eq!(loaded, messages);
    assert_eq!(loaded[0].role, Role::User);
}

#[test]
fn load_without_record_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(store_in(&dir).load().is_empty());
}

#[test]
fn load_with_corrupt_record_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_history.json");
    fs::write(&path, "invalid json").unwrap();

    let loaded = ConversationStore::new(path).load();
    assert!(loaded.is_empty());
}

#[test]
fn clear_removes_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[Message::user("hi")]).unwrap();
    store.clear().unwrap();

    assert!(store.load().is_empty());
    assert!(!dir.path().join("chat_history.json").exists());
}

#[test]
fn clear_on_missing_record_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    assert!(store_in(&dir).clear().is_ok());
}

#[test]
fn record_is_a_bare_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[Message::user("hi")]).unwrap();

    let raw = fs::read_to_string(dir.path().join("chat_history.json")).unwrap();
    assert_eq!(raw, r#"[{"role":"user","content":"hi"}]"#);
}
