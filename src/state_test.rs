use super::*;

#[test]
fn chat_state_default_empty() {
    let state = ChatState::new();
    assert!(state.is_empty());
    assert!(state.last().is_none());
}

#[test]
fn labels_match_speakers() {
    assert_eq!(DisplayRole::User.label(), "You");
    assert_eq!(DisplayRole::Model.label(), "AI");
    assert_eq!(DisplayRole::Error.label(), "Error");
}

#[test]
fn push_assigns_distinct_ids() {
    let state = ChatState::new();
    let a = state.push(DisplayRole::User, "hi");
    let b = state.push(DisplayRole::User, "again");
    assert_ne!(a, b);
    assert_eq!(state.len(), 2);
}

#[test]
fn units_extend_trailing_model_message() {
    let state = ChatState::new();
    state.push(DisplayRole::User, "q");
    state.push(DisplayRole::Model, "");

    state.on_unit("Th");
    state.on_unit("ree");

    assert_eq!(state.last().unwrap().content, "Three");
    assert_eq!(state.messages()[0].content, "q");
}

#[test]
fn units_ignored_when_tail_is_not_model() {
    let state = ChatState::new();
    state.push(DisplayRole::Model, "done");
    state.push(DisplayRole::Error, "oops");

    state.on_unit("x");

    assert_eq!(state.messages()[0].content, "done");
    assert_eq!(state.messages()[1].content, "oops");
}

#[test]
fn clones_share_the_buffer() {
    let state = ChatState::new();
    let view = state.clone();
    state.push(DisplayRole::User, "shared");
    assert_eq!(view.len(), 1);
}
