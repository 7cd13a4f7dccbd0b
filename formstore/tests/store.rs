mod common;

use std::sync::{Arc, Mutex};

use formstore::prelude::*;
use serde_json::json;

use common::{Calls, assert_invariants, factory, manual_config, signup_schema};

fn setup() -> (FormStore, Calls, Arc<ManualClock>) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let clock = Arc::new(ManualClock::new(1_000));
    let scheduler = Arc::new(ManualScheduler::new());
    let form = factory(&calls)
        .make_form_with(signup_schema(), manual_config(&clock, &scheduler))
        .unwrap();
    calls.lock().unwrap().clear();
    (form, calls, clock)
}

#[test]
fn test_initial_snapshot_holds_invariants() {
    let (form, _, _) = setup();
    let state = form.snapshot();

    assert_invariants(&state);
    assert_eq!(state.all_input_ids.len(), 5);
    assert_eq!(state.value("age"), Some(&Value::Int(5)));
    // Required but empty username is invalid from the start.
    assert_eq!(state.local_error_input_ids, vec![InputId::new("username")]);
    assert!(!state.is_valid);
    assert!(!state.is_edited);
}

#[test]
fn test_update_input_sets_value_and_revalidates() {
    let (form, _, clock) = setup();
    clock.set(2_000);

    form.update_input("username", "al").unwrap();
    let state = form.snapshot();
    let username = state.input("username").unwrap();
    assert_eq!(username.value, Value::from("al"));
    assert_eq!(username.local_error_types, vec!["min_length"]);
    assert_eq!(username.local_error_texts(), vec!["Must be at least 3 characters"]);
    assert_eq!(username.time_updated, 2_000);
    assert_eq!(state.time_updated, 2_000);
    assert!(username.is_edited);
    assert!(state.is_edited);
    assert_invariants(&state);

    form.update_input("username", "alice").unwrap();
    let state = form.snapshot();
    assert!(state.input("username").unwrap().is_valid_local);
    assert!(state.is_valid);
    assert_invariants(&state);
}

#[test]
fn test_update_input_is_idempotent() {
    let (form, _, _) = setup();

    form.update_input("username", "alice").unwrap();
    let first = form.snapshot();
    form.update_input("username", "alice").unwrap();
    let second = form.snapshot();

    assert_eq!(*first, *second);
}

#[test]
fn test_old_snapshots_are_unchanged() {
    let (form, _, _) = setup();
    let before = form.snapshot();

    form.update_input("username", "alice").unwrap();

    assert_eq!(before.value("username"), Some(&Value::from("")));
    assert_eq!(form.snapshot().value("username"), Some(&Value::from("alice")));
    // Untouched inputs are shared between snapshots.
    assert!(Arc::ptr_eq(
        &before.input_states[&InputId::new("company")],
        &form.snapshot().input_states[&InputId::new("company")]
    ));
}

#[test]
fn test_correction_converges() {
    let (form, _, _) = setup();

    form.update_input("age", 15i64).unwrap();
    let state = form.snapshot();
    let age = state.input("age").unwrap();
    assert_eq!(age.value, Value::Int(10));
    assert_eq!(state.form_values[&InputId::new("age")], Value::Int(10));
    assert!(age.local_error_types.is_empty());
    assert!(age.is_edited);
    assert_invariants(&state);

    form.update_input("age", -3i64).unwrap();
    assert_eq!(form.snapshot().value("age"), Some(&Value::Int(0)));
}

#[test]
fn test_correction_back_to_initial_value_is_not_an_edit() {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let form = factory(&calls)
        .make_form(FormSchema::new().input("age", InputOptions::new("number").initial_value(10i64)))
        .unwrap();

    form.update_input("age", 99i64).unwrap();
    let state = form.snapshot();
    assert_eq!(state.value("age"), Some(&Value::Int(10)));
    assert!(!state.input("age").unwrap().is_edited);
    assert!(!state.is_edited);
}

#[test]
fn test_cross_input_revalidation_runs_each_once() {
    let (form, calls, _) = setup();

    form.update_input("password", "hunter2").unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["password", "confirm_password"]);
    assert_invariants(&form.snapshot());
}

#[test]
fn test_matching_pair_clears_both_errors() {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let schema = FormSchema::new()
        .input(
            "password",
            InputOptions::new("text")
                .validator("matches_input")
                .validator_options("matches_input", json!({ "input_id": "confirm" })),
        )
        .input(
            "confirm",
            InputOptions::new("text")
                .validator("matches_input")
                .validator_options("matches_input", json!({ "input_id": "password" })),
        );
    let form = factory(&calls).make_form(schema).unwrap();

    form.update_input("password", "secret").unwrap();
    form.update_input("confirm", "secreT").unwrap();
    let state = form.snapshot();
    assert_eq!(state.input("password").unwrap().local_error_types, vec!["matches_input"]);
    assert_eq!(state.input("confirm").unwrap().local_error_types, vec!["matches_input"]);
    assert_invariants(&state);

    form.update_input("confirm", "secret").unwrap();
    let state = form.snapshot();
    assert!(state.input("password").unwrap().is_valid_local);
    assert!(state.input("confirm").unwrap().is_valid_local);
    assert!(state.is_valid_local);
}

#[test]
fn test_server_errors_suppressed_once_edited() {
    let (form, _, _) = setup();
    form.refresh_form(
        RefreshOptions::new()
            .initial_value("username", "alice")
            .server_errors("username", ["Username is taken"]),
    );
    let state = form.snapshot();
    assert!(!state.input("username").unwrap().is_valid_server);
    assert_eq!(state.server_error_input_ids, vec![InputId::new("username")]);
    assert!(!state.is_valid);
    assert_invariants(&state);

    form.update_input("username", "alice2").unwrap();
    let state = form.snapshot();
    let username = state.input("username").unwrap();
    assert!(username.is_valid_server);
    assert_eq!(username.server_error_texts, vec!["Username is taken"]);
    assert!(state.server_error_input_ids.is_empty());
    assert_invariants(&state);

    // Editing back to the refreshed value brings the error back.
    form.update_input("username", "alice").unwrap();
    assert!(!form.snapshot().is_valid_server);
}

#[test]
fn test_uncheckable_inputs_do_not_count() {
    let (form, _, clock) = setup();
    form.update_input("username", "alice").unwrap();

    let state = form.snapshot();
    let company = state.input("company").unwrap();
    assert!(!company.is_checkable);
    assert!(!state.checkable_input_ids.contains(&InputId::new("company")));
    assert!(state.is_valid);

    clock.set(5_000);
    form.toggle_is_checkable("company", true).unwrap();
    let state = form.snapshot();
    let company = state.input("company").unwrap();
    assert!(company.is_checkable);
    assert_eq!(company.time_became_checkable, 5_000);
    assert_eq!(company.local_error_types, vec!["required"]);
    assert_eq!(state.local_error_input_ids, vec![InputId::new("company")]);
    assert!(!state.is_valid);
    assert_invariants(&state);

    clock.set(6_000);
    form.toggle_is_checkable("company", false).unwrap();
    let state = form.snapshot();
    assert_eq!(state.input("company").unwrap().time_became_uncheckable, 6_000);
    assert!(state.is_valid);
    assert_invariants(&state);
}

#[test]
fn test_toggle_is_checkable_without_change_keeps_timestamps() {
    let (form, _, clock) = setup();
    let before = form.snapshot().input("username").unwrap().time_became_checkable;

    clock.set(9_000);
    form.toggle_is_checkable("username", true).unwrap();

    assert_eq!(form.snapshot().input("username").unwrap().time_became_checkable, before);
}

#[test]
fn test_refresh_resets_inputs() {
    let (form, _, clock) = setup();
    form.update_input("username", "alice").unwrap();
    form.toggle_focus("username", true).unwrap();
    form.toggle_focus("username", false).unwrap();
    form.toggle_is_checkable("company", true).unwrap();

    clock.set(7_000);
    form.refresh_form(RefreshOptions::new().initial_value("username", "x"));
    let state = form.snapshot();
    let username = state.input("username").unwrap();
    assert_eq!(username.value, Value::from("x"));
    assert_eq!(username.initial_value, Value::from("x"));
    assert!(!username.is_edited);
    assert!(!username.has_been_unfocused);
    assert_eq!(username.local_error_types, vec!["min_length"]);

    // Back to the configured default.
    assert!(!state.input("company").unwrap().is_checkable);

    assert!(!state.is_focused);
    assert_eq!(state.focused_input_id, None);
    assert_eq!(state.time_refreshed, 7_000);
    assert_eq!(state.time_updated, 7_000);
    assert_invariants(&state);
}

#[test]
fn test_refresh_ignores_unknown_inputs() {
    let (form, _, _) = setup();
    form.refresh_form(RefreshOptions::new().initial_value("nope", "x").checkable("username", false));

    let state = form.snapshot();
    assert!(!state.contains("nope"));
    assert!(!state.input("username").unwrap().is_checkable);
    assert!(state.is_valid);
    assert_invariants(&state);
}

#[test]
fn test_unknown_input_is_rejected() {
    let (form, _, _) = setup();
    let before = form.snapshot();

    assert_eq!(
        form.update_input("nope", "x"),
        Err(FormError::unknown_input("nope"))
    );
    assert!(form.toggle_focus("nope", true).is_err());
    assert!(form.toggle_is_checkable("nope", true).is_err());
    assert!(form.bind("nope").is_err());
    assert!(Arc::ptr_eq(&before, &form.snapshot()));
}

#[test]
fn test_subscribers_see_commits() {
    let (form, _, _) = setup();
    let mut rx = form.subscribe();
    assert!(!rx.has_changed().unwrap());

    form.update_input("username", "alice").unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().value("username"), Some(&Value::from("alice")));
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn test_refresh_wakes_subscribers() {
    let (form, _, clock) = setup();
    let mut rx = form.subscribe();

    clock.set(4_000);
    form.refresh_form(RefreshOptions::new().initial_value("username", "bob"));

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.value("username"), Some(&Value::from("bob")));
    assert_eq!(state.time_refreshed, 4_000);
    assert_invariants(&state);
}
