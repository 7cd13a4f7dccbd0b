use formstore::prelude::*;
use serde_json::json;

fn form() -> FormStore {
    let factory = FormFactory::new(
        ValidatorRegistry::with_builtins(),
        ValueTypes::new().register("text", ValueTypeOptions::new("")),
    );
    let schema = FormSchema::new()
        .input(
            "email",
            InputOptions::new("text").validator("required").validator("email"),
        )
        .input(
            "nickname",
            InputOptions::new("text")
                .validator("trim")
                .validator("max_length")
                .validator_options("max_length", json!({ "max": 8 })),
        );
    factory
        .make_form_with(schema, FormConfig::new().with_focus_settle_delay(std::time::Duration::ZERO))
        .unwrap()
}

#[test]
fn test_errors_hidden_until_blur() {
    let form = form();
    let mut email = form.bind("email").unwrap();

    let view = email.view().unwrap();
    assert!(!view.is_valid);
    assert!(!view.can_show_errors);
    assert!(!view.has_visible_errors);
    assert!(view.should_show_placeholder);
    assert!(view.value_is_empty);

    email.on_focus().unwrap();
    let view = email.view().unwrap();
    assert!(view.is_focused);
    assert!(!view.should_show_placeholder);

    email.on_change("not-an-email").unwrap();
    email.on_blur().unwrap();
    let view = email.view().unwrap();
    assert!(view.can_show_errors);
    assert!(view.has_visible_errors);
    assert_eq!(view.inline_error_texts, vec!["Please enter a valid email"]);
    assert!(view.is_edited);
}

#[test]
fn test_latest_errors_held_after_fix() {
    let form = form();
    let mut email = form.bind("email").unwrap();

    email.on_change("nope").unwrap();
    email.on_blur().unwrap();
    assert_eq!(email.view().unwrap().latest_visible_inline_error_texts, vec!["Please enter a valid email"]);

    email.on_change("ada@example.com").unwrap();
    let view = email.view().unwrap();
    assert!(view.is_valid);
    assert!(view.inline_error_texts.is_empty());
    assert!(!view.has_visible_errors);
    assert_eq!(view.latest_visible_inline_error_texts, vec!["Please enter a valid email"]);
}

#[test]
fn test_server_errors_shown_until_edit() {
    let form = form();
    form.refresh_form(
        RefreshOptions::new()
            .initial_value("email", "ada@example.com")
            .server_errors("email", ["Already registered"]),
    );
    let mut email = form.bind("email").unwrap();

    let view = email.view().unwrap();
    assert!(view.can_show_errors);
    assert!(view.has_visible_errors);
    assert_eq!(view.inline_error_texts, vec!["Already registered"]);

    email.on_change("bob@example.com").unwrap();
    let view = email.view().unwrap();
    assert!(view.is_valid);
    assert!(view.inline_error_texts.is_empty());
    assert_eq!(view.server_error_texts, vec!["Already registered"]);
}

#[test]
fn test_change_through_binding_is_corrected() {
    let form = form();
    let mut nickname = form.bind("nickname").unwrap();

    nickname.on_change("  ada  ").unwrap();
    let view = nickname.view().unwrap();
    assert_eq!(view.value, Value::from("ada"));
    assert!(view.is_valid);

    nickname.on_change("much too long").unwrap();
    nickname.on_blur().unwrap();
    let view = nickname.view().unwrap();
    assert_eq!(view.local_error_types, vec!["max_length"]);
    assert_eq!(view.inline_error_texts, vec!["Must be at most 8 characters"]);
    assert_eq!(view.validators_options["max_length"], json!({ "max": 8 }));
}

#[test]
fn test_bindings_share_the_store() {
    let form = form();
    let email = form.bind("email").unwrap();
    assert_eq!(email.input_id(), &InputId::new("email"));

    email.on_change("ada@example.com").unwrap();
    assert_eq!(form.snapshot().value("email"), Some(&Value::from("ada@example.com")));
    assert!(form.bind("missing").is_err());
}
