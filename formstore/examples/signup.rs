//! A sign-up form driven by scripted UI events.
//!
//! Run with `cargo run -p formstore --example signup`; debug logs go to
//! `signup.log`.

use std::fs::File;
use std::time::Duration;

use formstore::prelude::*;
use log::info;
use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};

fn factory() -> FormFactory {
    let patterns = TextPatterns::new();
    let validators = ValidatorRegistry::with_builtins()
        .register_fn(
            "not_reserved",
            |params: &ValidatorParams<'_>| match params.value.as_text() {
                Some("admin") | Some("root") => ValidatorOutcome::error("This name is reserved"),
                _ => ValidatorOutcome::Valid,
            },
        )
        .register_fn("strong_password", move |params: &ValidatorParams<'_>| {
            if patterns.string_doesnt_match(params.value, "a_number") {
                ValidatorOutcome::error("Add at least one digit")
            } else if patterns.string_doesnt_match(params.value, "an_uppercase_letter") {
                ValidatorOutcome::error("Add at least one uppercase letter")
            } else {
                ValidatorOutcome::Valid
            }
        });
    let value_types = ValueTypes::new()
        .register("text", ValueTypeOptions::new("").validator("trim"))
        .register(
            "age",
            ValueTypeOptions::new(18i64)
                .validator("clamp")
                .validator_options("clamp", json!({ "min": 13, "max": 120 })),
        )
        .register("toggle", ValueTypeOptions::new(false));
    FormFactory::new(validators, value_types)
}

fn schema() -> FormSchema {
    FormSchema::new()
        .input(
            "username",
            InputOptions::new("text")
                .validator("required")
                .validator("not_reserved")
                .validator("min_length")
                .validator_options("min_length", json!({ "min": 3 })),
        )
        .input("email", InputOptions::new("text").validator("required").validator("email"))
        .input(
            "password",
            InputOptions::new("text")
                .validator("required")
                .validator("strong_password")
                .validator("matches_input")
                .validator_options("matches_input", json!({ "input_id": "confirm_password" })),
        )
        .input(
            "confirm_password",
            InputOptions::new("text")
                .validator("matches_input")
                .validator_options("matches_input", json!({ "input_id": "password" })),
        )
        .input("age", InputOptions::new("age"))
        .input("has_referral", InputOptions::new("toggle"))
        .input(
            "referral_code",
            InputOptions::new("text")
                .validator("required")
                .checkable(false),
        )
}

fn report(form: &FormStore, step: &str) {
    let state = form.snapshot();
    println!("== {step}");
    for input in state.inputs() {
        let mut line = format!("  {:<16} {:<24}", input.input_id.as_str(), input.value.to_string());
        if !input.is_checkable {
            line.push_str(" (skipped)");
        }
        for text in input.local_error_texts() {
            line.push_str(&format!(" [{text}]"));
        }
        for text in &input.server_error_texts {
            line.push_str(&format!(" <{text}>"));
        }
        println!("{line}");
    }
    println!(
        "  valid={} edited={} focused={:?}",
        state.is_valid, state.is_edited, state.focused_input_id
    );
}

#[tokio::main]
async fn main() {
    if let Ok(log_file) = File::create("signup.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let form = match factory().make_form(schema()) {
        Ok(form) => form,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    report(&form, "empty form");

    let mut changes = form.subscribe();
    let watcher = tokio::spawn(async move {
        let mut commits = 0usize;
        while changes.changed().await.is_ok() {
            commits += 1;
        }
        commits
    });

    let steps: Vec<(&str, Value)> = vec![
        ("username", "  admin ".into()),
        ("username", "ada".into()),
        ("email", "ada@example".into()),
        ("email", "ada@example.com".into()),
        ("password", "correct horse".into()),
        ("password", "Correct horse 9".into()),
        ("confirm_password", "Correct hose 9".into()),
        ("confirm_password", "Correct horse 9".into()),
        ("age", 7i64.into()),
    ];
    for (input_id, value) in steps {
        let Ok(mut binding) = form.bind(input_id) else {
            continue;
        };
        let _ = binding.on_focus();
        let _ = binding.on_change(value);
        let _ = binding.on_blur();
        if let Some(view) = binding.view()
            && view.has_visible_errors
        {
            info!("'{}' shows {:?}", input_id, view.inline_error_texts);
        }
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    report(&form, "after typing");

    let _ = form.update_input("has_referral", true);
    let _ = form.toggle_is_checkable("referral_code", true);
    report(&form, "referral enabled");

    form.refresh_form(
        RefreshOptions::new()
            .initial_value("username", "ada")
            .initial_value("email", "ada@example.com")
            .server_errors("username", ["That username is taken"]),
    );
    report(&form, "server rejected the submission");

    let _ = form.update_input("username", "ada_l");
    report(&form, "username edited");

    drop(form);
    if let Ok(commits) = watcher.await {
        println!("{commits} snapshots observed");
    }
}
