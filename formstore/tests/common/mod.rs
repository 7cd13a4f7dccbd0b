//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use formstore::prelude::*;
use serde_json::json;

/// Assert every snapshot-level invariant.
pub fn assert_invariants(form: &FormState) {
    for input in form.inputs() {
        assert_eq!(
            form.form_values.get(&input.input_id),
            Some(&input.value),
            "form_values out of step for '{}'",
            input.input_id
        );
        assert_eq!(input.is_edited, input.value != input.initial_value);
        assert_eq!(input.is_valid, input.is_valid_local && input.is_valid_server);
    }

    let local_invalid: Vec<&InputId> = form
        .inputs()
        .filter(|i| i.is_checkable && !i.local_error_types.is_empty())
        .map(|i| &i.input_id)
        .collect();
    assert_eq!(form.local_error_input_ids.iter().collect::<Vec<_>>(), local_invalid);
    assert_eq!(form.is_valid_local, local_invalid.is_empty());

    let server_invalid: Vec<&InputId> = form
        .inputs()
        .filter(|i| i.is_checkable && !i.server_error_texts.is_empty() && !i.is_edited)
        .map(|i| &i.input_id)
        .collect();
    assert_eq!(form.server_error_input_ids.iter().collect::<Vec<_>>(), server_invalid);
    assert_eq!(form.is_valid_server, server_invalid.is_empty());
    assert_eq!(form.is_valid, form.is_valid_local && form.is_valid_server);

    let checkable: Vec<&InputId> = form.inputs().filter(|i| i.is_checkable).map(|i| &i.input_id).collect();
    assert_eq!(form.checkable_input_ids.iter().collect::<Vec<_>>(), checkable);
    assert_eq!(form.is_checkable, !checkable.is_empty());
    assert_eq!(form.is_edited, form.inputs().any(|i| i.is_edited));

    assert!(form.inputs().filter(|i| i.is_focused).count() <= 1);
    if let Some(focused) = form.inputs().find(|i| i.is_focused) {
        assert_eq!(form.focused_input_id.as_ref(), Some(&focused.input_id));
    }
}

/// Call log shared with validators registered by [`factory`].
pub type Calls = Arc<Mutex<Vec<String>>>;

/// Factory with the built-ins plus a `partner` validator that logs each call
/// and asks to revalidate the input named in its `partner` option.
pub fn factory(calls: &Calls) -> FormFactory {
    let log = Arc::clone(calls);
    let validators = ValidatorRegistry::with_builtins().register_fn(
        "partner",
        move |params: &ValidatorParams<'_>| {
            log.lock().unwrap().push(params.input_id.to_string());
            match params.validator_options.get("partner").and_then(|p| p.as_str()) {
                Some(partner) => ValidatorResult::new().revalidate(partner).into(),
                None => ValidatorOutcome::Valid,
            }
        },
    );
    let value_types = ValueTypes::new()
        .register("text", ValueTypeOptions::new(""))
        .register(
            "number",
            ValueTypeOptions::new(0i64)
                .validator("clamp")
                .validator_options("clamp", json!({ "min": 0, "max": 10 })),
        )
        .register("toggle", ValueTypeOptions::new(false));
    FormFactory::new(validators, value_types)
}

/// Sign-up style schema used across tests.
pub fn signup_schema() -> FormSchema {
    FormSchema::new()
        .input(
            "username",
            InputOptions::new("text")
                .validator("required")
                .validator("min_length")
                .validator_options("min_length", json!({ "min": 3 })),
        )
        .input(
            "password",
            InputOptions::new("text")
                .validator("partner")
                .validator_options("partner", json!({ "partner": "confirm_password" })),
        )
        .input(
            "confirm_password",
            InputOptions::new("text")
                .validator("partner")
                .validator_options("partner", json!({ "partner": "password" })),
        )
        .input("age", InputOptions::new("number").initial_value(5i64))
        .input(
            "company",
            InputOptions::new("text").validator("required").checkable(false),
        )
}

/// Deterministic config: manual clock, settle checks queued on a manual
/// scheduler.
pub fn manual_config(clock: &Arc<ManualClock>, scheduler: &Arc<ManualScheduler>) -> FormConfig {
    FormConfig::new()
        .with_clock(Arc::clone(clock) as Arc<dyn Clock>)
        .with_scheduler(Arc::clone(scheduler) as Arc<dyn Scheduler>)
        .with_focus_settle_delay(Duration::from_millis(50))
}
