//! Built-in validators.
//!
//! | Name | Options | Behaviour |
//! |------|---------|-----------|
//! | `required` | `message?` | fails on null, blank text and empty lists |
//! | `min_length` | `min`, `message?` | fails on non-empty text shorter than `min` characters |
//! | `max_length` | `max`, `message?` | fails on text longer than `max` characters |
//! | `pattern` | `regex`, `message?` | fails on non-empty text not matching `regex` |
//! | `email` | `message?` | fails on non-empty text that is not an email address |
//! | `clamp` | `min?`, `max?` | corrects numbers into `[min, max]` |
//! | `trim` | none | corrects text with surrounding whitespace |
//! | `matches_input` | `input_id`, `message?` | fails when the value differs from another input, and rechecks that input |

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;
use serde::Deserialize;

use super::contract::{Validator, ValidatorOutcome, ValidatorParams, ValidatorResult, parse_options};
use crate::value::Value;

pub const REQUIRED: &str = "required";
pub const MIN_LENGTH: &str = "min_length";
pub const MAX_LENGTH: &str = "max_length";
pub const PATTERN: &str = "pattern";
pub const EMAIL: &str = "email";
pub const CLAMP: &str = "clamp";
pub const TRIM: &str = "trim";
pub const MATCHES_INPUT: &str = "matches_input";

fn check<T: for<'de> Deserialize<'de>>(options: &serde_json::Value) -> Result<(), String> {
    parse_options::<T>(options).map(|_| ()).map_err(|e| e.to_string())
}

/// Options read from `params`, or a failure outcome naming the bad options.
///
/// Construction already checked the options, so the error arm only fires
/// for forms built around the factory.
fn options<T: for<'de> Deserialize<'de>>(params: &ValidatorParams<'_>) -> Result<T, ValidatorOutcome> {
    params.options::<T>().map_err(|e| {
        log::warn!(
            "Invalid options for validator on input '{}': {}",
            params.input_id,
            e
        );
        ValidatorOutcome::error(format!("Invalid validator options: {}", e))
    })
}

fn char_count(value: &Value) -> Option<usize> {
    value
        .as_text()
        .filter(|text| !text.is_empty())
        .map(|text| text.chars().count())
}

// -----------------------------------------------------------------------------
// required
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageOptions {
    message: Option<String>,
}

/// Rejects missing values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator for Required {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: MessageOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        let missing = match params.value {
            Value::Null => true,
            Value::Text(text) => text.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        };
        if missing {
            ValidatorOutcome::Error(opts.message.unwrap_or_else(|| "This field is required".to_string()))
        } else {
            ValidatorOutcome::Valid
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<MessageOptions>(options)
    }
}

// -----------------------------------------------------------------------------
// min_length / max_length
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MinLengthOptions {
    min: usize,
    message: Option<String>,
}

/// Rejects text shorter than `min` characters. Empty text passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinLength;

impl Validator for MinLength {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: MinLengthOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        match char_count(params.value) {
            Some(count) if count < opts.min => ValidatorOutcome::Error(
                opts.message
                    .unwrap_or_else(|| format!("Must be at least {} characters", opts.min)),
            ),
            _ => ValidatorOutcome::Valid,
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<MinLengthOptions>(options)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaxLengthOptions {
    max: usize,
    message: Option<String>,
}

/// Rejects text longer than `max` characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLength;

impl Validator for MaxLength {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: MaxLengthOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        match char_count(params.value) {
            Some(count) if count > opts.max => ValidatorOutcome::Error(
                opts.message
                    .unwrap_or_else(|| format!("Must be at most {} characters", opts.max)),
            ),
            _ => ValidatorOutcome::Valid,
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<MaxLengthOptions>(options)
    }
}

// -----------------------------------------------------------------------------
// pattern / email
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternOptions {
    regex: String,
    message: Option<String>,
}

/// Rejects non-empty text not matching `regex`.
///
/// Compiled regexes are cached per pattern string.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    compiled: Arc<RwLock<HashMap<String, Regex>>>,
}

impl Pattern {
    fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        if let Some(regex) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Ok(regex.clone());
        }
        let regex = Regex::new(pattern)?;
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

impl Validator for Pattern {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: PatternOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        let Some(text) = params.value.as_text().filter(|text| !text.is_empty()) else {
            return ValidatorOutcome::Valid;
        };
        match self.compile(&opts.regex) {
            Ok(regex) if regex.is_match(text) => ValidatorOutcome::Valid,
            Ok(_) => ValidatorOutcome::Error(opts.message.unwrap_or_else(|| "Invalid format".to_string())),
            Err(e) => ValidatorOutcome::error(format!("Invalid validator options: {}", e)),
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        let opts: PatternOptions = parse_options(options).map_err(|e| e.to_string())?;
        self.compile(&opts.regex).map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Rejects non-empty text that is not an email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Validator for Email {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: MessageOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        match params.value.as_text() {
            Some(text) if !text.is_empty() && !email_address::EmailAddress::is_valid(text) => {
                ValidatorOutcome::Error(
                    opts.message
                        .unwrap_or_else(|| "Please enter a valid email".to_string()),
                )
            }
            _ => ValidatorOutcome::Valid,
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<MessageOptions>(options)
    }
}

// -----------------------------------------------------------------------------
// clamp / trim
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClampOptions {
    min: Option<f64>,
    max: Option<f64>,
}

/// Corrects numbers into `[min, max]`. Integers stay integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clamp;

impl Validator for Clamp {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: ClampOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        let Some(number) = params.value.as_f64() else {
            return ValidatorOutcome::Valid;
        };
        let mut clamped = number;
        if let Some(max) = opts.max {
            clamped = clamped.min(max);
        }
        if let Some(min) = opts.min {
            clamped = clamped.max(min);
        }
        if clamped == number {
            return ValidatorOutcome::Valid;
        }
        let edited = match params.value {
            Value::Int(_) if clamped > number => Value::Int(clamped.ceil() as i64),
            Value::Int(_) => Value::Int(clamped.floor() as i64),
            _ => Value::Float(clamped),
        };
        ValidatorResult::new().edited_value(edited).into()
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        let opts: ClampOptions = parse_options(options).map_err(|e| e.to_string())?;
        match (opts.min, opts.max) {
            (Some(min), Some(max)) if min > max => Err(format!("min {} is greater than max {}", min, max)),
            _ => Ok(()),
        }
    }
}

/// Corrects text with leading or trailing whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl Validator for Trim {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        match params.value.as_text() {
            Some(text) if text.trim() != text => ValidatorResult::new().edited_value(text.trim()).into(),
            _ => ValidatorOutcome::Valid,
        }
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<serde_json::Map<String, serde_json::Value>>(options).and_then(|_| {
            if options.as_object().is_none_or(|map| map.is_empty()) {
                Ok(())
            } else {
                Err("trim takes no options".to_string())
            }
        })
    }
}

// -----------------------------------------------------------------------------
// matches_input
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchesInputOptions {
    input_id: String,
    message: Option<String>,
}

/// Requires the value to equal another input's value, and asks for that
/// input to be rechecked so pairs like password/confirmation stay in step.
///
/// An empty value passes; pair with `required` to reject it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchesInput;

impl Validator for MatchesInput {
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        let opts: MatchesInputOptions = match options(params) {
            Ok(opts) => opts,
            Err(outcome) => return outcome,
        };
        let mut result = ValidatorResult::new().revalidate(opts.input_id.as_str());
        let other = params.other_value(&opts.input_id);
        if !params.value.is_empty_text() && other != Some(params.value) {
            result = result.message(
                opts.message
                    .unwrap_or_else(|| format!("Does not match {}", opts.input_id)),
            );
        }
        result.into()
    }

    fn check_options(&self, options: &serde_json::Value) -> Result<(), String> {
        check::<MatchesInputOptions>(options)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::form::FormState;
    use crate::input::{InputId, InputState, ValidatorsOptions};

    fn run(validator: &dyn Validator, value: Value, options: serde_json::Value) -> ValidatorOutcome {
        run_in(validator, value, options, &[])
    }

    fn run_in(
        validator: &dyn Validator,
        value: Value,
        options: serde_json::Value,
        others: &[(&str, Value)],
    ) -> ValidatorOutcome {
        let mut inputs = vec![InputState::new(
            InputId::from("field"),
            "text",
            value.clone(),
            Vec::new(),
            ValidatorsOptions::new(),
        )];
        for (id, other) in others {
            inputs.push(InputState::new(
                InputId::from(*id),
                "text",
                other.clone(),
                Vec::new(),
                ValidatorsOptions::new(),
            ));
        }
        let form = FormState::new(inputs);
        let input_id = InputId::from("field");
        let params = ValidatorParams {
            value: &value,
            input_id: &input_id,
            input_state: form.input("field").unwrap(),
            form_state: &form,
            validator_options: &options,
        };
        validator.validate(&params)
    }

    #[test]
    fn test_required() {
        assert!(run(&Required, Value::from("x"), json!(null)).is_valid());
        assert!(run(&Required, Value::from(false), json!(null)).is_valid());
        assert_eq!(
            run(&Required, Value::from("  "), json!(null)),
            ValidatorOutcome::error("This field is required")
        );
        assert_eq!(
            run(&Required, Value::Null, json!({ "message": "Name please" })),
            ValidatorOutcome::error("Name please")
        );
    }

    #[test]
    fn test_lengths_count_characters() {
        let opts = json!({ "min": 3 });
        assert!(run(&MinLength, Value::from("äöü"), opts.clone()).is_valid());
        assert!(!run(&MinLength, Value::from("ab"), opts.clone()).is_valid());
        assert!(run(&MinLength, Value::from(""), opts).is_valid());

        let opts = json!({ "max": 2, "message": "Too long" });
        assert_eq!(run(&MaxLength, Value::from("abc"), opts), ValidatorOutcome::error("Too long"));
    }

    #[test]
    fn test_length_options_are_required() {
        assert!(MinLength.check_options(&json!(null)).is_err());
        assert!(MinLength.check_options(&json!({ "min": 1 })).is_ok());
        assert!(MaxLength.check_options(&json!({ "max": 1, "extra": true })).is_err());
    }

    #[test]
    fn test_pattern() {
        let pattern = Pattern::default();
        let opts = json!({ "regex": r"^\d+$" });
        assert!(run(&pattern, Value::from("123"), opts.clone()).is_valid());
        assert!(!run(&pattern, Value::from("12a"), opts.clone()).is_valid());
        assert!(run(&pattern, Value::from(""), opts).is_valid());
        assert!(pattern.check_options(&json!({ "regex": "(" })).is_err());
    }

    #[test]
    fn test_email() {
        assert!(run(&Email, Value::from("ada@example.com"), json!(null)).is_valid());
        assert!(run(&Email, Value::from(""), json!(null)).is_valid());
        assert!(!run(&Email, Value::from("ada@"), json!(null)).is_valid());
    }

    #[test]
    fn test_clamp_edits_out_of_range_numbers() {
        let opts = json!({ "min": 0, "max": 10 });
        assert_eq!(
            run(&Clamp, Value::from(15i64), opts.clone()),
            ValidatorOutcome::Result(ValidatorResult::new().edited_value(10i64))
        );
        assert_eq!(
            run(&Clamp, Value::from(-0.5), opts.clone()),
            ValidatorOutcome::Result(ValidatorResult::new().edited_value(0.0))
        );
        assert!(run(&Clamp, Value::from(7i64), opts.clone()).is_valid());
        assert!(run(&Clamp, Value::from("15"), opts).is_valid());
        assert!(Clamp.check_options(&json!({ "min": 5, "max": 1 })).is_err());
    }

    #[test]
    fn test_trim() {
        assert_eq!(
            run(&Trim, Value::from(" ada "), json!(null)),
            ValidatorOutcome::Result(ValidatorResult::new().edited_value("ada"))
        );
        assert!(run(&Trim, Value::from("ada"), json!(null)).is_valid());
        assert!(Trim.check_options(&json!({ "x": 1 })).is_err());
        assert!(Trim.check_options(&json!({})).is_ok());
    }

    #[test]
    fn test_matches_input() {
        let opts = json!({ "input_id": "password" });
        let outcome = run_in(
            &MatchesInput,
            Value::from("secret"),
            opts.clone(),
            &[("password", Value::from("secret"))],
        );
        assert_eq!(
            outcome,
            ValidatorOutcome::Result(ValidatorResult::new().revalidate("password"))
        );

        let outcome = run_in(
            &MatchesInput,
            Value::from("secreT"),
            opts,
            &[("password", Value::from("secret"))],
        );
        assert_eq!(
            outcome,
            ValidatorOutcome::Result(
                ValidatorResult::new()
                    .revalidate("password")
                    .message("Does not match password")
            )
        );
    }
}
