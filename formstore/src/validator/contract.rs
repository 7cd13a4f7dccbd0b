//! The call contract every validator satisfies.

use serde::de::DeserializeOwned;

use crate::form::FormState;
use crate::input::{InputId, InputState};
use crate::value::Value;

/// Everything a validator gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorParams<'a> {
    /// The value being checked. This can differ from `input_state.value`
    /// when an earlier validator in the same pass corrected it.
    pub value: &'a Value,
    /// The input being checked.
    pub input_id: &'a InputId,
    /// Snapshot of the input being checked.
    pub input_state: &'a InputState,
    /// The form draft the check runs against.
    pub form_state: &'a FormState,
    /// This validator's options for this input (`Null` when none were set).
    pub validator_options: &'a serde_json::Value,
}

impl ValidatorParams<'_> {
    /// Deserialize this validator's options.
    pub fn options<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        parse_options(self.validator_options)
    }

    /// Current value of another input of the form.
    pub fn other_value(&self, input_id: &str) -> Option<&Value> {
        self.form_state.value(input_id)
    }
}

/// Deserialize loosely typed validator options, treating missing options as
/// an empty object.
pub fn parse_options<T: DeserializeOwned>(options: &serde_json::Value) -> Result<T, serde_json::Error> {
    if options.is_null() {
        serde_json::from_value(serde_json::Value::Object(serde_json::Map::new()))
    } else {
        T::deserialize(options)
    }
}

/// Structured validator result.
///
/// With neither `message` nor `edited_value` the input passes this
/// validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorResult {
    /// Error message to show for this validator.
    pub message: Option<String>,
    /// Replacement value; the input is rechecked against it.
    pub edited_value: Option<Value>,
    /// Inputs to recheck after this one.
    pub revalidate_other_input_ids: Vec<InputId>,
}

impl ValidatorResult {
    /// Create an empty (passing) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the checked value.
    pub fn edited_value(mut self, value: impl Into<Value>) -> Self {
        self.edited_value = Some(value.into());
        self
    }

    /// Ask for another input to be rechecked.
    pub fn revalidate(mut self, input_id: impl Into<InputId>) -> Self {
        self.revalidate_other_input_ids.push(input_id.into());
        self
    }
}

/// What a validator returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidatorOutcome {
    /// The value passes.
    #[default]
    Valid,
    /// Shorthand for a message-only failure.
    Error(String),
    /// Message, correction and/or revalidation requests.
    Result(ValidatorResult),
}

impl ValidatorOutcome {
    /// Message-only failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Check if the outcome is a plain pass.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<ValidatorResult> for ValidatorOutcome {
    fn from(result: ValidatorResult) -> Self {
        Self::Result(result)
    }
}

impl From<String> for ValidatorOutcome {
    fn from(message: String) -> Self {
        Self::Error(message)
    }
}

impl From<&str> for ValidatorOutcome {
    fn from(message: &str) -> Self {
        Self::Error(message.to_string())
    }
}

impl From<Option<String>> for ValidatorOutcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(Self::Valid, Self::Error)
    }
}

/// A named check run against input values.
///
/// Validators must be synchronous and free of side effects: the resolver may
/// call the same validator several times within one pass.
pub trait Validator: Send + Sync {
    /// Check a value.
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome;

    /// Check the options an input configures for this validator.
    ///
    /// Called once per input when a form is built; an `Err` aborts
    /// construction with the returned reason.
    fn check_options(&self, _options: &serde_json::Value) -> Result<(), String> {
        Ok(())
    }
}

impl<F> Validator for F
where
    F: Fn(&ValidatorParams<'_>) -> ValidatorOutcome + Send + Sync,
{
    fn validate(&self, params: &ValidatorParams<'_>) -> ValidatorOutcome {
        self(params)
    }
}

/// Pin a closure to the validator signature.
///
/// Helps type inference when a closure validator is stored before being
/// registered.
pub fn make_validator<F>(validator: F) -> F
where
    F: Fn(&ValidatorParams<'_>) -> ValidatorOutcome + Send + Sync,
{
    validator
}
