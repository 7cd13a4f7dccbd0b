//! Field snapshots.

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;

use crate::value::Value;

/// Options for every validator a field runs, keyed by validator name.
pub type ValidatorsOptions = HashMap<String, serde_json::Value>;

/// Identifier of one input of a form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InputId(pub String);

impl InputId {
    /// Create a new input ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InputId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&InputId> for InputId {
    fn from(id: &InputId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for InputId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for InputId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for InputId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for InputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of one input: its value, validation outcome, timing and
/// validator configuration.
///
/// Snapshots are never mutated in place once committed; the store clones
/// them on write while building the next form snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputState {
    /// Identity, fixed at creation.
    pub input_id: InputId,
    /// Name of the registered value type, fixed at creation.
    pub value_type: String,

    /// Current value.
    pub value: Value,
    /// Baseline value the field was created or last refreshed with.
    pub initial_value: Value,

    /// Validator names to run, value-type defaults first.
    pub validator_types: Vec<String>,
    /// Options for each validator, field options overriding value-type options.
    pub validators_options: ValidatorsOptions,

    /// Validators that produced a message, in run order.
    pub local_error_types: Vec<String>,
    /// Message produced by each failing validator.
    pub local_error_text_by_error_type: HashMap<String, String>,
    /// Externally supplied server errors.
    pub server_error_texts: Vec<String>,

    pub is_valid_local: bool,
    pub is_valid_server: bool,
    pub is_valid: bool,
    pub is_edited: bool,
    pub is_checkable: bool,
    pub is_focused: bool,
    pub has_been_unfocused: bool,

    pub time_updated: i64,
    pub time_focused: i64,
    pub time_unfocused: i64,
    pub time_became_checkable: i64,
    pub time_became_uncheckable: i64,
}

impl InputState {
    /// Create a pristine snapshot holding `initial_value`.
    pub fn new(
        input_id: InputId,
        value_type: impl Into<String>,
        initial_value: Value,
        validator_types: Vec<String>,
        validators_options: ValidatorsOptions,
    ) -> Self {
        Self {
            input_id,
            value_type: value_type.into(),
            value: initial_value.clone(),
            initial_value,
            validator_types,
            validators_options,
            local_error_types: Vec::new(),
            local_error_text_by_error_type: HashMap::new(),
            server_error_texts: Vec::new(),
            is_valid_local: true,
            is_valid_server: true,
            is_valid: true,
            is_edited: false,
            is_checkable: true,
            is_focused: false,
            has_been_unfocused: false,
            time_updated: 0,
            time_focused: 0,
            time_unfocused: 0,
            time_became_checkable: 0,
            time_became_uncheckable: 0,
        }
    }

    /// Options configured for one validator, or `Null` when none were given.
    pub fn validator_options(&self, validator_type: &str) -> &serde_json::Value {
        static NULL: serde_json::Value = serde_json::Value::Null;
        self.validators_options.get(validator_type).unwrap_or(&NULL)
    }

    /// Local error messages in validator run order.
    pub fn local_error_texts(&self) -> Vec<&str> {
        self.local_error_types
            .iter()
            .filter_map(|error_type| self.local_error_text_by_error_type.get(error_type))
            .map(String::as_str)
            .collect()
    }

    /// Re-derive `is_edited` from the current and initial values.
    pub(crate) fn refresh_edited(&mut self) {
        self.is_edited = self.value != self.initial_value;
    }

    /// Re-derive the validity flags from the stored errors.
    ///
    /// Server errors stop counting once the field has been edited; a new edit
    /// invalidates the previous server verdict until the next refresh.
    pub(crate) fn refresh_validity(&mut self) {
        self.is_valid_local = self.local_error_types.is_empty();
        self.is_valid_server = self.server_error_texts.is_empty() || self.is_edited;
        self.is_valid = self.is_valid_local && self.is_valid_server;
    }
}
