//! Error types

use thiserror::Error;

/// Problems with a form's static configuration, reported when the form is
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The schema declares no inputs.
    #[error("Form has no inputs")]
    EmptyForm,

    /// The same input id appears twice in the schema.
    #[error("Input '{input_id}' is configured more than once")]
    DuplicateInput { input_id: String },

    /// An input names a value type that was never registered.
    #[error("Input '{input_id}' uses unknown value type '{value_type}'")]
    UnknownValueType { input_id: String, value_type: String },

    /// A value type or input names a validator that was never registered.
    #[error("{owner} references unknown validator '{validator}'")]
    UnknownValidator { owner: String, validator: String },

    /// A validator rejected the options an input configures for it.
    #[error("Invalid options for validator '{validator}' on input '{input_id}': {reason}")]
    InvalidValidatorOptions {
        input_id: String,
        validator: String,
        reason: String,
    },
}

/// Errors returned by form operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The operation named an input the form does not have.
    #[error("Unknown input '{0}'")]
    UnknownInput(String),
}

impl FormError {
    /// Creates a new unknown input error.
    pub fn unknown_input(input_id: impl Into<String>) -> Self {
        Self::UnknownInput(input_id.into())
    }
}
