//! Form configuration types.
//!
//! Static configuration (value types and per-input options) describes what
//! a form contains; [`FormConfig`] holds the runtime knobs of one store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::focus::{Scheduler, TokioScheduler};
use crate::input::{InputId, ValidatorsOptions};
use crate::value::Value;

/// Defaults shared by every input of one value type.
#[derive(Debug, Clone, Default)]
pub struct ValueTypeOptions {
    /// Value of a blank input.
    pub blank_value: Value,
    /// Validators every input of this type runs first.
    pub default_validators: Vec<String>,
    /// Options for those validators.
    pub default_validators_options: ValidatorsOptions,
}

impl ValueTypeOptions {
    /// Create options with the given blank value.
    pub fn new(blank_value: impl Into<Value>) -> Self {
        Self {
            blank_value: blank_value.into(),
            ..Default::default()
        }
    }

    /// Add a default validator.
    pub fn validator(mut self, name: impl Into<String>) -> Self {
        self.default_validators.push(name.into());
        self
    }

    /// Set the default options of a validator.
    pub fn validator_options(mut self, name: impl Into<String>, options: serde_json::Value) -> Self {
        self.default_validators_options.insert(name.into(), options);
        self
    }
}

/// Registry of value types, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ValueTypes {
    types: HashMap<String, ValueTypeOptions>,
}

impl ValueTypes {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value type.
    pub fn register(mut self, name: impl Into<String>, options: ValueTypeOptions) -> Self {
        self.types.insert(name.into(), options);
        self
    }

    /// Look up a value type.
    pub fn get(&self, name: &str) -> Option<&ValueTypeOptions> {
        self.types.get(name)
    }

    /// Iterate registered value types.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueTypeOptions)> {
        self.types.iter().map(|(name, options)| (name.as_str(), options))
    }
}

/// Configuration of a single input.
#[derive(Debug, Clone)]
pub struct InputOptions {
    /// Name of the input's value type.
    pub value_type: String,
    /// Initial value; the value type's blank value when absent.
    pub default_initial_value: Option<Value>,
    /// Validators run after the value type's defaults.
    pub default_validators: Vec<String>,
    /// Options overriding the value type's validator options.
    pub default_validators_options: ValidatorsOptions,
    /// Whether the input starts out checkable (default `true`).
    pub default_is_checkable: Option<bool>,
}

impl InputOptions {
    /// Create options for an input of the given value type.
    pub fn new(value_type: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            default_initial_value: None,
            default_validators: Vec::new(),
            default_validators_options: ValidatorsOptions::new(),
            default_is_checkable: None,
        }
    }

    /// Set the initial value.
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.default_initial_value = Some(value.into());
        self
    }

    /// Add a validator.
    pub fn validator(mut self, name: impl Into<String>) -> Self {
        self.default_validators.push(name.into());
        self
    }

    /// Set the options of a validator.
    pub fn validator_options(mut self, name: impl Into<String>, options: serde_json::Value) -> Self {
        self.default_validators_options.insert(name.into(), options);
        self
    }

    /// Set whether the input starts out checkable.
    pub fn checkable(mut self, is_checkable: bool) -> Self {
        self.default_is_checkable = Some(is_checkable);
        self
    }
}

/// Ordered set of inputs making up a form.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    pub(crate) inputs: Vec<(InputId, InputOptions)>,
}

impl FormSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input. Inputs keep the order they are added in.
    pub fn input(mut self, input_id: impl Into<InputId>, options: InputOptions) -> Self {
        self.inputs.push((input_id.into(), options));
        self
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Check if the schema has no inputs.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Runtime configuration of one form store.
#[derive(Clone)]
pub struct FormConfig {
    /// How long a blurred input keeps the form focused, so tabbing between
    /// inputs does not flicker form focus. Zero settles immediately.
    ///
    /// Default: 50 ms
    pub focus_settle_delay: Duration,

    /// How many times one input's value may be corrected within a single
    /// resolution pass before the resolver stops re-checking it.
    ///
    /// Default: 8
    pub max_edit_passes: usize,

    /// Source of timestamps.
    pub clock: Arc<dyn Clock>,

    /// Runs the delayed focus-settle check.
    pub scheduler: Arc<dyn Scheduler>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            focus_settle_delay: Duration::from_millis(50),
            max_edit_passes: 8,
            clock: Arc::new(SystemClock),
            scheduler: Arc::new(TokioScheduler),
        }
    }
}

impl FormConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the focus settle delay.
    pub fn with_focus_settle_delay(mut self, delay: Duration) -> Self {
        self.focus_settle_delay = delay;
        self
    }

    /// Sets the maximum number of value corrections per input and pass.
    pub fn with_max_edit_passes(mut self, passes: usize) -> Self {
        self.max_edit_passes = passes.max(1);
        self
    }

    /// Sets the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }
}

impl std::fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormConfig")
            .field("focus_settle_delay", &self.focus_settle_delay)
            .field("max_edit_passes", &self.max_edit_passes)
            .finish_non_exhaustive()
    }
}
