//! Per-input view models for UI bindings.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::FormError;
use crate::input::{InputId, InputState, ValidatorsOptions};
use crate::store::FormStore;
use crate::value::Value;

/// Keeps the last value that was flagged as defined.
///
/// Used to let error texts fade out instead of vanishing the moment the
/// errors clear.
#[derive(Debug, Clone, Default)]
pub struct LatestDefined<T> {
    latest: Option<T>,
}

impl<T: Clone> LatestDefined<T> {
    /// Create an empty hold.
    pub fn new() -> Self {
        Self { latest: None }
    }

    /// Return `value` if it is defined (remembering it), otherwise the last
    /// defined value. The very first value is remembered either way.
    pub fn hold(&mut self, value: T, is_defined: bool) -> T {
        match &self.latest {
            Some(latest) if !is_defined => latest.clone(),
            _ => {
                self.latest = Some(value.clone());
                value
            }
        }
    }
}

/// Everything a UI needs to render one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputView {
    pub value: Value,
    pub is_focused: bool,
    pub is_edited: bool,
    pub is_valid: bool,
    /// Errors may be shown: the input was blurred with local errors, or has
    /// server errors.
    pub can_show_errors: bool,
    /// Errors may be shown and there are some.
    pub has_visible_errors: bool,
    /// Local error texts, then server error texts while they still apply.
    pub inline_error_texts: Vec<String>,
    /// `inline_error_texts`, or the last non-empty version of it.
    pub latest_visible_inline_error_texts: Vec<String>,
    pub local_error_types: Vec<String>,
    pub local_error_text_by_error_type: HashMap<String, String>,
    pub server_error_texts: Vec<String>,
    pub should_show_placeholder: bool,
    pub validators_options: ValidatorsOptions,
    pub value_is_empty: bool,
}

impl InputView {
    /// Project an input snapshot, updating the fade-out hold.
    pub fn project(input: &InputState, latest_errors: &mut LatestDefined<Vec<String>>) -> Self {
        let can_show_server_errors = !input.is_valid_server;
        let can_show_local_errors = (input.has_been_unfocused && !input.local_error_types.is_empty())
            || !input.server_error_texts.is_empty();
        let can_show_errors = can_show_local_errors || can_show_server_errors;

        let mut inline_error_texts: Vec<String> =
            input.local_error_texts().into_iter().map(str::to_string).collect();
        if can_show_server_errors {
            inline_error_texts.extend(input.server_error_texts.iter().cloned());
        }
        let has_inline_errors = !inline_error_texts.is_empty();
        let latest_visible_inline_error_texts = latest_errors.hold(inline_error_texts.clone(), has_inline_errors);

        let value_is_empty = input.value.is_empty_text();

        Self {
            value: input.value.clone(),
            is_focused: input.is_focused,
            is_edited: input.is_edited,
            is_valid: input.is_valid,
            can_show_errors,
            has_visible_errors: can_show_errors && !input.is_valid,
            inline_error_texts,
            latest_visible_inline_error_texts,
            local_error_types: input.local_error_types.clone(),
            local_error_text_by_error_type: input.local_error_text_by_error_type.clone(),
            server_error_texts: input.server_error_texts.clone(),
            should_show_placeholder: value_is_empty && !input.is_focused,
            validators_options: input.validators_options.clone(),
            value_is_empty,
        }
    }
}

/// One input of a store, bound for a UI widget.
///
/// Owns the fade-out hold for error texts, so keep one binding per rendered
/// widget.
///
/// # Example
///
/// ```
/// use formstore::prelude::*;
///
/// let factory = FormFactory::new(
///     ValidatorRegistry::with_builtins(),
///     ValueTypes::new().register("text", ValueTypeOptions::new("").validator("required")),
/// );
/// let form = factory.make_form(FormSchema::new().input("name", InputOptions::new("text"))).unwrap();
/// let mut name = form.bind("name").unwrap();
///
/// name.on_focus().unwrap();
/// name.on_blur().unwrap();
/// assert_eq!(name.view().unwrap().inline_error_texts, vec!["This field is required"]);
///
/// name.on_change("Ada").unwrap();
/// let view = name.view().unwrap();
/// assert!(view.inline_error_texts.is_empty());
/// assert_eq!(view.latest_visible_inline_error_texts, vec!["This field is required"]);
/// ```
#[derive(Debug)]
pub struct InputBinding {
    store: FormStore,
    input_id: InputId,
    latest_errors: LatestDefined<Vec<String>>,
}

impl InputBinding {
    /// The bound input.
    pub fn input_id(&self) -> &InputId {
        &self.input_id
    }

    /// Project the input from the latest snapshot.
    pub fn view(&mut self) -> Option<InputView> {
        let snapshot = self.store.snapshot();
        let input = snapshot.input(self.input_id.as_str())?;
        Some(InputView::project(input, &mut self.latest_errors))
    }

    /// Forward a new value.
    pub fn on_change(&self, value: impl Into<Value>) -> Result<(), FormError> {
        self.store.update_input(self.input_id.as_str(), value)
    }

    /// Forward focus entering the widget.
    pub fn on_focus(&self) -> Result<(), FormError> {
        self.store.toggle_focus(self.input_id.as_str(), true)
    }

    /// Forward focus leaving the widget.
    pub fn on_blur(&self) -> Result<(), FormError> {
        self.store.toggle_focus(self.input_id.as_str(), false)
    }
}

impl FormStore {
    /// Bind one input for a UI widget.
    pub fn bind(&self, input_id: &str) -> Result<InputBinding, FormError> {
        let snapshot = self.snapshot();
        let input = snapshot
            .input(input_id)
            .ok_or_else(|| FormError::unknown_input(input_id))?;
        Ok(InputBinding {
            store: self.clone(),
            input_id: input.input_id.clone(),
            latest_errors: LatestDefined::new(),
        })
    }
}
