//! Local validation resolver.
//!
//! Given one input, works out every input that has to be checked, runs their
//! validators and collects the outcome per input. The resolver only reads the
//! form draft; the store writes the returned [`Resolution`] back.
//!
//! Three rules keep a pass finite:
//!
//! - an input is resolved at most once per pass; revalidation requests for an
//!   input already visited are dropped (the input that started the pass is
//!   visited first, so A → B → A never recurses back into A, and neither do
//!   longer chains like A → B → C → A);
//! - a corrected value is only re-checked when it differs from the value just
//!   checked;
//! - at most `max_edit_passes` corrections are followed per input.

use std::collections::{HashMap, HashSet};

use log::{trace, warn};

use crate::form::FormState;
use crate::input::InputId;
use crate::validator::{ValidatorOutcome, ValidatorParams, ValidatorRegistry};
use crate::value::Value;

/// Validation outcome of one input within a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputValidation {
    /// Validators that produced a message, in run order.
    pub error_types: Vec<String>,
    /// Message per failing validator.
    pub error_texts_by_error_type: HashMap<String, String>,
    /// Corrected value, if a validator replaced the input's value.
    pub edited_value: Option<Value>,
}

impl InputValidation {
    fn record(&mut self, validator_type: &str, message: String) {
        if !self.error_types.iter().any(|t| t == validator_type) {
            self.error_types.push(validator_type.to_string());
        }
        self.error_texts_by_error_type
            .insert(validator_type.to_string(), message);
    }

    fn clear_errors(&mut self) {
        self.error_types.clear();
        self.error_texts_by_error_type.clear();
    }
}

/// Everything one resolution pass produced.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    results: HashMap<InputId, InputValidation>,
    order: Vec<InputId>,
}

impl Resolution {
    /// Outcome for one input, if the pass touched it.
    pub fn get(&self, input_id: &str) -> Option<&InputValidation> {
        self.results.get(input_id)
    }

    /// Inputs in the order the pass first reached them.
    pub fn visited(&self) -> &[InputId] {
        &self.order
    }

    /// Number of inputs the pass touched.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the pass touched no input (the start input was not checkable).
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the resolution, yielding outcomes in visit order.
    pub fn into_ordered(mut self) -> Vec<(InputId, InputValidation)> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.results.remove(&id).map(|result| (id, result)))
            .collect()
    }

    fn has_visited(&self, input_id: &InputId) -> bool {
        self.results.contains_key(input_id)
    }

    fn entry(&mut self, input_id: &InputId) -> &mut InputValidation {
        if !self.results.contains_key(input_id) {
            self.order.push(input_id.clone());
        }
        self.results.entry(input_id.clone()).or_default()
    }
}

/// Runs validators for inputs of one form draft.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    validators: &'a ValidatorRegistry,
    form: &'a FormState,
    max_edit_passes: usize,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a form draft.
    pub fn new(validators: &'a ValidatorRegistry, form: &'a FormState, max_edit_passes: usize) -> Self {
        Self {
            validators,
            form,
            max_edit_passes,
        }
    }

    /// Resolve one input and everything its validators pull in.
    pub fn resolve(&self, input_id: &InputId) -> Resolution {
        let mut resolution = Resolution::default();
        self.visit(input_id, &mut resolution, None, 0);
        resolution
    }

    fn visit(
        &self,
        input_id: &InputId,
        resolution: &mut Resolution,
        original_input_id: Option<&InputId>,
        edit_pass: usize,
    ) {
        let Some(input) = self.form.input(input_id.as_str()) else {
            warn!("Revalidation requested for unknown input '{}'", input_id);
            return;
        };
        if !input.is_checkable {
            trace!("Skipping uncheckable input '{}'", input_id);
            return;
        }

        let entry = resolution.entry(input_id);
        if edit_pass > 0 {
            // errors so far were found on the value that just got replaced
            entry.clear_errors();
        }
        let value_to_check = entry.edited_value.clone().unwrap_or_else(|| input.value.clone());
        trace!(
            "Resolving '{}' (pass {}) with value {:?}",
            input_id, edit_pass, value_to_check
        );

        for validator_type in &input.validator_types {
            let Some(validator) = self.validators.get(validator_type) else {
                warn!("Input '{}' runs unknown validator '{}'", input_id, validator_type);
                continue;
            };
            let params = ValidatorParams {
                value: &value_to_check,
                input_id,
                input_state: input,
                form_state: self.form,
                validator_options: input.validator_options(validator_type),
            };
            let outcome = validator.validate(&params);
            trace!("'{}' on '{}': {:?}", validator_type, input_id, outcome);

            let result = match outcome {
                ValidatorOutcome::Valid => continue,
                ValidatorOutcome::Error(message) => {
                    resolution.entry(input_id).record(validator_type, message);
                    continue;
                }
                ValidatorOutcome::Result(result) => result,
            };

            if let Some(edited_value) = result.edited_value
                && edited_value != value_to_check
            {
                resolution.entry(input_id).edited_value = Some(edited_value);
                if edit_pass + 1 >= self.max_edit_passes {
                    warn!(
                        "Input '{}' was corrected {} times in one pass; keeping the last correction unchecked",
                        input_id,
                        edit_pass + 1
                    );
                    return;
                }
                // the re-entry checks the corrected value with every validator,
                // so whatever this stale run would still report is dropped
                self.visit(input_id, resolution, original_input_id, edit_pass + 1);
                return;
            }

            if let Some(message) = result.message {
                resolution.entry(input_id).record(validator_type, message);
            }

            let origin = original_input_id.unwrap_or(input_id);
            for other_input_id in &result.revalidate_other_input_ids {
                if other_input_id == origin || resolution.has_visited(other_input_id) {
                    trace!(
                        "Not revalidating '{}' from '{}': already resolved in this pass",
                        other_input_id, input_id
                    );
                    continue;
                }
                self.visit(other_input_id, resolution, Some(origin), 0);
            }
        }
    }
}
