//! Form snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::input::{InputId, InputState};
use crate::value::Value;

/// Immutable snapshot of a whole form.
///
/// A new snapshot is committed after every operation; fields are shared
/// between snapshots through `Arc` and only cloned when an operation touches
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    /// Every input of the form, in configuration order. Fixed at creation.
    pub all_input_ids: Vec<InputId>,
    /// Per-input snapshots.
    pub input_states: HashMap<InputId, Arc<InputState>>,
    /// Current value of every input, mirrored from `input_states`.
    pub form_values: HashMap<InputId, Value>,
    /// The input holding focus, if any.
    pub focused_input_id: Option<InputId>,

    /// Checkable inputs with local errors.
    pub local_error_input_ids: Vec<InputId>,
    /// Checkable, unedited inputs with server errors.
    pub server_error_input_ids: Vec<InputId>,
    /// Inputs currently taking part in validation.
    pub checkable_input_ids: Vec<InputId>,

    pub is_valid: bool,
    pub is_valid_local: bool,
    pub is_valid_server: bool,
    pub is_edited: bool,
    pub is_focused: bool,
    pub has_been_unfocused: bool,
    pub is_checkable: bool,

    pub time_updated: i64,
    pub time_refreshed: i64,
    pub time_focused: i64,
    pub time_unfocused: i64,
}

impl FormState {
    /// Build a snapshot from pristine inputs. Aggregates are left for the
    /// caller to compute.
    pub(crate) fn new(inputs: Vec<InputState>) -> Self {
        let all_input_ids: Vec<InputId> = inputs.iter().map(|i| i.input_id.clone()).collect();
        let form_values = inputs
            .iter()
            .map(|i| (i.input_id.clone(), i.value.clone()))
            .collect();
        let input_states = inputs
            .into_iter()
            .map(|i| (i.input_id.clone(), Arc::new(i)))
            .collect();

        Self {
            all_input_ids,
            input_states,
            form_values,
            focused_input_id: None,
            local_error_input_ids: Vec::new(),
            server_error_input_ids: Vec::new(),
            checkable_input_ids: Vec::new(),
            is_valid: true,
            is_valid_local: true,
            is_valid_server: true,
            is_edited: false,
            is_focused: false,
            has_been_unfocused: false,
            is_checkable: true,
            time_updated: 0,
            time_refreshed: 0,
            time_focused: 0,
            time_unfocused: 0,
        }
    }

    /// Snapshot of one input.
    pub fn input(&self, input_id: &str) -> Option<&InputState> {
        self.input_states.get(input_id).map(Arc::as_ref)
    }

    /// Current value of one input.
    pub fn value(&self, input_id: &str) -> Option<&Value> {
        self.form_values.get(input_id)
    }

    /// Whether the form knows this input.
    pub fn contains(&self, input_id: &str) -> bool {
        self.input_states.contains_key(input_id)
    }

    /// Iterate inputs in configuration order.
    pub fn inputs(&self) -> impl Iterator<Item = &InputState> {
        self.all_input_ids
            .iter()
            .filter_map(|id| self.input_states.get(id).map(Arc::as_ref))
    }

    /// Mutable access to one input of a draft, cloning it if it is still
    /// shared with a committed snapshot.
    pub(crate) fn input_mut(&mut self, input_id: &str) -> Option<&mut InputState> {
        self.input_states.get_mut(input_id).map(Arc::make_mut)
    }

    /// Write a new value into a draft, keeping `form_values` in step.
    pub(crate) fn set_value(&mut self, input_id: &InputId, value: Value, now: i64) {
        if let Some(input) = self.input_mut(input_id.as_str()) {
            input.value = value.clone();
            input.time_updated = now;
            input.refresh_edited();
            self.form_values.insert(input_id.clone(), value);
            self.time_updated = now;
        }
    }
}
