//! The form store: committed snapshots and the operations that replace them.
//!
//! Every operation clones the latest snapshot into a draft, edits the draft,
//! recomputes the form aggregates and publishes the draft as the next
//! snapshot in one step. Readers only ever see committed snapshots.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::{debug, warn};
use tokio::sync::watch;

use crate::aggregate;
use crate::config::FormConfig;
use crate::error::FormError;
use crate::focus;
use crate::form::FormState;
use crate::input::InputId;
use crate::resolve::Resolver;
use crate::validator::ValidatorRegistry;
use crate::value::Value;

/// Configured fallbacks an input is reset to by [`FormStore::refresh_form`].
#[derive(Debug, Clone)]
pub(crate) struct InputDefaults {
    /// Configured initial value, or the value type's blank value.
    pub initial_value: Value,
    /// Configured checkable flag, or `true`.
    pub is_checkable: bool,
}

/// Overrides applied by [`FormStore::refresh_form`].
///
/// Inputs without an override fall back to their configured defaults:
/// initial value, then the value type's blank value; configured checkable
/// flag, then `true`; no server errors.
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub initial_values: HashMap<InputId, Value>,
    pub is_checkable: HashMap<InputId, bool>,
    pub server_errors: HashMap<InputId, Vec<String>>,
}

impl RefreshOptions {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new initial value of an input.
    pub fn initial_value(mut self, input_id: impl Into<InputId>, value: impl Into<Value>) -> Self {
        self.initial_values.insert(input_id.into(), value.into());
        self
    }

    /// Set whether an input is checkable after the refresh.
    pub fn checkable(mut self, input_id: impl Into<InputId>, is_checkable: bool) -> Self {
        self.is_checkable.insert(input_id.into(), is_checkable);
        self
    }

    /// Set the server errors of an input.
    pub fn server_errors<S: Into<String>>(
        mut self,
        input_id: impl Into<InputId>,
        errors: impl IntoIterator<Item = S>,
    ) -> Self {
        self.server_errors
            .insert(input_id.into(), errors.into_iter().map(Into::into).collect());
        self
    }

    fn unknown_ids<'a>(&'a self, defaults: &'a HashMap<InputId, InputDefaults>) -> impl Iterator<Item = &'a InputId> {
        self.initial_values
            .keys()
            .chain(self.is_checkable.keys())
            .chain(self.server_errors.keys())
            .filter(move |id| !defaults.contains_key(*id))
    }
}

struct StoreInner {
    validators: Arc<ValidatorRegistry>,
    defaults: HashMap<InputId, InputDefaults>,
    config: FormConfig,
    state: watch::Sender<Arc<FormState>>,
}

/// Owned state of one form.
///
/// `FormStore` is a cheap handle: clones share the same form. Subscribers
/// get every committed snapshot through [`FormStore::subscribe`].
///
/// # Example
///
/// ```
/// use formstore::prelude::*;
///
/// let factory = FormFactory::new(
///     ValidatorRegistry::with_builtins(),
///     ValueTypes::new().register("text", ValueTypeOptions::new("")),
/// );
/// let form = factory
///     .make_form(FormSchema::new().input("name", InputOptions::new("text").validator("required")))
///     .unwrap();
///
/// assert!(!form.snapshot().is_valid);
/// form.update_input("name", "Ada").unwrap();
/// assert!(form.snapshot().is_valid);
/// ```
#[derive(Clone)]
pub struct FormStore {
    inner: Arc<StoreInner>,
}

/// Weak handle to a [`FormStore`].
#[derive(Clone)]
pub struct WeakFormStore {
    inner: Weak<StoreInner>,
}

impl WeakFormStore {
    /// Get the store back if it is still alive.
    pub fn upgrade(&self) -> Option<FormStore> {
        self.inner.upgrade().map(|inner| FormStore { inner })
    }
}

impl FormStore {
    /// Build a store around pristine inputs and run the initial validation
    /// pass, so the first snapshot already satisfies every invariant.
    pub(crate) fn new(
        validators: Arc<ValidatorRegistry>,
        defaults: HashMap<InputId, InputDefaults>,
        config: FormConfig,
        initial: FormState,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        let store = Self {
            inner: Arc::new(StoreInner {
                validators,
                defaults,
                config,
                state,
            }),
        };
        store.publish("initialise", |draft| {
            store.reset_inputs(draft, &RefreshOptions::default(), 0);
        });
        store
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> Arc<FormState> {
        self.inner.state.borrow().clone()
    }

    /// Receive every snapshot committed from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FormState>> {
        self.inner.state.subscribe()
    }

    /// Runtime configuration of this store.
    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    /// Validators this form runs.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.inner.validators
    }

    /// Get a weak handle to this store.
    pub fn downgrade(&self) -> WeakFormStore {
        WeakFormStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Set an input's value and revalidate everything it affects.
    pub fn update_input(&self, input_id: &str, new_value: impl Into<Value>) -> Result<(), FormError> {
        let input_id = self.known_input(input_id)?;
        let new_value = new_value.into();
        let now = self.now();
        debug!("update_input '{}' -> {:?}", input_id, new_value);

        self.commit("update_input", |draft| {
            draft.set_value(&input_id, new_value, now);
            self.revalidate_in_place(draft, &input_id, now);
            if let Some(input) = draft.input_mut(input_id.as_str()) {
                input.refresh_validity();
            }
            Ok(true)
        })
        .map(|_| ())
    }

    /// Record focus entering or leaving an input.
    ///
    /// Focus entering takes form focus immediately (and from any other input
    /// still marked focused). Focus leaving marks the input unfocused at once,
    /// but form focus is only cleared after
    /// [`FormConfig::focus_settle_delay`], and only if no input took focus in
    /// between.
    pub fn toggle_focus(&self, input_id: &str, is_focused: bool) -> Result<(), FormError> {
        let input_id = self.known_input(input_id)?;
        let now = self.now();
        debug!("toggle_focus '{}' -> {}", input_id, is_focused);

        self.commit("toggle_focus", |draft| {
            if is_focused {
                let others: Vec<InputId> = draft
                    .inputs()
                    .filter(|input| input.is_focused && input.input_id != input_id)
                    .map(|input| input.input_id.clone())
                    .collect();
                for other in others {
                    if let Some(input) = draft.input_mut(other.as_str()) {
                        input.is_focused = false;
                    }
                }
            }

            let input = draft
                .input_mut(input_id.as_str())
                .ok_or_else(|| FormError::unknown_input(input_id.as_str()))?;
            input.is_focused = is_focused;
            if is_focused {
                input.time_focused = now;
                draft.focused_input_id = Some(input_id.clone());
                draft.is_focused = true;
                draft.time_focused = now;
            } else {
                input.has_been_unfocused = true;
                input.time_unfocused = now;
            }
            Ok(true)
        })?;

        if !is_focused {
            focus::schedule_settle(self, input_id, now);
        }
        Ok(())
    }

    /// Clear form focus if `input_id` still holds it.
    ///
    /// Runs when the settle delay after a blur elapses; callers driving
    /// their own timers can call it directly. Returns `true` if form focus
    /// was cleared.
    pub fn settle_focus(&self, input_id: &str, blurred_at: i64) -> bool {
        self.commit("settle_focus", |draft| {
            let still_focused_here = draft.focused_input_id.as_ref().is_some_and(|id| id == input_id)
                && draft.input(input_id).is_some_and(|input| !input.is_focused);
            if !still_focused_here {
                return Ok(false);
            }
            draft.focused_input_id = None;
            draft.is_focused = false;
            draft.time_unfocused = blurred_at;
            draft.has_been_unfocused = true;
            Ok(true)
        })
        .unwrap_or(false)
    }

    /// Include an input in validation or leave it out (e.g. while hidden).
    pub fn toggle_is_checkable(&self, input_id: &str, is_checkable: bool) -> Result<(), FormError> {
        let input_id = self.known_input(input_id)?;
        let now = self.now();
        debug!("toggle_is_checkable '{}' -> {}", input_id, is_checkable);

        self.commit("toggle_is_checkable", |draft| {
            let input = draft
                .input_mut(input_id.as_str())
                .ok_or_else(|| FormError::unknown_input(input_id.as_str()))?;
            let changed = input.is_checkable != is_checkable;
            input.is_checkable = is_checkable;
            if changed {
                if is_checkable {
                    input.time_became_checkable = now;
                } else {
                    input.time_became_uncheckable = now;
                }
            }

            self.revalidate_in_place(draft, &input_id, now);
            if let Some(input) = draft.input_mut(input_id.as_str()) {
                input.refresh_validity();
            }
            Ok(true)
        })
        .map(|_| ())
    }

    /// Reset every input to a new baseline and revalidate the whole form.
    ///
    /// Values, initial values, server errors and checkable flags are reset;
    /// validator configuration is left alone. Overrides naming unknown
    /// inputs are ignored.
    pub fn refresh_form(&self, options: RefreshOptions) {
        for unknown in options.unknown_ids(&self.inner.defaults) {
            warn!("refresh_form: ignoring override for unknown input '{}'", unknown);
        }
        let now = self.now();
        debug!("refresh_form");

        self.publish("refresh_form", |draft| {
            self.reset_inputs(draft, &options, now);
            draft.focused_input_id = None;
            draft.is_focused = false;
            draft.has_been_unfocused = false;
            draft.time_updated = now;
            draft.time_refreshed = now;
            draft.time_focused = 0;
            draft.time_unfocused = 0;
        });
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn now(&self) -> i64 {
        self.inner.config.clock.now_millis()
    }

    fn known_input(&self, input_id: &str) -> Result<InputId, FormError> {
        self.inner
            .defaults
            .get_key_value(input_id)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| FormError::unknown_input(input_id))
    }

    /// Build a draft from the latest snapshot, let `edit` change it and
    /// publish it with fresh aggregates. `edit` returning `Ok(false)` leaves
    /// the snapshot untouched and wakes no subscriber.
    fn commit<F>(&self, operation: &str, edit: F) -> Result<bool, FormError>
    where
        F: FnOnce(&mut FormState) -> Result<bool, FormError>,
    {
        let mut outcome = Ok(false);
        self.inner.state.send_if_modified(|current| {
            let mut draft = FormState::clone(current);
            match edit(&mut draft) {
                Ok(true) => {
                    aggregate::apply(&mut draft);
                    *current = Arc::new(draft);
                    outcome = Ok(true);
                    true
                }
                Ok(false) => false,
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        match &outcome {
            Ok(true) => debug!("{}: committed", operation),
            Ok(false) => debug!("{}: nothing to commit", operation),
            Err(e) => debug!("{}: rejected: {}", operation, e),
        }
        outcome
    }

    /// Like [`Self::commit`] for edits that always apply.
    fn publish<F>(&self, operation: &str, edit: F)
    where
        F: FnOnce(&mut FormState),
    {
        self.inner.state.send_modify(|current| {
            let mut draft = FormState::clone(current);
            edit(&mut draft);
            aggregate::apply(&mut draft);
            *current = Arc::new(draft);
        });
        debug!("{}: committed", operation);
    }

    /// Resolve one input and write every outcome of the pass into the draft.
    fn revalidate_in_place(&self, draft: &mut FormState, input_id: &InputId, now: i64) {
        let resolution =
            Resolver::new(&self.inner.validators, draft, self.inner.config.max_edit_passes).resolve(input_id);

        for (touched, result) in resolution.into_ordered() {
            if let Some(edited_value) = result.edited_value
                && draft.value(touched.as_str()) != Some(&edited_value)
            {
                draft.set_value(&touched, edited_value, now);
            }
            if let Some(input) = draft.input_mut(touched.as_str()) {
                input.local_error_types = result.error_types;
                input.local_error_text_by_error_type = result.error_texts_by_error_type;
                input.refresh_validity();
            }
        }
    }

    /// Reset every input, then revalidate each against the reset form.
    fn reset_inputs(&self, draft: &mut FormState, options: &RefreshOptions, now: i64) {
        let input_ids = draft.all_input_ids.clone();

        for input_id in &input_ids {
            let Some(defaults) = self.inner.defaults.get(input_id) else {
                continue;
            };
            let initial_value = options
                .initial_values
                .get(input_id)
                .cloned()
                .unwrap_or_else(|| defaults.initial_value.clone());
            let server_errors = options.server_errors.get(input_id).cloned().unwrap_or_default();
            let is_checkable = options
                .is_checkable
                .get(input_id)
                .copied()
                .unwrap_or(defaults.is_checkable);

            let Some(input) = draft.input_mut(input_id.as_str()) else {
                continue;
            };
            input.value = initial_value.clone();
            input.initial_value = initial_value.clone();
            input.time_updated = now;
            input.is_edited = false;
            input.is_focused = false;
            input.has_been_unfocused = false;
            input.server_error_texts = server_errors;
            input.local_error_types.clear();
            input.local_error_text_by_error_type.clear();
            input.is_checkable = is_checkable;
            if is_checkable {
                input.time_became_checkable = now;
            } else {
                input.time_became_uncheckable = now;
            }
            input.refresh_validity();
            draft.form_values.insert(input_id.clone(), initial_value);
        }

        for input_id in &input_ids {
            self.revalidate_in_place(draft, input_id, now);
        }
    }
}

impl std::fmt::Debug for FormStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormStore")
            .field("config", &self.inner.config)
            .field("state", &self.snapshot())
            .finish()
    }
}
