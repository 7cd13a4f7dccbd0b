//! Two-staged form construction.
//!
//! A [`FormFactory`] is built once from the validator and value-type
//! registries; it then builds any number of forms from per-form schemas,
//! checking each schema against the registries before the form exists.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::config::{FormConfig, FormSchema, InputOptions, ValueTypeOptions, ValueTypes};
use crate::error::ConfigError;
use crate::form::FormState;
use crate::input::{InputId, InputState, ValidatorsOptions};
use crate::store::{FormStore, InputDefaults};
use crate::validator::ValidatorRegistry;

/// Builds forms against a fixed set of validators and value types.
#[derive(Debug, Clone)]
pub struct FormFactory {
    validators: Arc<ValidatorRegistry>,
    value_types: ValueTypes,
}

impl FormFactory {
    /// Create a factory.
    pub fn new(validators: ValidatorRegistry, value_types: ValueTypes) -> Self {
        Self {
            validators: Arc::new(validators),
            value_types,
        }
    }

    /// Validators shared by every form of this factory.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Value types known to this factory.
    pub fn value_types(&self) -> &ValueTypes {
        &self.value_types
    }

    /// Build a form with the default runtime configuration.
    pub fn make_form(&self, schema: FormSchema) -> Result<FormStore, ConfigError> {
        self.make_form_with(schema, FormConfig::default())
    }

    /// Build a form.
    pub fn make_form_with(&self, schema: FormSchema, config: FormConfig) -> Result<FormStore, ConfigError> {
        if schema.is_empty() {
            return Err(ConfigError::EmptyForm);
        }

        let mut seen = HashSet::new();
        let mut inputs = Vec::with_capacity(schema.len());
        let mut defaults = HashMap::with_capacity(schema.len());

        for (input_id, options) in schema.inputs {
            if !seen.insert(input_id.clone()) {
                return Err(ConfigError::DuplicateInput {
                    input_id: input_id.to_string(),
                });
            }
            let value_type = self.value_types.get(&options.value_type).ok_or_else(|| {
                ConfigError::UnknownValueType {
                    input_id: input_id.to_string(),
                    value_type: options.value_type.clone(),
                }
            })?;

            let input = self.make_input(&input_id, &options, value_type)?;
            defaults.insert(
                input_id.clone(),
                InputDefaults {
                    initial_value: input.initial_value.clone(),
                    is_checkable: options.default_is_checkable.unwrap_or(true),
                },
            );
            inputs.push(input);
        }

        debug!("Built form with {} inputs", inputs.len());
        Ok(FormStore::new(
            Arc::clone(&self.validators),
            defaults,
            config,
            FormState::new(inputs),
        ))
    }

    fn make_input(
        &self,
        input_id: &InputId,
        options: &InputOptions,
        value_type: &ValueTypeOptions,
    ) -> Result<InputState, ConfigError> {
        let mut validator_types: Vec<String> = Vec::new();
        for name in value_type.default_validators.iter().chain(&options.default_validators) {
            if !self.validators.contains(name) {
                return Err(ConfigError::UnknownValidator {
                    owner: format!("Input '{}' (value type '{}')", input_id, options.value_type),
                    validator: name.clone(),
                });
            }
            if !validator_types.contains(name) {
                validator_types.push(name.clone());
            }
        }

        let mut validators_options: ValidatorsOptions = value_type.default_validators_options.clone();
        validators_options.extend(
            options
                .default_validators_options
                .iter()
                .map(|(name, opts)| (name.clone(), opts.clone())),
        );

        let no_options = serde_json::Value::Null;
        for name in &validator_types {
            let Some(validator) = self.validators.get(name) else {
                continue;
            };
            let opts = validators_options.get(name).unwrap_or(&no_options);
            validator
                .check_options(opts)
                .map_err(|reason| ConfigError::InvalidValidatorOptions {
                    input_id: input_id.to_string(),
                    validator: name.clone(),
                    reason,
                })?;
        }

        let initial_value = options
            .default_initial_value
            .clone()
            .unwrap_or_else(|| value_type.blank_value.clone());

        Ok(InputState::new(
            input_id.clone(),
            options.value_type.clone(),
            initial_value,
            validator_types,
            validators_options,
        ))
    }
}
