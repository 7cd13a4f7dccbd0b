//! Name-to-validator lookup shared by every form built from one factory.

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::contract::{Validator, ValidatorOutcome, ValidatorParams};

/// Registry mapping validator names to implementations.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validators.
    ///
    /// See [`builtin`] for the names and their options.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(builtin::REQUIRED, builtin::Required)
            .register(builtin::MIN_LENGTH, builtin::MinLength)
            .register(builtin::MAX_LENGTH, builtin::MaxLength)
            .register(builtin::PATTERN, builtin::Pattern::default())
            .register(builtin::EMAIL, builtin::Email)
            .register(builtin::CLAMP, builtin::Clamp)
            .register(builtin::TRIM, builtin::Trim)
            .register(builtin::MATCHES_INPUT, builtin::MatchesInput)
    }

    /// Register a validator, replacing any validator with the same name.
    pub fn register(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    /// Register a closure validator.
    pub fn register_fn<F>(self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&ValidatorParams<'_>) -> ValidatorOutcome + Send + Sync + 'static,
    {
        self.register(name, validator)
    }

    /// Look up a validator.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Validator>> {
        self.validators.get(name)
    }

    /// Check if a validator is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}
