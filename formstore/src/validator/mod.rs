//! Validators for form inputs.
//!
//! A validator is a pure function from a value (plus the input and form it
//! belongs to) to a [`ValidatorOutcome`]. Outcomes are data: a validator can
//! pass, fail with a message, correct the value it was given, or ask for
//! other inputs to be rechecked.
//!
//! # Example
//!
//! ```
//! use formstore::validator::{ValidatorOutcome, ValidatorParams, ValidatorRegistry};
//!
//! let validators = ValidatorRegistry::with_builtins().register_fn(
//!     "no_admin",
//!     |params: &ValidatorParams<'_>| match params.value.as_text() {
//!         Some("admin") => ValidatorOutcome::error("That name is reserved"),
//!         _ => ValidatorOutcome::Valid,
//!     },
//! );
//! assert!(validators.contains("no_admin"));
//! assert!(validators.contains("required"));
//! ```

pub mod builtin;
mod contract;
pub mod patterns;
mod registry;

pub use contract::{
    Validator, ValidatorOutcome, ValidatorParams, ValidatorResult, make_validator, parse_options,
};
pub use patterns::TextPatterns;
pub use registry::ValidatorRegistry;
