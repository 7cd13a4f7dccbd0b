//! Form state with recursive field validation.
//!
//! A form is built once from static configuration and then only replaced,
//! snapshot by snapshot, through four operations: `update_input`,
//! `toggle_focus`, `toggle_is_checkable` and `refresh_form`. Each operation
//! revalidates the inputs it affects (following corrections and
//! cross-input revalidation requests) and recomputes form-level validity.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod factory;
pub mod focus;
pub mod form;
pub mod input;
pub mod resolve;
pub mod store;
pub mod validator;
pub mod value;
pub mod view;

pub use factory::FormFactory;
pub use form::FormState;
pub use input::{InputId, InputState};
pub use store::FormStore;
pub use value::Value;

pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{FormConfig, FormSchema, InputOptions, ValueTypeOptions, ValueTypes};
    pub use crate::error::{ConfigError, FormError};
    pub use crate::factory::FormFactory;
    pub use crate::focus::{ManualScheduler, Scheduler, TokioScheduler};
    pub use crate::form::FormState;
    pub use crate::input::{InputId, InputState};
    pub use crate::store::{FormStore, RefreshOptions};
    pub use crate::validator::{
        TextPatterns, Validator, ValidatorOutcome, ValidatorParams, ValidatorRegistry, ValidatorResult,
    };
    pub use crate::value::Value;
    pub use crate::view::{InputBinding, InputView, LatestDefined};
}
