//! Form-level flags derived from the per-input snapshots.
//!
//! Everything here is recomputed from scratch at the end of every operation;
//! a single input change can flip form validity either way, so nothing is
//! maintained incrementally.

use crate::form::FormState;
use crate::input::{InputId, InputState};

/// Inputs currently taking part in validation.
pub fn checkable_ids(draft: &FormState) -> Vec<InputId> {
    ids_where(draft, |input| input.is_checkable)
}

/// Checkable inputs failing their local validators.
pub fn local_invalid_ids(draft: &FormState) -> Vec<InputId> {
    ids_where(draft, |input| input.is_checkable && !input.is_valid_local)
}

/// Checkable inputs with server errors that have not been edited since.
pub fn server_invalid_ids(draft: &FormState) -> Vec<InputId> {
    ids_where(draft, |input| input.is_checkable && !input.is_valid_server)
}

/// Whether any input differs from its initial value.
pub fn form_is_edited(draft: &FormState) -> bool {
    draft.inputs().any(|input| input.is_edited)
}

/// Recompute every aggregate of a draft in place.
pub(crate) fn apply(draft: &mut FormState) {
    let local_invalid = local_invalid_ids(draft);
    let server_invalid = server_invalid_ids(draft);
    let checkable = checkable_ids(draft);

    draft.is_valid_local = local_invalid.is_empty();
    draft.is_valid_server = server_invalid.is_empty();
    draft.is_valid = draft.is_valid_local && draft.is_valid_server;
    draft.is_checkable = !checkable.is_empty();
    draft.is_edited = form_is_edited(draft);

    draft.local_error_input_ids = local_invalid;
    draft.server_error_input_ids = server_invalid;
    draft.checkable_input_ids = checkable;
}

fn ids_where(
    draft: &FormState,
    predicate: impl Fn(&InputState) -> bool,
) -> Vec<InputId> {
    draft
        .inputs()
        .filter(|input| predicate(input))
        .map(|input| input.input_id.clone())
        .collect()
}
