//! Process exit codes for the `odsc` binary.
//! These are part of the public contract; scripts branch on them.

use odsc_core::EvalError;

pub const SUCCESS: i32 = 0;
pub const VALIDATION_FAILED: i32 = 1; // Submission rejected, nothing written
pub const INTERNAL_ERROR: i32 = 2; // Storage failure or unexpected error
pub const NOT_FOUND: i32 = 3; // Artifact not created yet
pub const NO_DATA: i32 = 4; // Ledger has no evaluation rows
pub const CONFIG_ERROR: i32 = 5;

pub fn for_error(err: &EvalError) -> i32 {
    match err {
        EvalError::Validation(_) => VALIDATION_FAILED,
        EvalError::Storage { .. } => INTERNAL_ERROR,
        EvalError::NotFound { .. } => NOT_FOUND,
        EvalError::NoData => NO_DATA,
        EvalError::Config(_) => CONFIG_ERROR,
    }
}
