//! Submission flow.
//!
//! Submission walks a fixed state machine:
//! Editing -> Validating -> { Rejected (back to editing, errors attached)
//! | Submitted }. Submission is all-or-nothing per attempt: there is no
//! retry policy and no partial submission. On success the full current
//! value set is emitted exactly once to the caller's sink as a single
//! structured JSON event, with no coercion and no trimming.

use crate::rule::Schema;
use crate::types::{FieldValues, SchemaError, ValidationResult};
use crate::validate::validate;

/// Terminal outcome of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The value set validated clean and was emitted to the sink.
    Submitted,
    /// At least one field failed validation; nothing was emitted.
    Rejected,
}

/// Result of a submission attempt.
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub outcome: SubmitOutcome,
    /// Per-field messages from the validation pass. Empty on success; on
    /// rejection these attach to their fields' display metadata.
    pub errors: ValidationResult,
}

/// Run one submission attempt.
///
/// Validates the full value set, then either invokes `on_success` exactly
/// once with the serialized value set, or returns the collected errors. A
/// `SchemaError` from the validation pass propagates -- it is never folded
/// into the result.
///
/// # Arguments
/// * `values` - Current raw values for every field
/// * `schema` - Ordered field rules
/// * `on_success` - Opaque external sink for the emitted value set
pub fn run_submit<F>(
    values: &FieldValues,
    schema: &Schema,
    on_success: F,
) -> Result<SubmitResult, SchemaError>
where
    F: FnOnce(serde_json::Value),
{
    let errors = validate(values, schema)?;

    if !errors.is_valid() {
        return Ok(SubmitResult {
            outcome: SubmitOutcome::Rejected,
            errors,
        });
    }

    on_success(values.to_json());
    Ok(SubmitResult {
        outcome: SubmitOutcome::Submitted,
        errors,
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
