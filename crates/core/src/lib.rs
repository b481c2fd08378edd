//! Intake form engine -- field visibility rules, conditional schema
//! validation, and the submission flow.
//!
//! The engine is stateless: callers pass the full current value set on
//! every call and receive a freshly computed result. It holds no form
//! state of its own; values, touched/error metadata, and the per-field
//! visible flag live in the intake-state store.
//!
//! Validation collects every field's message in a single pass (abort-early
//! is disabled). Visibility is a pure function of the current values;
//! conditional requiredness resolves on the controlling field's value, not
//! on its error state.

pub mod person;
pub mod predicate;
pub mod rule;
pub mod submit;
pub mod types;
pub mod validate;
pub mod visibility;

pub use predicate::{eval_pred, Predicate};
pub use rule::{Constraint, DateBound, DateRule, FieldRule, Rule, Schema, TextRule};
pub use submit::{run_submit, SubmitOutcome, SubmitResult};
pub use types::{FieldValues, SchemaError, ValidationResult};
pub use validate::validate;
pub use visibility::{compute_visibility, VisibilityMap, VisibilityRule};

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
