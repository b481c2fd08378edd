//! Schema validation pass.
//!
//! All fields are validated independently in schema order. Evaluation does
//! not stop at the first failure -- every field's message is collected into
//! the result in the same pass. Conditional overrides resolve on the
//! controlling field's current value, not on whether that field itself
//! currently has an error.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::predicate::eval_pred;
use crate::rule::{Constraint, DateRule, Rule, Schema};
use crate::types::{FieldValues, SchemaError, ValidationResult};

/// Calendar dates are entered as `YYYY-MM-DD`.
static DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Validate the full value set against a schema.
///
/// Returns the per-field message mapping; an empty result means every field
/// is valid. Structural schema defects abort the pass with a `SchemaError`
/// instead of appearing in the mapping.
///
/// # Arguments
/// * `values` - Current raw values for every field
/// * `schema` - Ordered field rules
pub fn validate(
    values: &FieldValues,
    schema: &Schema,
) -> Result<ValidationResult, SchemaError> {
    schema.check()?;

    let mut result = ValidationResult::new();
    for field_rule in &schema.fields {
        let constraint = resolve_rule(&field_rule.rule, values);
        let value = values.get_or_empty(&field_rule.field);
        if let Some(message) = check_constraint(constraint, value) {
            result.insert(field_rule.field.clone(), message);
        }
    }
    Ok(result)
}

/// Resolve a field's effective constraint by walking its conditional nodes.
///
/// Each `When` node applies its predicate to the controlling field's current
/// value (missing reads as the empty string) and descends into the matching
/// branch. Base constraints terminate the walk.
fn resolve_rule<'a>(rule: &'a Rule, values: &FieldValues) -> &'a Constraint {
    match rule {
        Rule::Base(constraint) => constraint,
        Rule::When {
            depends_on,
            predicate,
            then_rule,
            else_rule,
        } => {
            let controlling = values.get_or_empty(depends_on);
            if eval_pred(predicate, controlling) {
                resolve_rule(then_rule, values)
            } else {
                resolve_rule(else_rule, values)
            }
        }
    }
}

/// Check one value against its effective constraint.
///
/// Returns the first violated clause's message, or None when the value is
/// acceptable. Clause order for dates is required, then max, then min.
fn check_constraint(constraint: &Constraint, value: &str) -> Option<String> {
    match constraint {
        Constraint::Text(text_rule) => {
            if value.is_empty() {
                return text_rule.required.clone();
            }
            None
        }
        Constraint::Date(date_rule) => check_date(date_rule, value),
    }
}

fn check_date(rule: &DateRule, value: &str) -> Option<String> {
    if value.is_empty() {
        return rule.required.clone();
    }

    // An unparsable value reports through the required clause, matching the
    // single "must be a valid date." message of the source form. An optional
    // date rule has no clause to attach a message to, so it stays silent.
    let parsed = match Date::parse(value, DATE_FORMAT) {
        Ok(date) => date,
        Err(_) => return rule.required.clone(),
    };

    if let Some(max) = &rule.max {
        if parsed > max.limit {
            return Some(max.message.clone());
        }
    }
    if let Some(min) = &rule.min {
        if parsed < min.limit {
            return Some(min.message.clone());
        }
    }
    None
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
