//! Field visibility evaluation.
//!
//! Visibility is recomputed from the full current value set on demand. A
//! rule makes its dependent field visible exactly when the controlling
//! field's current value equals the expected string. A field's visibility
//! is a pure function of the *other* fields' values -- it never depends on
//! the field's own hidden/disabled state, so there is no circular
//! recomputation.
//!
//! Rules are single-level and independent: a rule whose controlling field
//! is itself hidden still evaluates against that field's last known value.
//! Hiding an ancestor does not cascade to its descendants.

use std::collections::BTreeMap;

use crate::types::FieldValues;

/// Declarative mapping from a controlling field's value to a dependent
/// field's shown/hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRule {
    /// The dependent field this rule controls.
    pub field: String,
    /// The controlling field whose value is inspected.
    pub when: String,
    /// Exact, case-sensitive value that makes the dependent field visible.
    pub equals: String,
}

/// Computed visibility keyed by field name.
///
/// Fields absent from the map have no rule and default to visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityMap(pub BTreeMap<String, bool>);

impl VisibilityMap {
    pub fn new() -> Self {
        VisibilityMap(BTreeMap::new())
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(true)
    }
}

/// Compute visibility for every ruled field.
///
/// Rules are applied in order; a later rule targeting the same dependent
/// field overrides an earlier one. A missing controlling value compares as
/// the empty string.
pub fn compute_visibility(values: &FieldValues, rules: &[VisibilityRule]) -> VisibilityMap {
    let mut map = BTreeMap::new();
    for rule in rules {
        let controlling = values.get_or_empty(&rule.when);
        map.insert(rule.field.clone(), controlling == rule.equals);
    }
    VisibilityMap(map)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
