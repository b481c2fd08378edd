//! Value-set and result types for the form engine.
//!
//! The engine is stateless: it receives the current value set as input on
//! each call and returns a freshly computed result. Live form state
//! (touched flags, displayed errors, the visible flag itself) is owned by
//! the intake-state store, not by these types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Structural defects in a schema definition.
///
/// These are programmer errors, not validation failures: they abort the
/// validation pass entirely and are never folded into the per-field result
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The same field name is declared more than once.
    DuplicateField { field: String },
    /// A conditional rule depends on a field the schema does not declare.
    UnknownDependency { field: String, depends_on: String },
    /// A date rule's min bound is later than its max bound.
    InvertedBounds { field: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateField { field } => {
                write!(f, "duplicate field in schema: {}", field)
            }
            SchemaError::UnknownDependency { field, depends_on } => {
                write!(
                    f,
                    "field '{}' depends on undeclared field '{}'",
                    field, depends_on
                )
            }
            SchemaError::InvertedBounds { field } => {
                write!(f, "date bounds for field '{}' are inverted (min > max)", field)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

// ──────────────────────────────────────────────
// Field values
// ──────────────────────────────────────────────

/// Current raw values keyed by field name.
///
/// Values are raw strings exactly as entered -- no coercion, no trimming.
/// A field that has never been edited holds the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(pub BTreeMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        FieldValues(BTreeMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// A field that is absent from the set compares as the empty string.
    pub fn get_or_empty(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, field: String, value: String) {
        self.0.insert(field, value);
    }

    /// Serialize to a JSON object, one member per field.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

// ──────────────────────────────────────────────
// Validation result
// ──────────────────────────────────────────────

/// Per-field validation messages, keyed by field name.
///
/// Absence of a key means the field is valid; a field is never present with
/// an empty message. Produced fresh on every validation pass, never merged
/// with a previous result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult(pub BTreeMap<String, String>);

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult(BTreeMap::new())
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: String, message: String) {
        self.0.insert(field, message);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to a JSON object, one member per failing field.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_values_get_or_empty() {
        let mut values = FieldValues::new();
        values.insert("firstName".to_string(), "Jane".to_string());
        assert_eq!(values.get("firstName"), Some("Jane"));
        assert_eq!(values.get("lastName"), None);
        assert_eq!(values.get_or_empty("lastName"), "");
    }

    #[test]
    fn field_values_json_round_trip() {
        let mut values = FieldValues::new();
        values.insert("firstName".to_string(), "Jane".to_string());
        values.insert("dob".to_string(), "1999-09-09".to_string());

        let json = values.to_json();
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["dob"], "1999-09-09");

        let back: FieldValues = serde_json::from_value(json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn validation_result_absent_means_valid() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());
        result.insert("dob".to_string(), "must be a valid date.".to_string());
        assert!(!result.is_valid());
        assert_eq!(result.error("dob"), Some("must be a valid date."));
        assert_eq!(result.error("firstName"), None);
    }

    #[test]
    fn validation_result_to_json() {
        let mut result = ValidationResult::new();
        result.insert("firstName".to_string(), "This field is required.".to_string());
        let json = result.to_json();
        assert_eq!(json["firstName"], "This field is required.");
        assert!(json.get("lastName").is_none());
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::UnknownDependency {
            field: "lastName".to_string(),
            depends_on: "nickname".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "field 'lastName' depends on undeclared field 'nickname'"
        );
    }
}
