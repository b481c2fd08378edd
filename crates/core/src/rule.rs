//! Field rule tree and schema structure.
//!
//! A field's rule is either a base constraint or a conditional node that
//! picks between two sub-rules based on another field's current value. Each
//! constraint clause carries its own violation message, so the schema is
//! plain data built with struct literals -- there is no fluent builder and
//! no runtime rule composition.

use std::collections::BTreeSet;

use time::Date;

use crate::predicate::Predicate;
use crate::types::SchemaError;

// ──────────────────────────────────────────────
// Constraints
// ──────────────────────────────────────────────

/// Requiredness for a text field.
///
/// `required: Some(msg)` rejects the empty string with that message;
/// `None` accepts anything, including the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub required: Option<String>,
}

/// An inclusive calendar-date bound with its violation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBound {
    pub limit: Date,
    pub message: String,
}

/// Constraints for a date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRule {
    /// Message for an empty or unparsable value. `None` makes the field
    /// optional: an empty value passes without any message.
    pub required: Option<String>,
    pub min: Option<DateBound>,
    pub max: Option<DateBound>,
}

/// Base constraint for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Text(TextRule),
    Date(DateRule),
}

// ──────────────────────────────────────────────
// Rule tree
// ──────────────────────────────────────────────

/// A field's validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Unconditional constraint.
    Base(Constraint),
    /// Conditional override: the effective rule is chosen by applying the
    /// predicate to the controlling field's current value -- its value,
    /// never its error state or visibility.
    When {
        depends_on: String,
        predicate: Predicate,
        then_rule: Box<Rule>,
        else_rule: Box<Rule>,
    },
}

/// A named field paired with its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: String,
    pub rule: Rule,
}

/// An ordered set of field rules. Order is the validation order and the
/// order messages are reported in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
}

impl Schema {
    /// Structural validation of the schema itself.
    ///
    /// A defect here is a programmer error: it aborts the validation pass
    /// entirely instead of becoming a per-field message. Checks: no
    /// duplicate field names, every conditional dependency names a declared
    /// field, and date bounds are not inverted.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut declared = BTreeSet::new();
        for field_rule in &self.fields {
            if !declared.insert(field_rule.field.as_str()) {
                return Err(SchemaError::DuplicateField {
                    field: field_rule.field.clone(),
                });
            }
        }

        for field_rule in &self.fields {
            check_rule(&field_rule.field, &field_rule.rule, &declared)?;
        }
        Ok(())
    }
}

fn check_rule(
    field: &str,
    rule: &Rule,
    declared: &BTreeSet<&str>,
) -> Result<(), SchemaError> {
    match rule {
        Rule::Base(Constraint::Text(_)) => Ok(()),

        Rule::Base(Constraint::Date(date_rule)) => {
            if let (Some(min), Some(max)) = (&date_rule.min, &date_rule.max) {
                if min.limit > max.limit {
                    return Err(SchemaError::InvertedBounds {
                        field: field.to_string(),
                    });
                }
            }
            Ok(())
        }

        Rule::When {
            depends_on,
            then_rule,
            else_rule,
            ..
        } => {
            if !declared.contains(depends_on.as_str()) {
                return Err(SchemaError::UnknownDependency {
                    field: field.to_string(),
                    depends_on: depends_on.clone(),
                });
            }
            check_rule(field, then_rule, declared)?;
            check_rule(field, else_rule, declared)
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn required_text(field: &str, message: &str) -> FieldRule {
        FieldRule {
            field: field.to_string(),
            rule: Rule::Base(Constraint::Text(TextRule {
                required: Some(message.to_string()),
            })),
        }
    }

    fn optional_text(field: &str) -> FieldRule {
        FieldRule {
            field: field.to_string(),
            rule: Rule::Base(Constraint::Text(TextRule { required: None })),
        }
    }

    #[test]
    fn check_accepts_well_formed_schema() {
        let schema = Schema {
            fields: vec![
                required_text("firstName", "This field is required."),
                FieldRule {
                    field: "lastName".to_string(),
                    rule: Rule::When {
                        depends_on: "firstName".to_string(),
                        predicate: Predicate::Equals("Malik".to_string()),
                        then_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                            required: Some("Required.".to_string()),
                        }))),
                        else_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                            required: None,
                        }))),
                    },
                },
            ],
        };
        assert!(schema.check().is_ok());
    }

    #[test]
    fn check_rejects_duplicate_field() {
        let schema = Schema {
            fields: vec![optional_text("firstName"), optional_text("firstName")],
        };
        assert_eq!(
            schema.check(),
            Err(SchemaError::DuplicateField {
                field: "firstName".to_string()
            })
        );
    }

    #[test]
    fn check_rejects_unknown_dependency() {
        let schema = Schema {
            fields: vec![FieldRule {
                field: "lastName".to_string(),
                rule: Rule::When {
                    depends_on: "nickname".to_string(),
                    predicate: Predicate::Equals("x".to_string()),
                    then_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                        required: None,
                    }))),
                    else_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                        required: None,
                    }))),
                },
            }],
        };
        assert_eq!(
            schema.check(),
            Err(SchemaError::UnknownDependency {
                field: "lastName".to_string(),
                depends_on: "nickname".to_string()
            })
        );
    }

    #[test]
    fn check_rejects_inverted_bounds() {
        let schema = Schema {
            fields: vec![FieldRule {
                field: "dob".to_string(),
                rule: Rule::Base(Constraint::Date(DateRule {
                    required: None,
                    min: Some(DateBound {
                        limit: date!(2010 - 01 - 01),
                        message: "too early".to_string(),
                    }),
                    max: Some(DateBound {
                        limit: date!(2000 - 01 - 01),
                        message: "too late".to_string(),
                    }),
                })),
            }],
        };
        assert_eq!(
            schema.check(),
            Err(SchemaError::InvertedBounds {
                field: "dob".to_string()
            })
        );
    }

    #[test]
    fn check_recurses_into_conditional_branches() {
        // The inverted bounds sit inside the else branch of a conditional.
        let schema = Schema {
            fields: vec![
                optional_text("firstName"),
                FieldRule {
                    field: "dob".to_string(),
                    rule: Rule::When {
                        depends_on: "firstName".to_string(),
                        predicate: Predicate::Equals("x".to_string()),
                        then_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                            required: None,
                        }))),
                        else_rule: Box::new(Rule::Base(Constraint::Date(DateRule {
                            required: None,
                            min: Some(DateBound {
                                limit: date!(2010 - 01 - 01),
                                message: "too early".to_string(),
                            }),
                            max: Some(DateBound {
                                limit: date!(2000 - 01 - 01),
                                message: "too late".to_string(),
                            }),
                        }))),
                    },
                },
            ],
        };
        assert_eq!(
            schema.check(),
            Err(SchemaError::InvertedBounds {
                field: "dob".to_string()
            })
        );
    }
}
