//! The built-in person intake form.
//!
//! Four fields: first name, last name, date of birth, middle name. The
//! last name is mandatory only for first names on the allow-list, and is
//! rendered only while the first name is exactly "Malik"; the middle name
//! is rendered only while the last name is exactly "Mahmud".

use time::macros::date;

use crate::predicate::Predicate;
use crate::rule::{Constraint, DateBound, DateRule, FieldRule, Rule, Schema, TextRule};
use crate::visibility::VisibilityRule;

/// Input widget kind for a rendered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Date,
}

/// Declaration of a rendered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
}

/// A complete form definition: rendered fields in display order, initial
/// values, validation schema, and visibility rules.
#[derive(Debug, Clone)]
pub struct FormDef {
    pub fields: Vec<FieldDef>,
    pub initial_values: Vec<(&'static str, &'static str)>,
    pub schema: Schema,
    pub visibility: Vec<VisibilityRule>,
}

/// First names that make the last name mandatory.
pub const LAST_NAME_REQUIRED_FOR: [&str; 2] = ["Malik", "Mahmud"];

/// The person validation schema.
pub fn schema() -> Schema {
    Schema {
        fields: vec![
            FieldRule {
                field: "dob".to_string(),
                rule: Rule::Base(Constraint::Date(DateRule {
                    required: Some("must be a valid date.".to_string()),
                    min: Some(DateBound {
                        limit: date!(1994 - 01 - 01),
                        message: "date must be later than 1994-01-01.".to_string(),
                    }),
                    max: Some(DateBound {
                        limit: date!(2005 - 01 - 01),
                        message: "date must be earlier than 2005-01-01.".to_string(),
                    }),
                })),
            },
            FieldRule {
                field: "firstName".to_string(),
                rule: Rule::Base(Constraint::Text(TextRule {
                    required: Some("This field is required.".to_string()),
                })),
            },
            FieldRule {
                field: "lastName".to_string(),
                rule: Rule::When {
                    depends_on: "firstName".to_string(),
                    predicate: Predicate::OneOf(
                        LAST_NAME_REQUIRED_FOR.iter().map(|s| s.to_string()).collect(),
                    ),
                    then_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                        required: Some("Required.".to_string()),
                    }))),
                    else_rule: Box::new(Rule::Base(Constraint::Text(TextRule {
                        required: None,
                    }))),
                },
            },
            FieldRule {
                field: "middleName".to_string(),
                rule: Rule::Base(Constraint::Text(TextRule { required: None })),
            },
        ],
    }
}

/// The person visibility rules: two independent single-level rules, not a
/// hierarchy.
pub fn visibility_rules() -> Vec<VisibilityRule> {
    vec![
        VisibilityRule {
            field: "lastName".to_string(),
            when: "firstName".to_string(),
            equals: "Malik".to_string(),
        },
        VisibilityRule {
            field: "middleName".to_string(),
            when: "lastName".to_string(),
            equals: "Mahmud".to_string(),
        },
    ]
}

/// The complete person form definition.
pub fn form() -> FormDef {
    FormDef {
        fields: vec![
            FieldDef {
                name: "firstName",
                label: "First Name",
                kind: InputKind::Text,
            },
            FieldDef {
                name: "lastName",
                label: "Last Name",
                kind: InputKind::Text,
            },
            FieldDef {
                name: "dob",
                label: "Date of Birth",
                kind: InputKind::Date,
            },
            FieldDef {
                name: "middleName",
                label: "Middle Name",
                kind: InputKind::Text,
            },
        ],
        // middleName is declared but carries no initial entry; the store
        // still creates it with an empty value.
        initial_values: vec![("dob", ""), ("firstName", ""), ("lastName", "")],
        schema: schema(),
        visibility: visibility_rules(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
