//! Context validation against the configuration schema.
//!
//! Runs once per decision, before traversal. Every required property is
//! checked and all violations are reported together.

use serde_json::Value;
use sylva_interchange::{Configuration, PropertyType};

use crate::types::{Context, DecisionError, InvalidValue};

/// Check that `context` supplies every non-output property of
/// `configuration` with a value of the declared type.
pub fn check_context(configuration: &Configuration, context: &Context) -> Result<(), DecisionError> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for (property, decl) in configuration.input_properties() {
        match context.get(property) {
            None => missing.push(property.clone()),
            Some(value) if !is_valid_value(decl.property_type, value) => {
                invalid.push(InvalidValue {
                    property: property.clone(),
                    value: value.clone(),
                    property_type: decl.property_type,
                });
            }
            Some(_) => {}
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        Ok(())
    } else {
        Err(DecisionError::context_violations(missing, invalid))
    }
}

/// Type predicate for a single context value.
pub fn is_valid_value(property_type: PropertyType, value: &Value) -> bool {
    match property_type {
        PropertyType::Continuous => value.is_number(),
        PropertyType::Enum => value.is_string(),
        PropertyType::Timezone => value.as_str().is_some_and(is_timezone),
        PropertyType::TimeOfDay => value.as_f64().is_some_and(|t| (0.0..24.0).contains(&t)),
        PropertyType::DayOfWeek => integer_in(value, 0, 6),
        PropertyType::DayOfMonth => integer_in(value, 1, 31),
        PropertyType::MonthOfYear => integer_in(value, 1, 12),
    }
}

/// Check that a string is a `+HH:MM` / `-HH:MM` offset.
///
/// Format check only: `+99:99` passes.
pub fn is_timezone(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 6
        && (bytes[0] == b'+' || bytes[0] == b'-')
        && bytes[1..3].iter().all(|b| b.is_ascii_digit())
        && bytes[3] == b':'
        && bytes[4..6].iter().all(|b| b.is_ascii_digit())
}

fn integer_in(value: &Value, min: i64, max: i64) -> bool {
    value.as_i64().is_some_and(|i| i >= min && i <= max)
}
