//! Context assembly from decision arguments.
//!
//! Two paths, chosen by whether the tree declares a context schema:
//! - [`rebuild_context`]: raw state plus an optional time value, with
//!   time-derived properties generated from the time value;
//! - [`join_context_args`]: a plain ordered merge of every argument.
//!
//! Neither path mutates its inputs; the context is always a fresh map.

use serde_json::{json, Map, Value};
use sylva_interchange::{Configuration, PropertyType};
use sylva_time::{TimeFields, TimeValue};

use crate::types::{Context, ContextArg, DecisionError};

/// Rebuild the context of a configured tree from raw state.
///
/// Time-derived properties declared with `is_generated: true`, or
/// without `is_generated`, take their value from `time`. Without a time
/// value they fall back to the state, and a [`DecisionError::MissingTime`]
/// lists those the state lacks.
///
/// Only non-output properties end up in the context; a property the
/// state does not carry is left out for the validator to report.
pub fn rebuild_context(
    configuration: &Configuration,
    state: &Map<String, Value>,
    time: Option<&TimeValue>,
) -> Result<Context, DecisionError> {
    let to_generate: Vec<&String> = configuration
        .input_properties()
        .filter(|(_, decl)| decl.should_generate())
        .map(|(name, _)| name)
        .collect();

    let fields = match time {
        Some(time) => Some(time.fields()),
        None if to_generate.is_empty() => None,
        None => {
            let missing: Vec<String> = to_generate
                .iter()
                .filter(|name| !state.contains_key(name.as_str()))
                .map(|name| name.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(DecisionError::MissingTime {
                    properties: missing,
                });
            }
            tracing::debug!(
                properties = ?to_generate,
                "no time value given, using state values for generated properties"
            );
            None
        }
    };

    let mut context = Context::new();
    for (name, decl) in configuration.input_properties() {
        let generated = match &fields {
            Some(fields) if decl.should_generate() => generated_value(fields, decl.property_type),
            _ => None,
        };
        if let Some(value) = generated.or_else(|| state.get(name).cloned()) {
            context.insert(name.clone(), value);
        }
    }
    Ok(context)
}

/// Merge decision arguments in order; later keys override earlier ones.
pub fn join_context_args(args: &[ContextArg]) -> Context {
    let mut context = Context::new();
    for arg in args {
        match arg {
            ContextArg::Time(time) => context.extend_from_map(&time.to_json_map()),
            ContextArg::Properties(map) => context.extend_from_map(map),
        }
    }
    context
}

/// The time field matching a property type, if it is time-derived.
pub fn generated_value(fields: &TimeFields, property_type: PropertyType) -> Option<Value> {
    match property_type {
        PropertyType::TimeOfDay => Some(json!(fields.time_of_day)),
        PropertyType::DayOfWeek => Some(json!(fields.day_of_week)),
        PropertyType::DayOfMonth => Some(json!(fields.day_of_month)),
        PropertyType::MonthOfYear => Some(json!(fields.month_of_year)),
        PropertyType::Timezone => Some(json!(fields.timezone)),
        PropertyType::Continuous | PropertyType::Enum => None,
    }
}
