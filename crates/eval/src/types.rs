//! Runtime types for the decision interpreter: errors, contexts and the
//! arguments a decision is taken from.
//!
//! Context values stay as `serde_json::Value` scalars. Their shape is
//! checked once against the declared property types (see
//! [`validate`](crate::validate)) before any traversal.

use std::collections::BTreeMap;
use std::fmt;

use sylva_interchange::{InterchangeError, PropertyType};
use sylva_time::TimeValue;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Coarse classification of a [`DecisionError`].
///
/// `NullDecision` means the model abstains for this context; everything
/// else means some input was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decision,
    NullDecision,
}

/// A context value rejected by its property's type predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidValue {
    pub property: String,
    pub value: serde_json::Value,
    pub property_type: PropertyType,
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid value for property '{}' of type '{}'",
            display_value(&self.value),
            self.property,
            self.property_type
        )
    }
}

/// Errors that can occur while taking a decision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    /// The tree object is malformed or of an unsupported version.
    #[error("invalid decision tree format, {message}")]
    InvalidTreeFormat { message: String },

    /// Time-derived properties must be generated but no time value was
    /// given and the state does not carry them either.
    #[error(
        "you must provide a time value to decide because context properties {} need to be generated",
        quoted_list(.properties)
    )]
    MissingTime { properties: Vec<String> },

    /// The context is missing properties, holds invalid values, or has the
    /// wrong shape.
    #[error("unable to take decision, {message}")]
    InvalidContext {
        message: String,
        missing: Vec<String>,
        invalid: Vec<InvalidValue>,
    },

    /// No prediction could be reached for the context.
    #[error("unable to take decision: {message}")]
    NullDecision { message: String },
}

impl DecisionError {
    pub fn invalid_tree(message: impl Into<String>) -> Self {
        DecisionError::InvalidTreeFormat {
            message: message.into(),
        }
    }

    pub fn invalid_context(message: impl Into<String>) -> Self {
        DecisionError::InvalidContext {
            message: message.into(),
            missing: Vec::new(),
            invalid: Vec::new(),
        }
    }

    /// Aggregate every validation failure into one error.
    pub fn context_violations(missing: Vec<String>, invalid: Vec<InvalidValue>) -> Self {
        let details: Vec<String> = missing
            .iter()
            .map(|p| format!("expected property '{}' is not defined", p))
            .chain(invalid.iter().map(|v| v.to_string()))
            .collect();
        DecisionError::InvalidContext {
            message: format!("the given context is not valid: {}", details.join(", ")),
            missing,
            invalid,
        }
    }

    pub fn null_decision(message: impl Into<String>) -> Self {
        DecisionError::NullDecision {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecisionError::NullDecision { .. } => ErrorKind::NullDecision,
            _ => ErrorKind::Decision,
        }
    }

    pub fn is_null_decision(&self) -> bool {
        self.kind() == ErrorKind::NullDecision
    }
}

impl From<InterchangeError> for DecisionError {
    fn from(e: InterchangeError) -> Self {
        DecisionError::invalid_tree(e.to_string())
    }
}

fn quoted_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Render a context value for diagnostics: strings without JSON quotes.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ──────────────────────────────────────────────
// Context
// ──────────────────────────────────────────────

/// The resolved property values a tree is traversed with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context(pub BTreeMap<String, serde_json::Value>);

impl Context {
    pub fn new() -> Self {
        Context(BTreeMap::new())
    }

    pub fn get(&self, property: &str) -> Option<&serde_json::Value> {
        self.0.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn insert(&mut self, property: String, value: serde_json::Value) {
        self.0.insert(property, value);
    }

    /// Merge a property map key by key; later keys override.
    pub fn extend_from_map(&mut self, map: &serde_json::Map<String, serde_json::Value>) {
        for (k, v) in map {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Context {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Context(map.into_iter().collect())
    }
}

// ──────────────────────────────────────────────
// Decision arguments
// ──────────────────────────────────────────────

/// One positional argument of [`decide`](crate::decide).
#[derive(Debug, Clone, PartialEq)]
pub enum ContextArg {
    /// Contributes its calendar fields.
    Time(TimeValue),
    /// Contributes its keys as property values.
    Properties(serde_json::Map<String, serde_json::Value>),
}

impl ContextArg {
    /// Wrap a JSON value; only objects are accepted.
    pub fn from_json(value: serde_json::Value) -> Result<ContextArg, DecisionError> {
        match value {
            serde_json::Value::Object(map) => Ok(ContextArg::Properties(map)),
            other => Err(DecisionError::invalid_context(format!(
                "invalid context argument {}, expected a property map or a time value",
                other
            ))),
        }
    }
}

impl From<TimeValue> for ContextArg {
    fn from(time: TimeValue) -> Self {
        ContextArg::Time(time)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ContextArg {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        ContextArg::Properties(map)
    }
}
