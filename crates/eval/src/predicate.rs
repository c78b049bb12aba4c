//! Decision-rule evaluation.
//!
//! The operator vocabulary is closed: `is`, `>=`, `<` and the interval
//! operator `[in[`. An operator name containing `continuous` (for example
//! `continuous>=`) is the same base operator applied after converting
//! both sides to floating point, so numeric values that arrive as
//! strings still compare.

use std::cmp::Ordering;

use serde_json::Value;
use sylva_interchange::DecisionRule;

use crate::numeric::{coerce_number, compare_values, values_equal};
use crate::types::{display_value, DecisionError};

/// Base comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `is`
    Is,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    LessThan,
    /// `[in[`: `[lower, upper)`, wrapping around when `lower >= upper`.
    InInterval,
}

/// A parsed rule operator: the base operator plus the numeric coercion
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOperator {
    pub operator: Operator,
    pub continuous: bool,
}

impl RuleOperator {
    /// Parse an operator string, or `None` if it is not recognized.
    pub fn parse(raw: &str) -> Option<RuleOperator> {
        let continuous = raw.contains("continuous");
        let stripped;
        let base = if continuous {
            stripped = raw.replacen("continuous", "", 1);
            stripped.trim_matches(|c: char| c.is_whitespace() || c == '_' || c == '.')
        } else {
            raw
        };
        let operator = match base {
            "is" => Operator::Is,
            ">=" => Operator::GreaterOrEqual,
            "<" => Operator::LessThan,
            "[in[" => Operator::InInterval,
            _ => return None,
        };
        Some(RuleOperator {
            operator,
            continuous,
        })
    }
}

/// Evaluate `rule` against the context value of its property.
pub fn rule_matches(rule: &DecisionRule, value: &Value) -> Result<bool, DecisionError> {
    let op = RuleOperator::parse(&rule.operator).ok_or_else(|| {
        DecisionError::invalid_tree(format!(
            "{} is not a valid decision operator",
            rule.operator
        ))
    })?;

    let (value, operand) = if op.continuous {
        let value = coerce_number(value).ok_or_else(|| {
            DecisionError::invalid_context(format!(
                "value '{}' for property '{}' cannot be converted to a number",
                display_value(value),
                rule.property
            ))
        })?;
        (value, coerce_operand(rule, op.operator)?)
    } else {
        (value.clone(), rule.operand.clone())
    };

    match op.operator {
        Operator::Is => Ok(values_equal(&value, &operand)),
        Operator::GreaterOrEqual => Ok(ordering(rule, &value, &operand)? != Ordering::Less),
        Operator::LessThan => Ok(ordering(rule, &value, &operand)? == Ordering::Less),
        Operator::InInterval => {
            let (lower, upper) = interval_bounds(rule, &operand)?;
            let bounds = compare_values(lower, upper).ok_or_else(|| {
                DecisionError::invalid_tree(format!(
                    "interval bounds {} and {} of property '{}' cannot be compared",
                    lower, upper, rule.property
                ))
            })?;
            let above_lower = ordering(rule, &value, lower)? != Ordering::Less;
            let below_upper = ordering(rule, &value, upper)? == Ordering::Less;
            if bounds == Ordering::Less {
                Ok(above_lower && below_upper)
            } else {
                Ok(above_lower || below_upper)
            }
        }
    }
}

fn ordering(rule: &DecisionRule, value: &Value, operand: &Value) -> Result<Ordering, DecisionError> {
    compare_values(value, operand).ok_or_else(|| {
        DecisionError::invalid_context(format!(
            "value '{}' for property '{}' cannot be compared with {} using '{}'",
            display_value(value),
            rule.property,
            operand,
            rule.operator
        ))
    })
}

fn interval_bounds<'a>(
    rule: &DecisionRule,
    operand: &'a Value,
) -> Result<(&'a Value, &'a Value), DecisionError> {
    match operand.as_array().map(Vec::as_slice) {
        Some([lower, upper]) => Ok((lower, upper)),
        _ => Err(DecisionError::invalid_tree(format!(
            "operand {} of '{}' on property '{}' is not a [lower, upper] pair",
            operand, rule.operator, rule.property
        ))),
    }
}

fn coerce_operand(rule: &DecisionRule, operator: Operator) -> Result<Value, DecisionError> {
    let invalid = || {
        DecisionError::invalid_tree(format!(
            "operand {} of '{}' on property '{}' is not numeric",
            rule.operand, rule.operator, rule.property
        ))
    };
    match operator {
        Operator::InInterval => {
            let (lower, upper) = interval_bounds(rule, &rule.operand)?;
            let lower = coerce_number(lower).ok_or_else(invalid)?;
            let upper = coerce_number(upper).ok_or_else(invalid)?;
            Ok(Value::Array(vec![lower, upper]))
        }
        _ => coerce_number(&rule.operand).ok_or_else(invalid),
    }
}
