//! Recursive tree traversal.
//!
//! At each internal node the first child whose decision rule matches the
//! context wins; the remaining children are not evaluated. The matched
//! rules are prepended on the way back up, so the trail reads root-first.

use sylva_interchange::{DecisionRule, Node};

use crate::decision::LeafResult;
use crate::predicate::rule_matches;
use crate::types::{display_value, Context, DecisionError};

/// Walk `node` down to a leaf for the given context.
pub fn decide_node(node: &Node, context: &Context) -> Result<LeafResult, DecisionError> {
    if node.is_leaf() {
        return leaf_result(node);
    }

    let (child, rule) = match find_matching_child(node, context)? {
        Some(matched) => matched,
        None => return Err(no_match(node, context)),
    };
    tracing::trace!(
        property = %rule.property,
        operator = %rule.operator,
        "decision rule matched"
    );

    let mut result = decide_node(child, context)?;
    result.decision_rules.insert(0, rule.clone());
    Ok(result)
}

fn leaf_result(node: &Node) -> Result<LeafResult, DecisionError> {
    let predicted_value = node.predicted_value.clone().ok_or_else(|| {
        DecisionError::null_decision(
            "the decision tree has no valid predicted value for the given context",
        )
    })?;
    Ok(LeafResult {
        predicted_value,
        confidence: node
            .confidence
            .clone()
            .unwrap_or_else(|| serde_json::Number::from(0u8)),
        decision_rules: Vec::new(),
        standard_deviation: node.standard_deviation.clone(),
    })
}

fn find_matching_child<'a>(
    node: &'a Node,
    context: &Context,
) -> Result<Option<(&'a Node, &'a DecisionRule)>, DecisionError> {
    for child in node.children() {
        let rule = child
            .decision_rule
            .as_ref()
            .ok_or_else(|| DecisionError::invalid_tree("a child node has no decision rule"))?;
        let value = match context.get(&rule.property) {
            Some(v) if !v.is_null() => v,
            _ => {
                return Err(DecisionError::invalid_context(format!(
                    "property '{}' is missing from the given context",
                    rule.property
                )))
            }
        };
        if rule_matches(rule, value)? {
            return Ok(Some((child, rule)));
        }
    }
    Ok(None)
}

/// Names the first child's property as a representative diagnostic.
fn no_match(node: &Node, context: &Context) -> DecisionError {
    let property = node
        .children()
        .first()
        .and_then(|c| c.decision_rule.as_ref())
        .map(|r| r.property.as_str())
        .unwrap_or_default();
    let value = context
        .get(property)
        .map(display_value)
        .unwrap_or_default();
    DecisionError::null_decision(format!(
        "value '{}' for property '{}' doesn't validate any of the decision rules",
        value, property
    ))
}
