//! Decision output types.

use std::collections::BTreeMap;

use serde_json::Number;
use sylva_interchange::DecisionRule;

use crate::types::Context;

/// Version stamped on every decision object.
pub const DECISION_VERSION: &str = "1.1.0";

/// The prediction for one output property and the rules that led to it.
///
/// `confidence` and `standard_deviation` keep the number exactly as the
/// tree wrote it, so an integer stays an integer in the output.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafResult {
    pub predicted_value: serde_json::Value,
    pub confidence: Number,
    /// Root-first trail of the matched rules.
    pub decision_rules: Vec<DecisionRule>,
    pub standard_deviation: Option<Number>,
}

impl LeafResult {
    pub fn to_json(&self) -> serde_json::Value {
        let rules: Vec<serde_json::Value> = self
            .decision_rules
            .iter()
            .map(|r| {
                serde_json::json!({
                    "property": r.property,
                    "operator": r.operator,
                    "operand": r.operand,
                })
            })
            .collect();
        let mut out = serde_json::json!({
            "predicted_value": self.predicted_value,
            "confidence": self.confidence,
            "decision_rules": rules,
        });
        if let Some(sd) = &self.standard_deviation {
            out["standard_deviation"] = serde_json::json!(sd);
        }
        out
    }
}

/// A complete decision: one result per output property, plus the context
/// it was taken with.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub output: BTreeMap<String, LeafResult>,
    pub context: Context,
    pub version: String,
}

impl Decision {
    pub fn get(&self, output: &str) -> Option<&LeafResult> {
        self.output.get(output)
    }

    /// Render the decision object:
    /// `{output: {<prop>: {...}}, context: {...}, _version}`.
    pub fn to_json(&self) -> serde_json::Value {
        let output: serde_json::Map<String, serde_json::Value> = self
            .output
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::json!({
            "output": output,
            "context": self.context.to_json(),
            "_version": self.version,
        })
    }
}
