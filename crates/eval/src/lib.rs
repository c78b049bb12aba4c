//! Sylva decision-tree interpreter -- accepts a versioned tree object and
//! a context, produces a prediction per output property together with
//! the decision rules that led to it.
//!
//! Pipeline for one decision:
//! 1. Parse and version-gate the tree object (`sylva-interchange`)
//! 2. Assemble the context: rebuild it from raw state and a time value
//!    when the tree declares a schema, or merge the arguments otherwise
//! 3. Validate the whole context against the declared property types
//! 4. Walk each output's tree down to a leaf
//!
//! Every step is pure: the tree object and the arguments are only read,
//! so the same tree can be decided from several threads at once.

pub mod assemble;
pub mod decision;
pub mod numeric;
pub mod predicate;
pub mod types;
pub mod validate;
pub mod walk;

use std::collections::BTreeMap;

use sylva_interchange::{parse_tree, ParsedTree};
use sylva_time::TimeValue;

pub use decision::{Decision, LeafResult, DECISION_VERSION};
pub use predicate::{Operator, RuleOperator};
pub use types::{Context, ContextArg, DecisionError, ErrorKind, InvalidValue};

/// Take a decision from positional context arguments.
///
/// When the tree declares a context schema, `args` is the raw state
/// followed by an optional time value. Otherwise every argument is merged
/// into the context in order, later keys overriding earlier ones.
pub fn decide(tree: &serde_json::Value, args: &[ContextArg]) -> Result<Decision, DecisionError> {
    let parsed = parse_tree(tree)?;

    let context = if parsed.configuration.is_empty() {
        assemble::join_context_args(args)
    } else {
        let (state, time) = split_state_args(args)?;
        assemble::rebuild_context(&parsed.configuration, state, time)?
    };

    decide_parsed(&parsed, context)
}

/// Take a decision from raw state and an optional time value.
pub fn decide_with_state(
    tree: &serde_json::Value,
    state: &serde_json::Map<String, serde_json::Value>,
    time: Option<&TimeValue>,
) -> Result<Decision, DecisionError> {
    let parsed = parse_tree(tree)?;
    let context = if parsed.configuration.is_empty() {
        let mut context = Context::new();
        if let Some(time) = time {
            context.extend_from_map(&time.to_json_map());
        }
        context.extend_from_map(state);
        context
    } else {
        assemble::rebuild_context(&parsed.configuration, state, time)?
    };
    decide_parsed(&parsed, context)
}

/// Validate `context` and walk every output tree.
pub fn decide_parsed(parsed: &ParsedTree, context: Context) -> Result<Decision, DecisionError> {
    validate::check_context(&parsed.configuration, &context)?;

    let outputs: Vec<&String> = if parsed.configuration.is_empty() {
        parsed.trees.keys().collect()
    } else {
        parsed.configuration.output.iter().collect()
    };
    tracing::debug!(
        version = %parsed.version,
        outputs = outputs.len(),
        context_size = context.len(),
        "taking decision"
    );

    let mut output = BTreeMap::new();
    for name in outputs {
        let root = parsed.trees.get(name.as_str()).ok_or_else(|| {
            DecisionError::invalid_tree(format!("no tree found for output '{}'", name))
        })?;
        let result = walk::decide_node(root, &context)?;
        tracing::debug!(
            output = %name,
            depth = result.decision_rules.len(),
            "decision taken"
        );
        output.insert(name.clone(), result);
    }

    Ok(Decision {
        output,
        context,
        version: DECISION_VERSION.to_string(),
    })
}

/// Split schema-driven arguments into the raw state and the time value.
fn split_state_args(
    args: &[ContextArg],
) -> Result<(&serde_json::Map<String, serde_json::Value>, Option<&TimeValue>), DecisionError> {
    let state = match args.first() {
        Some(ContextArg::Properties(state)) => state,
        Some(ContextArg::Time(_)) => {
            return Err(DecisionError::invalid_context(
                "the first argument must be the context state when the tree declares a context",
            ))
        }
        None => return Err(DecisionError::invalid_context("no context state given")),
    };
    let time = match args.get(1) {
        None => None,
        Some(ContextArg::Time(time)) => Some(time),
        Some(ContextArg::Properties(_)) => {
            return Err(DecisionError::invalid_context(
                "the second argument must be a time value",
            ))
        }
    };
    if args.len() > 2 {
        return Err(DecisionError::invalid_context(format!(
            "expected the context state and an optional time value, got {} arguments",
            args.len()
        )));
    }
    Ok((state, time))
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::{json, Value};

    fn state(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    /// Two outputs, one time-derived branch.
    fn thermostat_tree(version: &str) -> Value {
        json!({
            "_version": version,
            "configuration": {
                "context": {
                    "presence": { "type": "enum" },
                    "time": { "type": "time_of_day" },
                    "tz": { "type": "timezone" },
                    "temperature": { "type": "continuous" },
                    "mode": { "type": "enum" }
                },
                "output": ["temperature", "mode"]
            },
            "trees": {
                "temperature": {
                    "children": [
                        {
                            "decision_rule": { "property": "time", "operator": "[in[", "operand": [22, 6] },
                            "predicted_value": 17.5,
                            "confidence": 0.9,
                            "standard_deviation": 0.5
                        },
                        {
                            "decision_rule": { "property": "time", "operator": "[in[", "operand": [6, 22] },
                            "children": [
                                {
                                    "decision_rule": { "property": "presence", "operator": "is", "operand": "home" },
                                    "predicted_value": 21.0,
                                    "confidence": 0.8,
                                    "standard_deviation": 1.0
                                },
                                {
                                    "decision_rule": { "property": "presence", "operator": "is", "operand": "away" },
                                    "predicted_value": 16.0,
                                    "confidence": 0.7
                                }
                            ]
                        }
                    ]
                },
                "mode": {
                    "children": [
                        {
                            "decision_rule": { "property": "presence", "operator": "is", "operand": "home" },
                            "predicted_value": "comfort",
                            "confidence": 0.6
                        },
                        {
                            "decision_rule": { "property": "presence", "operator": "is", "operand": "away" },
                            "predicted_value": "eco"
                        }
                    ]
                }
            }
        })
    }

    fn evening() -> TimeValue {
        // 2017-07-13T21:40:00-05:00
        TimeValue::from_timestamp(1_500_000_000, Some("-05:00")).unwrap()
    }

    #[test]
    fn decides_every_output() {
        let tree = thermostat_tree("1.1.0");
        let decision = decide(
            &tree,
            &[
                ContextArg::Properties(state(json!({ "presence": "home" }))),
                ContextArg::Time(evening()),
            ],
        )
        .unwrap();

        assert_eq!(decision.output.len(), 2);
        assert_eq!(decision.version, "1.1.0");

        let temperature = decision.get("temperature").unwrap();
        assert_eq!(temperature.predicted_value, json!(21.0));
        assert_eq!(json!(temperature.confidence), json!(0.8));
        assert_eq!(json!(temperature.standard_deviation), json!(1.0));
        let props: Vec<&str> = temperature
            .decision_rules
            .iter()
            .map(|r| r.property.as_str())
            .collect();
        assert_eq!(props, vec!["time", "presence"]);

        let mode = decision.get("mode").unwrap();
        assert_eq!(mode.predicted_value, json!("comfort"));
        assert_eq!(mode.decision_rules.len(), 1);

        assert_eq!(decision.context.get("tz"), Some(&json!("-05:00")));
        assert!(!decision.context.contains("temperature"));
        assert!(!decision.context.contains("mode"));
    }

    #[test]
    fn decide_with_state_matches_decide() {
        let tree = thermostat_tree("1.1.0");
        let raw = state(json!({ "presence": "away" }));
        let a = decide_with_state(&tree, &raw, Some(&evening())).unwrap();
        let b = decide(
            &tree,
            &[ContextArg::Properties(raw.clone()), ContextArg::Time(evening())],
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get("mode").unwrap().predicted_value, json!("eco"));
    }

    #[test]
    fn deterministic_output() {
        let tree = thermostat_tree("1.1.0");
        let raw = state(json!({ "presence": "home" }));
        let first = decide_with_state(&tree, &raw, Some(&evening())).unwrap();
        let second = decide_with_state(&tree, &raw, Some(&evening())).unwrap();
        assert_eq!(
            serde_json::to_string(&first.to_json()).unwrap(),
            serde_json::to_string(&second.to_json()).unwrap()
        );
    }

    #[test]
    fn unsupported_version_fails_before_traversal() {
        let tree = thermostat_tree("0.9.0");
        let err = decide(&tree, &[]).unwrap_err();
        assert_eq!(
            err,
            DecisionError::InvalidTreeFormat {
                message: "0.9.0 is not a supported version".to_string()
            }
        );
    }

    #[test]
    fn missing_time_is_reported() {
        let tree = thermostat_tree("1.1.0");
        let err = decide(
            &tree,
            &[ContextArg::Properties(state(json!({ "presence": "home" })))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecisionError::MissingTime {
                properties: vec!["time".to_string(), "tz".to_string()]
            }
        );
        assert_eq!(err.kind(), ErrorKind::Decision);
    }

    #[test]
    fn state_supplied_time_fields_skip_generation() {
        let tree = thermostat_tree("1.1.0");
        let decision = decide(
            &tree,
            &[ContextArg::Properties(state(
                json!({ "presence": "away", "time": 23.5, "tz": "+01:00" }),
            ))],
        )
        .unwrap();
        let temperature = decision.get("temperature").unwrap();
        assert_eq!(temperature.predicted_value, json!(17.5));
        assert_eq!(json!(temperature.standard_deviation), json!(0.5));
    }

    #[test]
    fn missing_enum_property_is_invalid_context() {
        let tree = thermostat_tree("1.1.0");
        let err = decide(&tree, &[ContextArg::Properties(state(json!({}))), ContextArg::Time(evening())])
            .unwrap_err();
        match &err {
            DecisionError::InvalidContext { missing, .. } => {
                assert_eq!(missing, &vec!["presence".to_string()])
            }
            other => panic!("expected InvalidContext, got {:?}", other),
        }
        assert!(err.to_string().contains("presence"));
    }

    #[test]
    fn schema_arguments_are_checked() {
        let tree = thermostat_tree("1.1.0");
        assert!(matches!(
            decide(&tree, &[]),
            Err(DecisionError::InvalidContext { .. })
        ));
        assert!(matches!(
            decide(&tree, &[ContextArg::Time(evening())]),
            Err(DecisionError::InvalidContext { .. })
        ));
        assert!(matches!(
            decide(
                &tree,
                &[
                    ContextArg::Properties(state(json!({ "presence": "home" }))),
                    ContextArg::Properties(state(json!({}))),
                ]
            ),
            Err(DecisionError::InvalidContext { .. })
        ));
    }

    #[test]
    fn declared_output_without_tree() {
        let mut tree = thermostat_tree("1.1.0");
        tree["trees"].as_object_mut().unwrap().remove("mode");
        let err = decide_with_state(&tree, &state(json!({ "presence": "home" })), Some(&evening()))
            .unwrap_err();
        assert_eq!(
            err,
            DecisionError::InvalidTreeFormat {
                message: "no tree found for output 'mode'".to_string()
            }
        );
    }

    #[test]
    fn unconfigured_tree_merges_arguments() {
        let tree = json!({
            "_version": "1.0.0",
            "configuration": {},
            "trees": {
                "lightbulb": {
                    "children": [
                        {
                            "decision_rule": { "property": "day_of_week", "operator": "<", "operand": 5 },
                            "predicted_value": "on"
                        },
                        {
                            "decision_rule": { "property": "day_of_week", "operator": ">=", "operand": 5 },
                            "predicted_value": "off"
                        }
                    ]
                }
            }
        });
        let decision = decide(
            &tree,
            &[
                ContextArg::Time(evening()),
                ContextArg::Properties(state(json!({ "day_of_week": 6 }))),
            ],
        )
        .unwrap();
        assert_eq!(decision.get("lightbulb").unwrap().predicted_value, json!("off"));
        assert_eq!(decision.context.get("day_of_week"), Some(&json!(6)));
        assert_eq!(decision.context.get("timezone"), Some(&json!("-05:00")));
    }

    #[test]
    fn tree_is_not_mutated() {
        let tree = thermostat_tree("1.1.0");
        let before = tree.clone();
        let _ = decide_with_state(&tree, &state(json!({ "presence": "home" })), Some(&evening()));
        assert_eq!(tree, before);
    }

    #[test]
    fn concurrent_decisions_share_the_tree() {
        let tree = thermostat_tree("1.1.0");
        let time = evening();
        std::thread::scope(|s| {
            let handles: Vec<_> = ["home", "away"]
                .iter()
                .cycle()
                .take(8)
                .map(|presence| {
                    let tree = &tree;
                    let time = &time;
                    s.spawn(move || {
                        let raw = state(json!({ "presence": presence }));
                        decide_with_state(tree, &raw, Some(time)).unwrap()
                    })
                })
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                let decision = handle.join().unwrap();
                let expected = if i % 2 == 0 { "comfort" } else { "eco" };
                assert_eq!(decision.get("mode").unwrap().predicted_value, json!(expected));
            }
        });
    }
}
