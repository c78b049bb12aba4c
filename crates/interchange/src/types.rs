//! Typed structs for the decision-tree interchange format.
//!
//! Rule operators are kept as raw strings: they are only interpreted when
//! a traversal reaches them, so an unrecognized operator on a branch that
//! is never visited does not invalidate the tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed vocabulary of context property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Continuous,
    Enum,
    Timezone,
    TimeOfDay,
    DayOfWeek,
    DayOfMonth,
    MonthOfYear,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Continuous => "continuous",
            PropertyType::Enum => "enum",
            PropertyType::Timezone => "timezone",
            PropertyType::TimeOfDay => "time_of_day",
            PropertyType::DayOfWeek => "day_of_week",
            PropertyType::DayOfMonth => "day_of_month",
            PropertyType::MonthOfYear => "month_of_year",
        }
    }

    /// Whether values of this type can be derived from a time value.
    pub fn is_time_derived(&self) -> bool {
        !matches!(self, PropertyType::Continuous | PropertyType::Enum)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a single context property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_generated: Option<bool>,
}

impl PropertyDecl {
    pub fn new(property_type: PropertyType) -> Self {
        PropertyDecl {
            property_type,
            is_generated: None,
        }
    }

    /// Time-derived properties are generated unless explicitly opted out.
    pub fn should_generate(&self) -> bool {
        self.property_type.is_time_derived() && self.is_generated.unwrap_or(true)
    }
}

/// Context schema of a tree: property declarations and output names.
///
/// Keys the interpreter does not use (`time_quantum`,
/// `learning_period`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub context: BTreeMap<String, PropertyDecl>,
    #[serde(default)]
    pub output: Vec<String>,
}

impl Configuration {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.output.is_empty()
    }

    pub fn is_output(&self, property: &str) -> bool {
        self.output.iter().any(|o| o == property)
    }

    /// Declared properties that are not outputs, i.e. the ones a context
    /// must supply.
    pub fn input_properties(&self) -> impl Iterator<Item = (&String, &PropertyDecl)> + '_ {
        self.context
            .iter()
            .filter(move |(name, _)| !self.is_output(name))
    }
}

/// A `{property, operator, operand}` triple attached to a tree edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRule {
    pub property: String,
    pub operator: String,
    pub operand: serde_json::Value,
}

/// A tree node. Children carry the rule that leads to them; leaves carry
/// the prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_rule: Option<DecisionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<serde_json::Number>,
}

impl Node {
    /// A node without children, or with an empty children list.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().map_or(true, |c| c.is_empty())
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Result of [`parse_tree`](crate::parse_tree).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTree {
    /// One root node per output property.
    pub trees: BTreeMap<String, Node>,
    pub configuration: Configuration,
    pub version: semver::Version,
}
