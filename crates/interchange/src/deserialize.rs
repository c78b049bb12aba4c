//! Parsing of tree objects into typed structs.
//!
//! The main entry point is [`parse_tree`], which takes a
//! `&serde_json::Value` and produces a [`ParsedTree`].

use std::collections::BTreeMap;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde::Deserialize;

use crate::types::{Configuration, Node, ParsedTree};

/// Errors raised while unwrapping a tree object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The tree is not a JSON object, or is an empty one.
    #[error("the given json is not an object")]
    NotAnObject,
    /// No `_version` field.
    #[error("unable to find the version information")]
    MissingVersion,
    /// `_version` is not a `MAJOR.MINOR.PATCH` string.
    #[error("\"{version}\" is not a valid version")]
    InvalidVersion { version: String },
    /// `_version` is well formed but outside [`supported_versions`].
    #[error("{version} is not a supported version")]
    UnsupportedVersion { version: String },
    /// A required top-level field is missing or null.
    #[error("no {field} found")]
    MissingField { field: String },
    /// A top-level field does not have the expected structure.
    #[error("malformed {field}: {message}")]
    Malformed { field: String, message: String },
}

/// The tree versions this interpreter understands: `>=1.0.0, <2.0.0`.
pub fn supported_versions() -> VersionReq {
    let bound = |op, major| Comparator {
        op,
        major,
        minor: Some(0),
        patch: Some(0),
        pre: Prerelease::EMPTY,
    };
    VersionReq {
        comparators: vec![bound(Op::GreaterEq, 1), bound(Op::Less, 2)],
    }
}

/// Validate and unwrap a tree object.
///
/// Checks run in order: object shape, version presence, version format,
/// version range, then `configuration` and `trees`. Operators and leaf
/// predictions are left for the traversal to check.
pub fn parse_tree(tree: &serde_json::Value) -> Result<ParsedTree, InterchangeError> {
    let obj = match tree.as_object() {
        Some(obj) if !obj.is_empty() => obj,
        _ => return Err(InterchangeError::NotAnObject),
    };

    let raw_version = match obj.get("_version") {
        None | Some(serde_json::Value::Null) => return Err(InterchangeError::MissingVersion),
        Some(serde_json::Value::String(s)) if s.is_empty() => {
            return Err(InterchangeError::MissingVersion)
        }
        Some(serde_json::Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(InterchangeError::InvalidVersion {
                version: other.to_string(),
            })
        }
    };
    let version = parse_version(raw_version)?;

    // Suffixes do not take part in the range check: `1.2.0-beta` is a 1.x tree.
    let release = Version::new(version.major, version.minor, version.patch);
    if !supported_versions().matches(&release) {
        return Err(InterchangeError::UnsupportedVersion {
            version: raw_version.to_string(),
        });
    }

    let configuration_val = required_field(obj, "configuration")?;
    let configuration = Configuration::deserialize(configuration_val).map_err(|e| {
        InterchangeError::Malformed {
            field: "configuration".to_string(),
            message: e.to_string(),
        }
    })?;

    let trees_val = required_field(obj, "trees")?;
    let trees = BTreeMap::<String, Node>::deserialize(trees_val).map_err(|e| {
        InterchangeError::Malformed {
            field: "trees".to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(ParsedTree {
        trees,
        configuration,
        version,
    })
}

fn required_field<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<&'a serde_json::Value, InterchangeError> {
    match obj.get(field) {
        None | Some(serde_json::Value::Null) => Err(InterchangeError::MissingField {
            field: field.to_string(),
        }),
        Some(v) => Ok(v),
    }
}

/// Parse a `MAJOR.MINOR.PATCH` version, optionally followed by semver
/// pre-release or build metadata.
fn parse_version(raw: &str) -> Result<Version, InterchangeError> {
    let invalid = || InterchangeError::InvalidVersion {
        version: raw.to_string(),
    };
    let core = raw.split(['-', '+']).next().unwrap_or("");
    let mut parts = 0;
    for part in core.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        parts += 1;
    }
    if parts != 3 {
        return Err(invalid());
    }
    Version::parse(raw).map_err(|_| invalid())
}
