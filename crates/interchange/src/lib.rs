//! sylva-interchange: decision-tree interchange types and parsing.
//!
//! A tree object is the JSON artifact produced by the learning service:
//! a `_version` string, a `configuration` declaring the context schema,
//! and one decision tree per output property under `trees`.
//!
//! [`parse_tree`] gates on the supported version range and unwraps the
//! artifact into typed structs. It never mutates the input value, so the
//! same tree object can be shared between concurrent decisions.

pub mod deserialize;
pub mod types;

pub use deserialize::{parse_tree, supported_versions, InterchangeError};
pub use types::*;
