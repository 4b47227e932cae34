//! Dynamically-shaped snapshot data.
//!
//! Every collector produces one Fragment: a tree of mappings, sequences and
//! scalars. The core treats fragments as opaque except for structural
//! comparison, so the representation has to round-trip losslessly through
//! JSON and compare deterministically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Numeric scalar. Integer and float representations of the same value
/// compare equal, so a metric flipping between `10` and `10.0` across
/// captures is not reported as a change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) => {
                (*a as f64) == *b
            }
        }
    }
}

/// One node of a snapshot data tree.
///
/// Mappings are ordered so that diffing, serialization and rendering are
/// deterministic regardless of the order keys were inserted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Fragment>),
    Mapping(BTreeMap<String, Fragment>),
}

impl Fragment {
    /// Structural kind name, used for type-change reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Fragment::Null => "null",
            Fragment::Bool(_) => "bool",
            Fragment::Number(_) => "number",
            Fragment::String(_) => "string",
            Fragment::Sequence(_) => "sequence",
            Fragment::Mapping(_) => "mapping",
        }
    }

    pub fn same_kind(&self, other: &Fragment) -> bool {
        self.kind() == other.kind()
    }

    /// An empty fragment of this fragment's structural kind. Scalars have no
    /// empty form and degrade to Null.
    pub fn empty_like(&self) -> Fragment {
        match self {
            Fragment::Mapping(_) => Fragment::Mapping(BTreeMap::new()),
            Fragment::Sequence(_) => Fragment::Sequence(Vec::new()),
            _ => Fragment::Null,
        }
    }

    /// The in-band marker recorded when a collector fails. Shaped like any
    /// other mapping so downstream diffing never special-cases it.
    pub fn error_marker(message: &str) -> Fragment {
        Fragment::mapping([("error", Fragment::from(message))])
    }

    /// Build a mapping fragment from key/value pairs.
    pub fn mapping<I, K>(entries: I) -> Fragment
    where
        I: IntoIterator<Item = (K, Fragment)>,
        K: Into<String>,
    {
        Fragment::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Fragment {
    fn from(value: bool) -> Self {
        Fragment::Bool(value)
    }
}

impl From<i64> for Fragment {
    fn from(value: i64) -> Self {
        Fragment::Number(Number::Int(value))
    }
}

impl From<f64> for Fragment {
    fn from(value: f64) -> Self {
        Fragment::Number(Number::Float(value))
    }
}

impl From<&str> for Fragment {
    fn from(value: &str) -> Self {
        Fragment::String(value.to_string())
    }
}

impl From<String> for Fragment {
    fn from(value: String) -> Self {
        Fragment::String(value)
    }
}
