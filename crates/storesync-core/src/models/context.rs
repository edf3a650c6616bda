//! Dynamically typed scalar values used for customizations, location
//! attributes, and render contexts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar value in a render context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ContextValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// String-keyed map of scalars. Ordered so prompts and previews are stable.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// Build a [`ContextMap`] from `key => value` pairs.
#[macro_export]
macro_rules! context_map {
    () => { $crate::models::ContextMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::models::ContextMap::new();
        $( map.insert($key.to_string(), $crate::models::ContextValue::from($value)); )+
        map
    }};
}
