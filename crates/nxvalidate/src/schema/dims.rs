//! Dimension specifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Expected length of one dimension: fixed, or a symbol shared across fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Fixed(usize),
    Symbol(String),
}

impl Dim {
    /// Create a symbolic dimension.
    pub fn symbol(name: impl Into<String>) -> Self {
        Dim::Symbol(name.into())
    }
}

impl From<usize> for Dim {
    fn from(len: usize) -> Self {
        Dim::Fixed(len)
    }
}

impl From<&str> for Dim {
    /// Numeric text becomes a fixed length; anything else is a symbol.
    fn from(text: &str) -> Self {
        match text.trim().parse::<usize>() {
            Ok(len) => Dim::Fixed(len),
            Err(_) => Dim::Symbol(text.trim().to_string()),
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Fixed(len) => write!(f, "{}", len),
            Dim::Symbol(name) => f.write_str(name),
        }
    }
}

/// Build a dimension list from mixed literals: `dims![3usize, "nDet"]`.
#[macro_export]
macro_rules! dims {
    ($($d:expr),* $(,)?) => {
        vec![$($crate::schema::Dim::from($d)),*]
    };
}
