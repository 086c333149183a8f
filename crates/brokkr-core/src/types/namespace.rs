//! Namespace scoping for extension installations

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scope into which an extension is installed.
///
/// `All` is the distinguished unscoped value: an action carrying it applies
/// irrespective of any specific namespace. A `Scoped` action only applies if
/// the target extension record lists that namespace among its installed
/// namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// All namespaces (global / unscoped)
    #[default]
    All,
    /// A single concrete namespace
    Scoped(String),
}

impl Namespace {
    /// Create a concrete namespace
    pub fn scoped(name: impl Into<String>) -> Self {
        Self::Scoped(name.into())
    }

    /// Whether this is the all-namespaces sentinel
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The concrete namespace name, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Scoped(name) => Some(name),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("<all>"),
            Self::Scoped(name) => f.write_str(name),
        }
    }
}

impl From<Option<String>> for Namespace {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::All,
            Some(name) => Self::Scoped(name),
        }
    }
}

impl From<&str> for Namespace {
    fn from(value: &str) -> Self {
        Self::Scoped(value.to_string())
    }
}
