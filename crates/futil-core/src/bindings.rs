//! Type binding registry.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::BASICS;

/// Errors produced while reading `label=Type` pairs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("malformed binding `{pair}`: expected `label=Type`")]
    MissingSeparator { pair: String },

    #[error("malformed binding `{pair}`: label is empty")]
    EmptyLabel { pair: String },

    #[error("malformed binding `{pair}`: type is empty")]
    EmptyType { pair: String },
}

/// A single `label=Type` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub label: String,
    pub concrete: String,
}

impl Binding {
    /// Split `pair` on its first `=`.
    ///
    /// Everything after the first separator belongs to the type, so
    /// `Map=map[string]int` and `F=func(a int) (b int)` both parse.
    pub fn parse(pair: &str) -> Result<Self, BindingError> {
        let Some((label, concrete)) = pair.split_once('=') else {
            return Err(BindingError::MissingSeparator {
                pair: pair.to_string(),
            });
        };

        let label = label.trim();
        let concrete = concrete.trim();

        if label.is_empty() {
            return Err(BindingError::EmptyLabel {
                pair: pair.to_string(),
            });
        }
        if concrete.is_empty() {
            return Err(BindingError::EmptyType {
                pair: pair.to_string(),
            });
        }

        Ok(Self {
            label: label.to_string(),
            concrete: concrete.to_string(),
        })
    }
}

impl FromStr for Binding {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.concrete)
    }
}

/// Mapping from label to concrete type name.
///
/// Iteration is lexicographic by label, so anything rendered from a
/// registry comes out in the same order on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeBindings(BTreeMap<String, String>);

impl TypeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `label=Type` pairs.
    ///
    /// Fails on the first malformed pair. A label given twice keeps the
    /// last type.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bindings = Self::new();
        for pair in pairs {
            let Binding { label, concrete } = Binding::parse(pair.as_ref())?;
            bindings.insert(label, concrete);
        }
        Ok(bindings)
    }

    /// A registry holding exactly the [`BASICS`] preset.
    pub fn basics() -> Self {
        Self::new().with_basics()
    }

    /// Merge the [`BASICS`] preset in.
    ///
    /// Labels already bound keep their type: user bindings win over the preset.
    pub fn with_basics(mut self) -> Self {
        for (label, concrete) in BASICS {
            self.0
                .entry(label.to_string())
                .or_insert_with(|| concrete.to_string());
        }
        self
    }

    /// Bind `label` to `concrete`, replacing any previous binding.
    pub fn insert(&mut self, label: impl Into<String>, concrete: impl Into<String>) {
        self.0.insert(label.into(), concrete.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<Binding> for TypeBindings {
    fn from_iter<T: IntoIterator<Item = Binding>>(iter: T) -> Self {
        Self(iter.into_iter().map(|b| (b.label, b.concrete)).collect())
    }
}

impl<'a> IntoIterator for &'a TypeBindings {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
