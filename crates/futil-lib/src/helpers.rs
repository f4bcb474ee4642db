//! Named string transformations callable from templates.

use futil_core::case;
use indexmap::IndexMap;

/// Signature shared by all helpers: one string in, one string out.
pub type HelperFn = fn(&str) -> Result<String, HelperError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelperError {
    #[error("empty string")]
    EmptyString,

    #[error("{0}")]
    Invalid(String),
}

/// Helper table, looked up by name before builtins.
///
/// ```
/// use futil_lib::{HelperError, Helpers};
///
/// fn shout(s: &str) -> Result<String, HelperError> {
///     Ok(format!("{}!", s.to_uppercase()))
/// }
///
/// let helpers = Helpers::standard().with("shout", shout);
/// assert!(helpers.get("shout").is_some());
/// assert!(helpers.get("first").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Helpers {
    funcs: IndexMap<String, HelperFn>,
}

impl Helpers {
    pub fn empty() -> Self {
        Self {
            funcs: IndexMap::new(),
        }
    }

    /// `first`, `lower`, `upper`, `title`, `snake`, `pascal` and `camel`.
    pub fn standard() -> Self {
        Self::empty()
            .with("first", first)
            .with("lower", |s| Ok(s.to_lowercase()))
            .with("upper", |s| Ok(s.to_uppercase()))
            .with("title", |s| Ok(case::capitalize(s)))
            .with("snake", |s| Ok(case::to_snake_case(s)))
            .with("pascal", |s| Ok(case::to_pascal_case(s)))
            .with("camel", |s| Ok(case::to_camel_case(s)))
    }

    /// Add or replace a helper.
    pub fn with(mut self, name: impl Into<String>, f: HelperFn) -> Self {
        self.funcs.insert(name.into(), f);
        self
    }

    pub fn get(&self, name: &str) -> Option<HelperFn> {
        self.funcs.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }
}

impl Default for Helpers {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lowercase first character: `"String"` becomes `"s"`.
pub fn first(s: &str) -> Result<String, HelperError> {
    case::first_lower(s).ok_or(HelperError::EmptyString)
}
