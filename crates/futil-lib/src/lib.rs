//! futil: expand type bindings through a template into specialized source.
//!
//! # Example
//!
//! ```
//! use futil_core::TypeBindings;
//! use futil_lib::{GenerationContext, generate};
//!
//! let types = TypeBindings::from_pairs(["Int=int", "String=string"]).unwrap();
//! let context = GenerationContext::new("demo", types);
//! let template = "{{range $l, $t := .Types}}type {{$l}}Slice []{{$t}}\n{{end}}";
//!
//! let out = generate(&context, template).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "type IntSlice []int\ntype StringSlice []string\n"
//! );
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod context;
pub mod diagnostics;
pub mod exec;
pub mod generate;
pub mod helpers;
pub mod template;

#[cfg(test)]
mod context_tests;
#[cfg(test)]
mod generate_tests;

pub use context::GenerationContext;
pub use diagnostics::{Diagnostics, DiagnosticsPrinter};
pub use exec::{ExecError, ExecErrorKind, Value};
pub use generate::{Generator, generate};
pub use helpers::{HelperError, HelperFn, Helpers};
pub use template::Template;

/// Errors from parsing or rendering a template.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("template parsing failed with {} error(s)", .0.error_count())]
    Parse(Diagnostics),

    #[error("template execution failed: {0}")]
    Execution(#[from] ExecError),
}

impl Error {
    /// Diagnostics locating the failure in the template source.
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            Error::Parse(diagnostics) => diagnostics.clone(),
            Error::Execution(err) => err.to_diagnostics(),
        }
    }

    /// One line naming the first problem and where it is: `line:col: message`.
    pub fn summary(&self, source: &str) -> String {
        self.diagnostics()
            .summary(source)
            .unwrap_or_else(|| self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
