//! Template language: a subset of Go's `text/template`.
//!
//! `{{ ... }}` actions hold pipelines and control structures; everything
//! else is copied to the output. See [`Template::parse`].

pub mod ast;
mod lexer;
mod parser;
mod syntax;


pub use lexer::{Action, Segment, Token, lex, token_text};
pub use parser::MAX_DEPTH;
pub use syntax::TokenKind;

use crate::exec::{self, ExecError, Value};
use crate::helpers::Helpers;
use crate::{Error, Result};
use ast::Node;

/// A parsed template.
///
/// Owns its source; text nodes are spans into it.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template text. All syntax errors are collected and returned
    /// together as [`Error::Parse`].
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let (nodes, diagnostics) = parser::parse(&source);
        if diagnostics.has_errors() {
            return Err(Error::Parse(diagnostics));
        }
        Ok(Self { source, nodes })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render with `data` bound to `.` and `$`.
    pub fn execute(&self, data: &Value, helpers: &Helpers) -> std::result::Result<String, ExecError> {
        exec::execute(self, data, helpers)
    }
}
