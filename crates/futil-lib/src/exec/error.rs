use rowan::TextRange;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::helpers::HelperError;

/// A failure while rendering, located at the offending operand.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct ExecError {
    pub kind: ExecErrorKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecErrorKind {
    #[error("can't evaluate field {field} in type {receiver}")]
    UnknownField {
        field: String,
        receiver: &'static str,
    },

    #[error("nil pointer evaluating field {field}")]
    NilField { field: String },

    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    #[error("function \"{name}\" not defined")]
    UndefinedFunction { name: String },

    #[error("can't give argument to non-function {operand}")]
    NotAFunction { operand: String },

    #[error("error calling {name}: {source}")]
    Helper { name: String, source: HelperError },

    #[error("wrong number of args for {name}: want {expected} got {got}")]
    ArgCount {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("wrong type for {name}: expected {expected}, got {got}")]
    ArgType {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("range can't iterate over {ty}")]
    NotIterable { ty: &'static str },

    #[error("index out of range: {index}")]
    IndexOutOfRange { index: i64 },

    #[error("incompatible types for comparison: {left} and {right}")]
    IncomparableTypes {
        left: &'static str,
        right: &'static str,
    },

    #[error("bad format: {reason}")]
    BadFormat { reason: String },

    #[error("can't index item of type {ty}")]
    NotIndexable { ty: &'static str },
}

impl ExecError {
    pub fn new(kind: ExecErrorKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    /// Single execution diagnostic, for rendering with the parse printer.
    pub fn to_diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .report(DiagnosticKind::Execution, self.range)
            .message(self.kind.to_string())
            .emit();
        diagnostics
    }
}
