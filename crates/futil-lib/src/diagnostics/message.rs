use std::fmt;

use rowan::TextRange;

/// Template diagnostic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Delimiters
    UnclosedAction,
    UnclosedComment,
    UnclosedBlock,

    // Tokens
    UnexpectedCharacter,
    UnexpectedToken,
    InvalidString,
    InvalidNumber,

    // Structure
    UnexpectedEnd,
    UnexpectedElse,
    ExpectedOperand,
    MissingPipeline,
    TooManyVariables,
    ControlOutsideRange,
    NestingTooDeep,

    // Scoping
    UndefinedVariable,

    // Raised while executing, not while parsing
    Execution,
}

impl DiagnosticKind {
    /// Base message for this kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedAction => "unclosed action: missing `}}`",
            Self::UnclosedComment => "unclosed comment: missing `*/}}`",
            Self::UnclosedBlock => "missing `{{end}}`",
            Self::UnexpectedCharacter => "unexpected character in action",
            Self::UnexpectedToken => "unexpected token",
            Self::InvalidString => "invalid string literal",
            Self::InvalidNumber => "invalid number literal",
            Self::UnexpectedEnd => "unexpected `{{end}}`",
            Self::UnexpectedElse => "unexpected `{{else}}`",
            Self::ExpectedOperand => "expected an operand",
            Self::MissingPipeline => "missing value",
            Self::TooManyVariables => "too many declarations",
            Self::ControlOutsideRange => "only allowed inside `{{range}}`",
            Self::NestingTooDeep => "nesting too deep",
            Self::UndefinedVariable => "undefined variable",
            Self::Execution => "execution failed",
        }
    }
}

/// Secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub range: TextRange,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}
