//! Parsed template tree.
//!
//! Text nodes keep spans into the template source rather than copies.

use rowan::TextRange;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextRange),
    /// `{{pipeline}}`; prints unless the pipeline declares or assigns.
    Action(Pipeline),
    If(Branch),
    With(Branch),
    Range(Branch),
    Break(TextRange),
    Continue(TextRange),
}

/// Body of `if`, `with` and `range`.
///
/// For `range`, the pipeline's declared variables are the loop variables;
/// `otherwise` runs when the collection is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub pipeline: Pipeline,
    pub body: Vec<Node>,
    pub otherwise: Option<Vec<Node>>,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeclMode {
    #[default]
    None,
    /// `$x := ...`
    Declare,
    /// `$x = ...`
    Assign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Name including the leading `$`.
    pub name: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub mode: DeclMode,
    pub vars: Vec<Variable>,
    pub commands: Vec<Command>,
    pub range: TextRange,
}

/// One stage of a pipeline: a function call or a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub args: Vec<Operand>,
    pub range: TextRange,
}

/// A term followed by an optional chain of field accesses.
///
/// `.Types.Int` is `Term::Dot` with fields `["Types", "Int"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub term: Term,
    pub fields: Vec<String>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Dot,
    Variable(String),
    Function(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
    Pipeline(Box<Pipeline>),
}
