//! Tree-walking executor.
//!
//! Evaluation is read-only over the data: values are borrowed where
//! possible and cloned only when bound to a variable or produced by a call.
//! The first error aborts rendering.

mod builtins;
mod error;
mod value;

#[cfg(test)]
mod exec_tests;
#[cfg(test)]
mod value_tests;

use std::borrow::Cow;
use std::ops::Range;

use rowan::TextRange;

pub use error::{ExecError, ExecErrorKind};
pub use value::{FieldError, Value};

use crate::helpers::Helpers;
use crate::template::Template;
use crate::template::ast::{Branch, Command, DeclMode, Node, Operand, Pipeline, Term, Variable};

pub type ExecResult<T> = Result<T, ExecError>;

/// How a node list finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Break,
    Continue,
}

pub(crate) fn execute(template: &Template, data: &Value, helpers: &Helpers) -> ExecResult<String> {
    let mut executor = Executor {
        source: template.source(),
        helpers,
        vars: vec![("$".to_string(), data.clone())],
        out: String::with_capacity(template.source().len()),
    };
    executor.walk(template.nodes(), data)?;
    Ok(executor.out)
}

pub(crate) struct Executor<'t> {
    source: &'t str,
    helpers: &'t Helpers,
    /// Variable stack, innermost last.
    vars: Vec<(String, Value)>,
    out: String,
}

impl<'t> Executor<'t> {
    fn walk(&mut self, nodes: &[Node], dot: &Value) -> ExecResult<Flow> {
        for node in nodes {
            let flow = match node {
                Node::Text(range) => {
                    self.out.push_str(&self.source[Range::<usize>::from(*range)]);
                    Flow::Next
                }
                Node::Action(pipeline) => {
                    let value = self.pipeline(pipeline, dot)?;
                    if pipeline.mode == DeclMode::None {
                        self.out.push_str(&value.render());
                    }
                    Flow::Next
                }
                Node::If(branch) => self.if_node(branch, dot)?,
                Node::With(branch) => self.with_node(branch, dot)?,
                Node::Range(branch) => self.range_node(branch, dot)?,
                Node::Break(_) => Flow::Break,
                Node::Continue(_) => Flow::Continue,
            };
            if flow != Flow::Next {
                return Ok(flow);
            }
        }
        Ok(Flow::Next)
    }

    /// Run `nodes` in a fresh variable scope.
    fn scoped(&mut self, scope: usize, nodes: &[Node], dot: &Value) -> ExecResult<Flow> {
        let flow = self.walk(nodes, dot);
        self.vars.truncate(scope);
        flow
    }

    fn if_node(&mut self, branch: &Branch, dot: &Value) -> ExecResult<Flow> {
        let scope = self.vars.len();
        let cond = self.pipeline(&branch.pipeline, dot)?;
        match (cond.is_truthy(), &branch.otherwise) {
            (true, _) => self.scoped(scope, &branch.body, dot),
            (false, Some(otherwise)) => self.scoped(scope, otherwise, dot),
            (false, None) => {
                self.vars.truncate(scope);
                Ok(Flow::Next)
            }
        }
    }

    fn with_node(&mut self, branch: &Branch, dot: &Value) -> ExecResult<Flow> {
        let scope = self.vars.len();
        let value = self.pipeline(&branch.pipeline, dot)?;
        match (value.is_truthy(), &branch.otherwise) {
            (true, _) => self.scoped(scope, &branch.body, &value),
            (false, Some(otherwise)) => self.scoped(scope, otherwise, dot),
            (false, None) => {
                self.vars.truncate(scope);
                Ok(Flow::Next)
            }
        }
    }

    fn range_node(&mut self, branch: &Branch, dot: &Value) -> ExecResult<Flow> {
        let pipeline = &branch.pipeline;
        let collection = self.commands(pipeline, dot)?;
        let empty = match &collection {
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Int(n) => *n <= 0,
            Value::Nil => true,
            other => {
                return Err(ExecError::new(
                    ExecErrorKind::NotIterable {
                        ty: other.type_name(),
                    },
                    pipeline.range,
                ));
            }
        };

        let scope = self.vars.len();
        if empty {
            return match &branch.otherwise {
                Some(otherwise) => self.scoped(scope, otherwise, dot),
                None => Ok(Flow::Next),
            };
        }

        // Items are produced one at a time so a `break` stops the work.
        match collection {
            Value::List(items) => {
                for (i, item) in items.into_iter().enumerate() {
                    if self.iteration(branch, scope, Value::Int(i as i64), item)? == Flow::Break {
                        break;
                    }
                }
            }
            Value::Map(map) => {
                for (key, item) in map {
                    if self.iteration(branch, scope, Value::Str(key), item)? == Flow::Break {
                        break;
                    }
                }
            }
            Value::Int(n) => {
                for i in 0..n {
                    if self.iteration(branch, scope, Value::Int(i), Value::Int(i))? == Flow::Break {
                        break;
                    }
                }
            }
            _ => {}
        }
        Ok(Flow::Next)
    }

    /// One pass of a range body with its variables bound.
    fn iteration(&mut self, branch: &Branch, scope: usize, key: Value, item: Value) -> ExecResult<Flow> {
        let pipeline = &branch.pipeline;
        match pipeline.vars.as_slice() {
            [] => {}
            [elem] => self.bind(pipeline.mode, elem, item.clone())?,
            [index, elem, ..] => {
                self.bind(pipeline.mode, index, key)?;
                self.bind(pipeline.mode, elem, item.clone())?;
            }
        }
        self.scoped(scope, &branch.body, &item)
    }

    /// Evaluate a pipeline and apply its declarations.
    fn pipeline(&mut self, pipeline: &Pipeline, dot: &Value) -> ExecResult<Value> {
        let value = self.commands(pipeline, dot)?;
        for var in &pipeline.vars {
            self.bind(pipeline.mode, var, value.clone())?;
        }
        Ok(value)
    }

    fn bind(&mut self, mode: DeclMode, var: &Variable, value: Value) -> ExecResult<()> {
        match mode {
            DeclMode::None => Ok(()),
            DeclMode::Declare => {
                self.vars.push((var.name.clone(), value));
                Ok(())
            }
            DeclMode::Assign => {
                let slot = self
                    .vars
                    .iter_mut()
                    .rev()
                    .find(|(name, _)| *name == var.name)
                    .ok_or_else(|| undefined_variable(&var.name, var.range))?;
                slot.1 = value;
                Ok(())
            }
        }
    }

    /// Evaluate the commands of a pipeline, feeding each result to the next.
    pub(crate) fn commands(&self, pipeline: &Pipeline, dot: &Value) -> ExecResult<Value> {
        let mut piped = None;
        for command in &pipeline.commands {
            piped = Some(self.command(command, dot, piped.take())?);
        }
        Ok(piped.unwrap_or(Value::Nil))
    }

    fn command(&self, command: &Command, dot: &Value, piped: Option<Value>) -> ExecResult<Value> {
        let Some((first, args)) = command.args.split_first() else {
            return Ok(piped.unwrap_or(Value::Nil));
        };

        if let Term::Function(name) = &first.term {
            return self.call(name, first.range, args, dot, piped);
        }

        if !args.is_empty() || piped.is_some() {
            return Err(ExecError::new(
                ExecErrorKind::NotAFunction {
                    operand: self.text(first.range).to_string(),
                },
                first.range,
            ));
        }
        Ok(self.operand(first, dot)?.into_owned())
    }

    pub(crate) fn operand<'a>(&'a self, operand: &Operand, dot: &'a Value) -> ExecResult<Cow<'a, Value>> {
        let base: Cow<'a, Value> = match &operand.term {
            Term::Dot => Cow::Borrowed(dot),
            Term::Variable(name) => Cow::Borrowed(self.lookup(name, operand.range)?),
            Term::Function(name) => Cow::Owned(self.call(name, operand.range, &[], dot, None)?),
            Term::Str(s) => Cow::Owned(Value::Str(s.clone())),
            Term::Int(n) => Cow::Owned(Value::Int(*n)),
            Term::Bool(b) => Cow::Owned(Value::Bool(*b)),
            Term::Nil => Cow::Owned(Value::Nil),
            Term::Pipeline(pipeline) => Cow::Owned(self.commands(pipeline, dot)?),
        };

        if operand.fields.is_empty() {
            return Ok(base);
        }

        let mut current: &Value = &base;
        for field in &operand.fields {
            current = current.field_ref(field).map_err(|err| {
                let kind = match err {
                    FieldError::Nil => ExecErrorKind::NilField {
                        field: field.clone(),
                    },
                    FieldError::Unknown { receiver } => ExecErrorKind::UnknownField {
                        field: field.clone(),
                        receiver,
                    },
                };
                ExecError::new(kind, operand.range)
            })?;
        }
        Ok(Cow::Owned(current.clone()))
    }

    fn lookup(&self, name: &str, range: TextRange) -> ExecResult<&Value> {
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
            .ok_or_else(|| undefined_variable(name, range))
    }

    /// Call a helper or builtin. Helpers shadow builtins of the same name.
    fn call(
        &self,
        name: &str,
        range: TextRange,
        args: &[Operand],
        dot: &Value,
        piped: Option<Value>,
    ) -> ExecResult<Value> {
        let Some(helper) = self.helpers.get(name) else {
            return builtins::call(self, name, range, args, dot, piped);
        };

        let mut values = self.eval_args(args, dot)?;
        values.extend(piped);
        let input = match values.as_slice() {
            [Value::Str(s)] => s,
            [other] => {
                return Err(ExecError::new(
                    ExecErrorKind::ArgType {
                        name: name.to_string(),
                        expected: "string",
                        got: other.type_name(),
                    },
                    range,
                ));
            }
            _ => {
                return Err(ExecError::new(
                    ExecErrorKind::ArgCount {
                        name: name.to_string(),
                        expected: "1",
                        got: values.len(),
                    },
                    range,
                ));
            }
        };

        helper(input).map(Value::Str).map_err(|source| {
            ExecError::new(
                ExecErrorKind::Helper {
                    name: name.to_string(),
                    source,
                },
                range,
            )
        })
    }

    pub(crate) fn eval_args(&self, args: &[Operand], dot: &Value) -> ExecResult<Vec<Value>> {
        args.iter()
            .map(|arg| self.operand(arg, dot).map(Cow::into_owned))
            .collect()
    }

    fn text(&self, range: TextRange) -> &str {
        &self.source[Range::<usize>::from(range)]
    }
}

fn undefined_variable(name: &str, range: TextRange) -> ExecError {
    ExecError::new(
        ExecErrorKind::UndefinedVariable {
            name: name.to_string(),
        },
        range,
    )
}
