//! Recursive-descent parser over lexer segments.
//!
//! Each action is parsed on its own token slice, so an error inside one
//! action never disturbs the next: the parser reports, skips the action,
//! and carries on. Block structure (`if`/`with`/`range` ... `end`) is
//! tracked across segments.

use rowan::TextRange;

use super::ast::{Branch, Command, DeclMode, Node, Operand, Pipeline, Term, Variable};
use super::lexer::{Action, Segment, Token, lex, token_text};
use super::syntax::TokenKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Maximum nesting of blocks and parenthesized pipelines.
pub const MAX_DEPTH: u32 = 128;

/// Parse a template, returning its nodes and every diagnostic found.
pub fn parse(source: &str) -> (Vec<Node>, Diagnostics) {
    let (segments, mut diagnostics) = lex(source);
    let mut parser = Parser::new(source, segments);
    let nodes = parser.root();
    diagnostics.extend(parser.diagnostics);
    diagnostics.sort();
    (nodes, diagnostics)
}

/// Marker: the diagnostic has already been emitted.
struct Reported;

type PResult<T> = Result<T, Reported>;

/// Why a node list stopped.
enum Stop {
    End(TextRange),
    Else { range: TextRange, rest: Vec<Token> },
    Eof,
}

enum Item {
    Node(Node),
    Stop(Stop),
    Skip,
}

/// How many variables a pipeline may declare.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Decls {
    One,
    Two,
}

impl Decls {
    fn limit(self) -> usize {
        match self {
            Decls::One => 1,
            Decls::Two => 2,
        }
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }
}

fn cover(start: TextRange, end: TextRange) -> TextRange {
    TextRange::new(start.start(), end.end())
}

struct Parser<'s> {
    source: &'s str,
    segments: std::vec::IntoIter<Segment>,
    diagnostics: Diagnostics,
    /// Variables in scope, innermost last. `$` is always present.
    vars: Vec<String>,
    range_depth: u32,
    depth: u32,
    too_deep: bool,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, segments: Vec<Segment>) -> Self {
        Self {
            source,
            segments: segments.into_iter(),
            diagnostics: Diagnostics::new(),
            vars: vec!["$".to_string()],
            range_depth: 0,
            depth: 0,
            too_deep: false,
        }
    }

    fn root(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            let (mut list, stop) = self.list();
            nodes.append(&mut list);
            match stop {
                Stop::Eof => return nodes,
                Stop::End(range) => self
                    .diagnostics
                    .report(DiagnosticKind::UnexpectedEnd, range)
                    .emit(),
                Stop::Else { range, .. } => self
                    .diagnostics
                    .report(DiagnosticKind::UnexpectedElse, range)
                    .emit(),
            }
        }
    }

    fn list(&mut self) -> (Vec<Node>, Stop) {
        let mut nodes = Vec::new();
        while let Some(segment) = self.segments.next() {
            match segment {
                Segment::Text(range) => nodes.push(Node::Text(range)),
                Segment::Action(action) => match self.action(action) {
                    Item::Node(node) => nodes.push(node),
                    Item::Stop(stop) => return (nodes, stop),
                    Item::Skip => {}
                },
            }
        }
        (nodes, Stop::Eof)
    }

    fn nested(&mut self, open: TextRange) -> (Vec<Node>, Stop) {
        if self.depth >= MAX_DEPTH {
            if !self.too_deep {
                self.diagnostics
                    .report(DiagnosticKind::NestingTooDeep, open)
                    .message(format!("blocks nested deeper than {MAX_DEPTH} levels"))
                    .emit();
                self.too_deep = true;
            }
            self.segments.by_ref().for_each(drop);
            return (Vec::new(), Stop::Eof);
        }

        self.depth += 1;
        let result = self.list();
        self.depth -= 1;
        result
    }

    fn action(&mut self, action: Action) -> Item {
        let Action { range, tokens } = action;
        let Some(first) = tokens.first().copied() else {
            self.diagnostics
                .report(DiagnosticKind::MissingPipeline, range)
                .message("empty action")
                .emit();
            return Item::Skip;
        };

        match first.kind {
            TokenKind::KwEnd => {
                if let Some(extra) = tokens.get(1) {
                    self.unexpected(extra);
                }
                Item::Stop(Stop::End(range))
            }
            TokenKind::KwElse => Item::Stop(Stop::Else {
                range,
                rest: tokens[1..].to_vec(),
            }),
            TokenKind::KwIf => Item::Node(self.if_block(range, &tokens[1..])),
            TokenKind::KwWith => Item::Node(self.with_block(range, &tokens[1..])),
            TokenKind::KwRange => Item::Node(self.range_block(range, &tokens[1..])),
            TokenKind::KwBreak | TokenKind::KwContinue => {
                if self.range_depth == 0 {
                    let keyword = token_text(self.source, &first);
                    self.diagnostics
                        .report(DiagnosticKind::ControlOutsideRange, first.span)
                        .message(format!("`{keyword}` is only allowed inside `{{{{range}}}}`"))
                        .emit();
                }
                if let Some(extra) = tokens.get(1) {
                    self.unexpected(extra);
                }
                if first.kind == TokenKind::KwBreak {
                    Item::Node(Node::Break(range))
                } else {
                    Item::Node(Node::Continue(range))
                }
            }
            _ => match self.pipeline(&tokens, range, Decls::One) {
                Ok(pipeline) => Item::Node(Node::Action(pipeline)),
                Err(Reported) => Item::Skip,
            },
        }
    }

    fn if_block(&mut self, range: TextRange, tokens: &[Token]) -> Node {
        let scope = self.vars.len();
        let pipeline = self.pipeline(tokens, range, Decls::One).unwrap_or_default();
        let (body, stop) = self.nested(range);
        let otherwise = self.close(stop, range, "if", Some(TokenKind::KwIf));
        self.vars.truncate(scope);
        Node::If(Branch {
            pipeline,
            body,
            otherwise,
            range,
        })
    }

    fn with_block(&mut self, range: TextRange, tokens: &[Token]) -> Node {
        let scope = self.vars.len();
        let pipeline = self.pipeline(tokens, range, Decls::One).unwrap_or_default();
        let (body, stop) = self.nested(range);
        let otherwise = self.close(stop, range, "with", Some(TokenKind::KwWith));
        self.vars.truncate(scope);
        Node::With(Branch {
            pipeline,
            body,
            otherwise,
            range,
        })
    }

    fn range_block(&mut self, range: TextRange, tokens: &[Token]) -> Node {
        let scope = self.vars.len();
        let pipeline = self.pipeline(tokens, range, Decls::Two).unwrap_or_default();

        self.range_depth += 1;
        let (body, stop) = self.nested(range);
        self.range_depth -= 1;

        let otherwise = self.close(stop, range, "range", None);
        self.vars.truncate(scope);
        Node::Range(Branch {
            pipeline,
            body,
            otherwise,
            range,
        })
    }

    /// Finish a block after its body. `chain` is the keyword allowed right
    /// after `else` (`else if`, `else with`); the chained block shares the
    /// outer `{{end}}`.
    fn close(
        &mut self,
        stop: Stop,
        open: TextRange,
        keyword: &str,
        chain: Option<TokenKind>,
    ) -> Option<Vec<Node>> {
        match stop {
            Stop::End(_) => None,
            Stop::Eof => {
                self.unclosed(open, keyword);
                None
            }
            Stop::Else { range, rest } => {
                if let Some(first) = rest.first() {
                    if Some(first.kind) == chain {
                        let node = if first.kind == TokenKind::KwIf {
                            self.if_block(range, &rest[1..])
                        } else {
                            self.with_block(range, &rest[1..])
                        };
                        return Some(vec![node]);
                    }
                    self.unexpected(first);
                }

                let (body, stop) = self.nested(range);
                self.finish_else(stop, open, keyword);
                Some(body)
            }
        }
    }

    fn finish_else(&mut self, stop: Stop, open: TextRange, keyword: &str) {
        match stop {
            Stop::End(_) => {}
            Stop::Eof => self.unclosed(open, keyword),
            Stop::Else { range, .. } => {
                self.diagnostics
                    .report(DiagnosticKind::UnexpectedElse, range)
                    .message("`{{else}}` after the final `{{else}}` branch")
                    .emit();
                let (_, stop) = self.nested(range);
                self.finish_else(stop, open, keyword);
            }
        }
    }

    fn unclosed(&mut self, open: TextRange, keyword: &str) {
        if self.too_deep {
            return;
        }
        self.diagnostics
            .report(DiagnosticKind::UnclosedBlock, open)
            .message(format!("missing `{{{{end}}}}` for `{{{{{keyword}}}}}`"))
            .emit();
    }

    fn unexpected(&mut self, token: &Token) {
        let text = token_text(self.source, token);
        let kind = if token.kind == TokenKind::Garbage {
            DiagnosticKind::UnexpectedCharacter
        } else {
            DiagnosticKind::UnexpectedToken
        };
        self.diagnostics
            .report(kind, token.span)
            .message(format!("unexpected `{text}` in action"))
            .emit();
    }

    fn is_defined(&self, name: &str) -> bool {
        self.vars.iter().rev().any(|v| v == name)
    }

    fn pipeline(
        &mut self,
        tokens: &[Token],
        action: TextRange,
        decls: Decls,
    ) -> PResult<Pipeline> {
        let mut cursor = Cursor::new(tokens);
        let (mode, vars) = self.declarations(&mut cursor, decls)?;
        let commands = self.commands(&mut cursor, action)?;

        if let Some(token) = cursor.peek() {
            self.unexpected(&token);
            return Err(Reported);
        }

        if mode == DeclMode::Declare {
            self.vars.extend(vars.iter().map(|v| v.name.clone()));
        }

        let range = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => cover(first.span, last.span),
            _ => action,
        };

        Ok(Pipeline {
            mode,
            vars,
            commands,
            range,
        })
    }

    /// `$x :=`, `$x =`, or `$k, $v :=` at the start of a pipeline.
    fn declarations(
        &mut self,
        cursor: &mut Cursor<'_>,
        decls: Decls,
    ) -> PResult<(DeclMode, Vec<Variable>)> {
        let mut vars = Vec::new();
        let mut i = 0;
        let mode = loop {
            let (Some(var), Some(next)) = (cursor.nth(i), cursor.nth(i + 1)) else {
                return Ok((DeclMode::None, Vec::new()));
            };
            if var.kind != TokenKind::Variable {
                return Ok((DeclMode::None, Vec::new()));
            }
            vars.push(Variable {
                name: token_text(self.source, &var).to_string(),
                range: var.span,
            });
            i += 2;
            match next.kind {
                TokenKind::Comma => continue,
                TokenKind::Declare => break DeclMode::Declare,
                TokenKind::Assign => break DeclMode::Assign,
                _ => return Ok((DeclMode::None, Vec::new())),
            }
        };

        if vars.len() > decls.limit() {
            let extra = &vars[decls.limit()];
            self.diagnostics
                .report(DiagnosticKind::TooManyVariables, extra.range)
                .message(format!(
                    "too many declarations: at most {} allowed here",
                    decls.limit()
                ))
                .emit();
            return Err(Reported);
        }

        if mode == DeclMode::Assign {
            for var in &vars {
                if !self.is_defined(&var.name) {
                    self.undefined_variable(&var.name, var.range);
                    return Err(Reported);
                }
            }
        }

        cursor.advance(i);
        Ok((mode, vars))
    }

    fn undefined_variable(&mut self, name: &str, range: TextRange) {
        self.diagnostics
            .report(DiagnosticKind::UndefinedVariable, range)
            .message(format!("undefined variable `{name}`"))
            .emit();
    }

    fn commands(&mut self, cursor: &mut Cursor<'_>, action: TextRange) -> PResult<Vec<Command>> {
        let mut commands: Vec<Command> = Vec::new();
        loop {
            let command = self.command(cursor, action)?;

            if !commands.is_empty() && !is_executable(&command) {
                self.diagnostics
                    .report(DiagnosticKind::UnexpectedToken, command.range)
                    .message(format!(
                        "non-executable command in pipeline stage {}",
                        commands.len() + 1
                    ))
                    .emit();
                return Err(Reported);
            }
            commands.push(command);

            match cursor.peek() {
                Some(token) if token.kind == TokenKind::Pipe => {
                    cursor.bump();
                }
                _ => return Ok(commands),
            }
        }
    }

    fn command(&mut self, cursor: &mut Cursor<'_>, action: TextRange) -> PResult<Command> {
        let mut args = Vec::new();
        while let Some(token) = cursor.peek() {
            if matches!(token.kind, TokenKind::Pipe | TokenKind::ParenClose) {
                break;
            }
            args.push(self.operand(cursor)?);
        }

        let (Some(first), Some(last)) = (args.first(), args.last()) else {
            let at = cursor.peek().map_or(action, |t| t.span);
            self.diagnostics
                .report(DiagnosticKind::MissingPipeline, at)
                .message("missing value for command")
                .emit();
            return Err(Reported);
        };

        let range = cover(first.range, last.range);
        Ok(Command { args, range })
    }

    fn operand(&mut self, cursor: &mut Cursor<'_>) -> PResult<Operand> {
        let Some(token) = cursor.bump() else {
            return Err(Reported);
        };
        let text = token_text(self.source, &token);
        let mut fields = Vec::new();
        let mut end = token.span;
        let mut chainable = true;

        let term = match token.kind {
            TokenKind::Field => {
                fields.push(text[1..].to_string());
                Term::Dot
            }
            TokenKind::Dot => {
                chainable = false;
                Term::Dot
            }
            TokenKind::Variable => {
                if !self.is_defined(text) {
                    self.undefined_variable(text, token.span);
                    return Err(Reported);
                }
                Term::Variable(text.to_string())
            }
            TokenKind::Ident => {
                chainable = false;
                Term::Function(text.to_string())
            }
            TokenKind::Str => match unquote(text) {
                Some(s) => Term::Str(s),
                None => {
                    self.diagnostics
                        .report(DiagnosticKind::InvalidString, token.span)
                        .message(format!("invalid escape in string {text}"))
                        .emit();
                    return Err(Reported);
                }
            },
            TokenKind::RawStr => Term::Str(text[1..text.len() - 1].to_string()),
            TokenKind::Int => match parse_int(text) {
                Ok(n) => Term::Int(n),
                Err(err) => {
                    let message = match err {
                        NumberError::Invalid => format!("invalid number `{text}`"),
                        NumberError::Overflow => {
                            format!("number `{text}` does not fit in 64 bits")
                        }
                    };
                    self.diagnostics
                        .report(DiagnosticKind::InvalidNumber, token.span)
                        .message(message)
                        .emit();
                    return Err(Reported);
                }
            },
            TokenKind::KwTrue => Term::Bool(true),
            TokenKind::KwFalse => Term::Bool(false),
            TokenKind::KwNil => Term::Nil,
            TokenKind::ParenOpen => {
                let (pipeline, close) = self.parenthesized(cursor, token)?;
                end = close;
                Term::Pipeline(Box::new(pipeline))
            }
            TokenKind::Garbage => {
                self.unexpected(&token);
                return Err(Reported);
            }
            _ => {
                self.diagnostics
                    .report(DiagnosticKind::ExpectedOperand, token.span)
                    .message(format!("expected an operand, found `{text}`"))
                    .emit();
                return Err(Reported);
            }
        };

        if chainable {
            while let Some(next) = cursor.peek() {
                if next.kind != TokenKind::Field || next.span.start() != end.end() {
                    break;
                }
                fields.push(token_text(self.source, &next)[1..].to_string());
                end = next.span;
                cursor.bump();
            }
        }

        if let Some(next) = cursor.peek()
            && next.kind == TokenKind::Field
            && next.span.start() == end.end()
        {
            let after = token_text(self.source, &next);
            self.diagnostics
                .report(DiagnosticKind::UnexpectedToken, next.span)
                .message(format!("unexpected `{after}` after `{text}`"))
                .emit();
            return Err(Reported);
        }

        Ok(Operand {
            term,
            fields,
            range: cover(token.span, end),
        })
    }

    fn parenthesized(
        &mut self,
        cursor: &mut Cursor<'_>,
        open: Token,
    ) -> PResult<(Pipeline, TextRange)> {
        if self.depth >= MAX_DEPTH {
            self.diagnostics
                .report(DiagnosticKind::NestingTooDeep, open.span)
                .message(format!("parentheses nested deeper than {MAX_DEPTH} levels"))
                .emit();
            return Err(Reported);
        }

        self.depth += 1;
        let commands = self.commands(cursor, open.span);
        self.depth -= 1;
        let commands = commands?;

        match cursor.bump() {
            Some(close) if close.kind == TokenKind::ParenClose => {
                let range = cover(open.span, close.span);
                Ok((
                    Pipeline {
                        mode: DeclMode::None,
                        vars: Vec::new(),
                        commands,
                        range,
                    },
                    close.span,
                ))
            }
            other => {
                let at = other.map_or(open.span, |t| t.span);
                self.diagnostics
                    .report(DiagnosticKind::UnexpectedToken, at)
                    .message("missing `)`")
                    .related_to("opened here", open.span)
                    .emit();
                Err(Reported)
            }
        }
    }
}

/// Later pipeline stages receive the previous value as their last argument,
/// so they must be function calls.
fn is_executable(command: &Command) -> bool {
    command
        .args
        .first()
        .is_some_and(|op| matches!(op.term, Term::Function(_)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    Invalid,
    Overflow,
}

/// Integer literal with an optional sign and base prefix.
fn parse_int(text: &str) -> Result<i64, NumberError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let prefixed = |p: [&str; 2]| {
        unsigned
            .strip_prefix(p[0])
            .or_else(|| unsigned.strip_prefix(p[1]))
    };
    let (radix, digits) = if let Some(rest) = prefixed(["0x", "0X"]) {
        (16, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = prefixed(["0o", "0O"]) {
        (8, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = prefixed(["0b", "0B"]) {
        (2, rest.strip_prefix('_').unwrap_or(rest))
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // Separators only between digits.
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(NumberError::Invalid);
    }
    let digits = digits.replace('_', "");
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(NumberError::Invalid);
    }

    let magnitude = u64::from_str_radix(&digits, radix).map_err(|_| NumberError::Overflow)?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or(NumberError::Overflow)
    } else {
        i64::try_from(magnitude).map_err(|_| NumberError::Overflow)
    }
}

/// Decode an interpreted string literal, quotes included.
fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            'x' => hex_char(&mut chars, 2)?,
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            _ => return None,
        };
        out.push(decoded);
    }

    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}
