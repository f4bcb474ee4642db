//! Lexer for templates.
//!
//! Splits source into text and action segments, applying trim markers
//! (`{{- ` and ` -}}`) and dropping comments. Action bodies are tokenized
//! with Logos; consecutive unrecognized characters are coalesced into a
//! single `Garbage` token and left for the parser to report.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

use super::syntax::TokenKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

/// A `{{ ... }}` action: its full span, delimiters included, and the tokens
/// of its body with whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub range: TextRange,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(TextRange),
    Action(Action),
}

pub(crate) fn text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Tokenizes a template into segments.
pub fn lex(source: &str) -> (Vec<Segment>, Diagnostics) {
    Lexer::new(source).run()
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[Range::<usize>::from(token.span)]
}

struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    /// Previous action ended with ` -}}`.
    trim_next: bool,
    segments: Vec<Segment>,
    diagnostics: Diagnostics,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            trim_next: false,
            segments: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn run(mut self) -> (Vec<Segment>, Diagnostics) {
        while let Some(offset) = self.source[self.pos..].find(OPEN) {
            let open = self.pos + offset;
            let trim_left = self.bytes.get(open + 2) == Some(&b'-')
                && self.bytes.get(open + 3).is_some_and(|&b| is_space(b));

            self.push_text(self.pos, open, trim_left);

            let body_start = if trim_left { open + 3 } else { open + 2 };
            let comment_start = self.skip_space(body_start);

            let closed = if self.source[comment_start..].starts_with("/*") {
                self.comment(open, comment_start)
            } else {
                self.action(open, body_start)
            };

            if !closed {
                return self.finish();
            }
        }

        self.push_text(self.pos, self.source.len(), false);
        self.finish()
    }

    fn finish(self) -> (Vec<Segment>, Diagnostics) {
        (self.segments, self.diagnostics)
    }

    fn push_text(&mut self, mut start: usize, mut end: usize, trim_right: bool) {
        if std::mem::take(&mut self.trim_next) {
            while start < end && is_space(self.bytes[start]) {
                start += 1;
            }
        }
        if trim_right {
            while end > start && is_space(self.bytes[end - 1]) {
                end -= 1;
            }
        }
        if start < end {
            self.segments.push(Segment::Text(text_range(start..end)));
        }
    }

    fn skip_space(&self, mut i: usize) -> usize {
        while i < self.bytes.len() && is_space(self.bytes[i]) {
            i += 1;
        }
        i
    }

    /// Returns `true` when the trailing ` -}}` marker is present, given the
    /// offset of the closing `}}` and the first offset the marker may use.
    fn has_trim_right(&self, close: usize, body_start: usize) -> bool {
        close >= body_start + 2
            && self.bytes[close - 1] == b'-'
            && is_space(self.bytes[close - 2])
    }

    fn action(&mut self, open: usize, body_start: usize) -> bool {
        let Some(close) = self.find_close(body_start) else {
            self.diagnostics
                .report(DiagnosticKind::UnclosedAction, text_range(open..open + 2))
                .emit();
            return false;
        };

        let trim_right = self.has_trim_right(close, body_start);
        let body_end = if trim_right { close - 1 } else { close };

        let tokens = self.tokenize(body_start, body_end);
        self.segments.push(Segment::Action(Action {
            range: text_range(open..close + 2),
            tokens,
        }));

        self.pos = close + 2;
        self.trim_next = trim_right;
        true
    }

    fn comment(&mut self, open: usize, comment_start: usize) -> bool {
        let Some(offset) = self.source[comment_start + 2..].find("*/") else {
            self.diagnostics
                .report(DiagnosticKind::UnclosedComment, text_range(open..open + 2))
                .emit();
            return false;
        };
        let comment_end = comment_start + 2 + offset + 2;

        let after = self.skip_space(comment_end);
        let rest = &self.source[after..];
        let (close, trim_right) = if rest.starts_with(CLOSE) {
            (after, false)
        } else if rest.starts_with("-}}") && after > comment_end {
            (after + 1, true)
        } else {
            self.diagnostics
                .report(
                    DiagnosticKind::UnclosedComment,
                    text_range(comment_start..comment_end),
                )
                .message("comment must be followed by `}}`")
                .emit();
            match self.find_close(comment_end) {
                Some(close) => (close, false),
                None => return false,
            }
        };

        self.pos = close + 2;
        self.trim_next = trim_right;
        true
    }

    /// Offset of the `}}` closing an action body starting at `from`.
    /// Braces inside string literals do not count.
    fn find_close(&self, from: usize) -> Option<usize> {
        let bytes = self.bytes;
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    i += 1;
                }
                b'`' => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'`' {
                        i += 1;
                    }
                    i += 1;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn tokenize(&self, start: usize, end: usize) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut lexer = TokenKind::lexer(&self.source[start..end]);
        let mut error_start: Option<usize> = None;

        loop {
            match lexer.next() {
                Some(Ok(kind)) => {
                    let span = lexer.span();
                    if let Some(err) = error_start.take() {
                        tokens.push(Token::new(
                            TokenKind::Garbage,
                            text_range(start + err..start + span.start),
                        ));
                    }
                    if kind != TokenKind::Whitespace {
                        tokens.push(Token::new(
                            kind,
                            text_range(start + span.start..start + span.end),
                        ));
                    }
                }
                Some(Err(())) => {
                    if error_start.is_none() {
                        error_start = Some(lexer.span().start);
                    }
                }
                None => {
                    if let Some(err) = error_start.take() {
                        tokens.push(Token::new(TokenKind::Garbage, text_range(start + err..end)));
                    }
                    break;
                }
            }
        }

        tokens
    }
}
