//! Token kinds for the inside of `{{ ... }}` actions.
//!
//! Text outside actions never reaches Logos: the lexer splits the template
//! into segments first and only tokenizes action bodies.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("|")]
    Pipe,

    #[token(",")]
    Comma,

    /// `:=` declares a variable. Defined before `Assign` for clarity; Logos
    /// picks the longest match either way.
    #[token(":=")]
    Declare,

    #[token("=")]
    Assign,

    /// Bare `.`, the current data value.
    #[token(".")]
    Dot,

    /// One `.Name` segment. A chain like `.Types.Int` is two adjacent tokens.
    #[regex(r"\.[A-Za-z_][A-Za-z0-9_]*")]
    Field,

    /// `$` or `$name`.
    #[regex(r"\$[A-Za-z0-9_]*")]
    Variable,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"`[^`]*`")]
    RawStr,

    /// Decimal, `0x`, `0o`, `0b` or leading-zero octal, with `_` separators.
    /// Trailing letters are part of the token so bad literals get one error.
    #[regex(r"-?[0-9][0-9A-Za-z_]*")]
    Int,

    #[token("if")]
    KwIf,

    #[token("else")]
    KwElse,

    #[token("end")]
    KwEnd,

    #[token("range")]
    KwRange,

    #[token("with")]
    KwWith,

    #[token("break")]
    KwBreak,

    #[token("continue")]
    KwContinue,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    #[token("nil")]
    KwNil,

    /// Function name. Defined after keywords so they take precedence.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Consecutive unrecognized characters, coalesced by the lexer.
    Garbage,
}
