//! Token kinds produced by the line tokenizer.

use std::fmt;

use crate::Span;

/// The closed set of token kinds the tokenizer ever produces.
///
/// Identifier and number tokens carry their text in [`Token::literal`]
/// rather than here; `TokenKind` only tags the shape, matching a classic
/// Pratt-parser token model.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Ident,
    Number,

    True,
    False,
    In,

    Assign,  // =
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Caret,   // ^
    Percent, // %
    Bang,    // !

    Eq,    // ==
    NotEq, // !=
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    AndAnd, // &&
    OrOr,   // ||

    LParen, // (
    RParen, // )
    Comma,  // ,
    Pipe,   // |

    /// A single byte that does not begin any recognized token.
    Illegal,
    /// Sentinel returned forever once the input is exhausted.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::In => "in",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Pipe => "|",
            TokenKind::Illegal => "illegal token",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// A single lexical token: its kind, its literal text, and its start offset.
///
/// The end offset is always `start + literal.len()` — the scanner never
/// produces tokens whose literal text differs in byte length from the
/// source it was read from.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub start: u32,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, literal: impl Into<String>, start: u32) -> Self {
        let literal = literal.into();
        Token {
            kind,
            literal,
            start,
        }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.start + self.literal.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end())
    }

    #[must_use]
    pub fn eof(at: u32) -> Self {
        Token::new(TokenKind::Eof, "", at)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literal.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}", self.literal)
        }
    }
}
