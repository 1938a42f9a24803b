//! Pratt parser turning a token stream into an [`Expr`] tree.
//!
//! Parselets are dispatched with a `match` on [`TokenKind`] rather than a
//! table of trait objects — with an exhaustive, closed set of token kinds a
//! `match` is both simpler and lets the compiler flag a missing arm when a
//! new token kind is added.

use calcline_diagnostic::Diagnostic;
use calcline_ir::{Args, Expr, Span, Token, TokenKind};
use calcline_lexer::TokenStream;
use calcline_stack::ensure_sufficient_stack;
use smallvec::smallvec;

/// Maximum nesting depth the parser will descend before giving up rather
/// than risking a stack overflow on pathological input (e.g. thousands of
/// nested parentheses).
const MAX_DEPTH: u32 = 1024;

/// Binding power ladder, lowest to highest. Each parse of an infix or
/// postfix operator only continues while the next operator's precedence is
/// strictly greater than the current one (or equal, for right-associative
/// operators handled specially below).
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Debug)]
#[repr(u8)]
enum Precedence {
    Lowest,
    Assignment,
    Logical,
    Equals,
    LessGreater,
    Sum,
    Product,
    Exponent,
    Prefix,
    In,
    Call,
    Percent,
}

fn infix_precedence(kind: TokenKind) -> Option<Precedence> {
    use Precedence::*;
    use TokenKind::*;
    Some(match kind {
        Assign => Assignment,
        AndAnd | OrOr => Logical,
        Eq | NotEq => Equals,
        Lt | Gt | LtEq | GtEq => LessGreater,
        Plus | Minus => Sum,
        Star | Slash => Product,
        Caret => Exponent,
        In => In,
        LParen => Call,
        _ => return None,
    })
}

/// Parse a single expression from `text`, returning at most one diagnostic.
///
/// A successful parse does not imply the entire text was consumed by the
/// returned expression — callers that require a line to be a single
/// complete expression should check [`Parser::at_eof`] or use
/// [`parse_expression`] which does this for them.
pub fn parse_expression(text: &str) -> Result<Expr, Diagnostic> {
    let mut parser = Parser::new(text);
    let expr = parser.parse(Precedence::Lowest)?;
    if !parser.at_eof() {
        let token = parser.peek(0);
        return Err(Diagnostic::new(
            format!("unexpected trailing token `{token}`"),
            token.span(),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: TokenStream,
    depth: u32,
}

impl Parser {
    fn new(text: &str) -> Self {
        Parser {
            tokens: TokenStream::new(text),
            depth: 0,
        }
    }

    fn at_eof(&self) -> bool {
        self.peek(0).kind == TokenKind::Eof
    }

    fn peek(&self, offset: usize) -> Token {
        self.tokens.peek(offset)
    }

    fn advance(&mut self) -> Token {
        self.tokens.next()
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(Diagnostic::new(
                format!("expected {kind}, found `{token}`"),
                token.span(),
            ))
        }
    }

    fn parse(&mut self, precedence: Precedence) -> Result<Expr, Diagnostic> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            let token = self.peek(0);
            return Err(Diagnostic::new(
                "expression nested too deeply",
                token.span(),
            ));
        }
        let result = ensure_sufficient_stack(|| self.parse_inner(precedence));
        self.depth -= 1;
        result
    }

    fn parse_inner(&mut self, precedence: Precedence) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_prefix()?;

        loop {
            let next = self.peek(0);
            if next.kind == TokenKind::Percent {
                if precedence >= Precedence::Percent {
                    break;
                }
                let op = self.advance();
                left = Expr::Postfix {
                    op,
                    left: Box::new(left),
                };
                continue;
            }

            // A bare trailing identifier tags the left-hand value with a
            // unit, e.g. `5 km` or `5 usd` — equivalent to `5 in km`.
            if next.kind == TokenKind::Ident {
                if precedence >= Precedence::In {
                    break;
                }
                let op = self.advance();
                left = Expr::Postfix {
                    op,
                    left: Box::new(left),
                };
                continue;
            }

            let Some(next_prec) = infix_precedence(next.kind) else {
                break;
            };
            if precedence >= next_prec {
                break;
            }

            left = self.parse_infix(left, next_prec)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek(0);
        match token.kind {
            TokenKind::Number => {
                let token = self.advance();
                let value: f64 = token.literal.parse().map_err(|_| {
                    Diagnostic::new(
                        format!("`{}` is not a valid number literal", token.literal),
                        token.span(),
                    )
                })?;
                Ok(Expr::Number { value, token })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Boolean {
                    value: token.kind == TokenKind::True,
                    token,
                })
            }
            TokenKind::Ident => {
                let token = self.advance();
                Ok(Expr::Ident {
                    name: token.literal.clone(),
                    token,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Minus | TokenKind::Plus | TokenKind::Bang => {
                let op = self.advance();
                let right = self.parse(Precedence::Prefix)?;
                Ok(Expr::Prefix {
                    op,
                    right: Box::new(right),
                })
            }
            TokenKind::Eof => Err(Diagnostic::new("unexpected end of expression", token.span())),
            _ => Err(Diagnostic::new(
                format!("unexpected token `{token}`"),
                token.span(),
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> Result<Expr, Diagnostic> {
        let op = self.advance();
        match op.kind {
            TokenKind::Assign => {
                let name = match left {
                    Expr::Ident { token, .. } => token,
                    other => {
                        return Err(Diagnostic::new(
                            "left-hand side of `=` must be an identifier",
                            other.span(),
                        ))
                    }
                };
                // Right-associative: parse the right side at `Lowest` (like
                // the grouping-paren case) so `x = y = 5` parses as
                // `x = (y = 5)` instead of stopping before the second `=`.
                let right = self.parse(Precedence::Lowest)?;
                Ok(Expr::Assign {
                    name,
                    right: Box::new(right),
                })
            }
            TokenKind::LParen => {
                let args = self.parse_call_args()?;
                Ok(Expr::Call {
                    callee: Box::new(left),
                    args,
                    paren: op,
                })
            }
            TokenKind::Caret => {
                // Right-associative: parse the right side at one precedence
                // lower than `Exponent` so a chain like `2 ^ 3 ^ 2` parses as
                // `2 ^ (3 ^ 2)`.
                let right = self.parse(Precedence::Product)?;
                Ok(Expr::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenKind::In => {
                let right = self.parse(precedence)?;
                if !matches!(right, Expr::Ident { .. }) {
                    return Err(Diagnostic::new(
                        "right-hand side of `in` must be a unit name",
                        right.span(),
                    ));
                }
                Ok(Expr::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            _ => {
                let right = self.parse(precedence)?;
                Ok(Expr::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    fn parse_call_args(&mut self) -> Result<Args, Diagnostic> {
        let mut args: Args = smallvec![];
        if self.peek(0).kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse(Precedence::Lowest)?);
            match self.peek(0).kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => {
                    let token = self.advance();
                    return Err(Diagnostic::new(
                        format!("expected `,` or `)` in argument list, found `{token}`"),
                        token.span(),
                    ));
                }
            }
        }
        Ok(args)
    }
}
