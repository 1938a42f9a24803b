//! Tree-walking evaluator for parsed [`calcline_ir::Expr`] trees.
//!
//! The evaluator owns no state of its own beyond a borrow of the shared
//! [`Environment`] and an accumulator of the [`Diagnostic`]s raised while
//! walking one expression; all of the interesting dispatch logic lives in
//! [`value`], which this module wires up to diagnostics and to the call
//! expression's argument evaluation.
//!
//! A subexpression that fails to evaluate produces `None` rather than
//! aborting the walk: the diagnostic for that failure is pushed onto the
//! accumulator, and `None` propagates upward as an absent value with no
//! further diagnostic attached to it (first-failure policy) — this is what
//! lets a single line surface every independent failure it contains (e.g.
//! two bad arguments to the same call) instead of only the first one.

mod builtins;
mod environment;
mod value;

pub use builtins::{call_builtin, is_builtin, BuiltinError};
pub use environment::Environment;
pub use value::{binary_arith, binary_logical, compare, eval_in, format_number, values_equal, ArithError, ArithOp, CmpOp, Value};

use calcline_diagnostic::Diagnostic;
use calcline_ir::{Expr, Span, Token, TokenKind};
use calcline_stack::ensure_sufficient_stack;
use calcline_units::CurrencyConverter;

/// Walks an [`Expr`] tree against a shared [`Environment`], collecting every
/// [`Diagnostic`] raised along the way rather than stopping at the first.
pub struct Evaluator<'a> {
    env: &'a mut Environment,
    converter: &'a dyn CurrencyConverter,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a mut Environment, converter: &'a dyn CurrencyConverter) -> Self {
        Evaluator {
            env,
            converter,
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics raised by the evaluations run on this instance so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain and return every diagnostic accumulated so far, leaving this
    /// evaluator's accumulator empty for the next evaluation.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn push_diagnostic(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(message, span));
    }

    /// Evaluate `expr`, returning its [`Value`] or `None` if evaluation
    /// failed anywhere in the tree. Every failure along the way is pushed
    /// onto [`Self::diagnostics`] — a caller that needs just one line's
    /// diagnostics should call [`Self::take_diagnostics`] before evaluating
    /// the next line.
    pub fn eval(&mut self, expr: &Expr) -> Option<Value> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Number { value, .. } => Some(Value::number(*value)),
            Expr::Boolean { value, .. } => Some(Value::Boolean(*value)),
            Expr::Ident { name, token } => match self.env.get(name).cloned() {
                Some(value) => Some(value),
                None => {
                    self.push_diagnostic(format!("unknown identifier `{name}`"), token.span());
                    None
                }
            },
            Expr::Assign { name, right } => {
                let value = self.eval(right)?;
                tracing::debug!(name = name.literal.as_str(), "binding name");
                self.env.set(name.literal.clone(), value.clone());
                Some(value)
            }
            Expr::Prefix { op, right } => self.eval_prefix(op.kind, right, expr),
            Expr::Postfix { op, left } => self.eval_postfix(op, left, expr),
            Expr::Infix { op, left, right } => self.eval_infix(op.kind, left, right, expr),
            Expr::Call { callee, args, .. } => self.eval_call(callee, args, expr),
        }
    }

    fn eval_prefix(&mut self, op: TokenKind, right: &Expr, whole: &Expr) -> Option<Value> {
        let value = self.eval(right)?;
        match op {
            TokenKind::Minus => match value {
                Value::Number(n, form) => Some(Value::Number(-n, form)),
                Value::Percent(n) => Some(Value::Percent(-n)),
                Value::Currency { number, unit } => Some(Value::Currency { number: -number, unit }),
                Value::FixedUnit { number, unit } => Some(Value::FixedUnit { number: -number, unit }),
                Value::Boolean(_) => {
                    self.push_diagnostic("cannot negate a boolean", whole.span());
                    None
                }
            },
            TokenKind::Plus => match value {
                Value::Number(..) | Value::Currency { .. } => Some(value),
                other => {
                    self.push_diagnostic(
                        format!("unary `+` requires a number or currency, found a {}", other.kind_name()),
                        whole.span(),
                    );
                    None
                }
            },
            TokenKind::Bang => match value {
                Value::Boolean(b) => Some(Value::Boolean(!b)),
                other => {
                    self.push_diagnostic(
                        format!("`!` requires a boolean, found a {}", other.kind_name()),
                        whole.span(),
                    );
                    None
                }
            },
            _ => unreachable!("parser only produces Minus/Bang prefix operators"),
        }
    }

    fn eval_postfix(&mut self, op: &Token, left: &Expr, whole: &Expr) -> Option<Value> {
        let value = self.eval(left)?;
        match op.kind {
            TokenKind::Percent => match value {
                Value::Number(n, _) => Some(Value::Percent(n)),
                other => {
                    self.push_diagnostic(
                        format!("`%` requires a number, found a {}", other.kind_name()),
                        whole.span(),
                    );
                    None
                }
            },
            TokenKind::Ident => match eval_in(&value, &op.literal, self.converter) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.push_diagnostic(e.to_string(), whole.span());
                    None
                }
            },
            _ => unreachable!("parser only produces Percent/Ident postfix operators"),
        }
    }

    fn eval_infix(&mut self, op: TokenKind, left: &Expr, right: &Expr, whole: &Expr) -> Option<Value> {
        if op == TokenKind::In {
            let left_value = self.eval(left)?;
            let Expr::Ident { name, .. } = right else {
                self.push_diagnostic("right-hand side of `in` must be a unit name", right.span());
                return None;
            };
            return match eval_in(&left_value, name, self.converter) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.push_diagnostic(e.to_string(), whole.span());
                    None
                }
            };
        }

        // Both sides are always evaluated, not short-circuited — this both
        // matches the non-short-circuiting contract for `&&`/`||` and lets a
        // line surface failures on both operands rather than only the left.
        let left_value = self.eval(left);
        let right_value = self.eval(right);
        let (Some(left_value), Some(right_value)) = (left_value, right_value) else {
            // An operand already failed (and already pushed its own
            // diagnostic) — an absent operand is a no-op that produces
            // another absent value, not a second diagnostic.
            return None;
        };

        let arith_op = match op {
            TokenKind::Plus => Some(ArithOp::Add),
            TokenKind::Minus => Some(ArithOp::Sub),
            TokenKind::Star => Some(ArithOp::Mul),
            TokenKind::Slash => Some(ArithOp::Div),
            TokenKind::Caret => Some(ArithOp::Pow),
            _ => None,
        };
        if let Some(arith_op) = arith_op {
            return match binary_arith(&left_value, &right_value, arith_op, self.converter) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.push_diagnostic(e.to_string(), whole.span());
                    None
                }
            };
        }

        match op {
            TokenKind::AndAnd => match binary_logical(&left_value, &right_value, true) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.push_diagnostic(e.to_string(), whole.span());
                    None
                }
            },
            TokenKind::OrOr => match binary_logical(&left_value, &right_value, false) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.push_diagnostic(e.to_string(), whole.span());
                    None
                }
            },
            TokenKind::Eq => Some(Value::Boolean(values_equal(&left_value, &right_value))),
            TokenKind::NotEq => Some(Value::Boolean(!values_equal(&left_value, &right_value))),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                let cmp_op = match op {
                    TokenKind::Lt => CmpOp::Lt,
                    TokenKind::Gt => CmpOp::Gt,
                    TokenKind::LtEq => CmpOp::LtEq,
                    TokenKind::GtEq => CmpOp::GtEq,
                    _ => unreachable!(),
                };
                match compare(&left_value, &right_value, cmp_op, self.converter) {
                    Ok(result) => Some(Value::Boolean(result)),
                    Err(e) => {
                        self.push_diagnostic(e.to_string(), whole.span());
                        None
                    }
                }
            }
            _ => unreachable!("parser only produces recognized infix operators"),
        }
    }

    /// Evaluate a call's arguments and invoke the named built-in.
    ///
    /// Every argument is evaluated regardless of whether an earlier one
    /// failed, and every argument that isn't a number gets its own
    /// diagnostic anchored at that argument's span — `sum(true, false)`
    /// reports two bad arguments, not just the first.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], whole: &Expr) -> Option<Value> {
        let Expr::Ident { name, token } = callee else {
            self.push_diagnostic("callee must be a function name", callee.span());
            return None;
        };
        if !is_builtin(name) {
            self.push_diagnostic(format!("unknown function `{name}`"), token.span());
            return None;
        }
        tracing::trace!(function = name.as_str(), arity = args.len(), "calling built-in");

        let mut numeric_args = Vec::with_capacity(args.len());
        let mut any_bad_argument = false;
        for arg in args {
            match self.eval(arg) {
                Some(value) => match value.as_number() {
                    Some(n) => numeric_args.push(n),
                    None => {
                        self.push_diagnostic(
                            format!(
                                "arguments to `{name}` must be numbers, found a {}",
                                value.kind_name()
                            ),
                            arg.span(),
                        );
                        any_bad_argument = true;
                    }
                },
                None => any_bad_argument = true,
            }
        }
        if any_bad_argument {
            return None;
        }

        match call_builtin(name, &numeric_args) {
            Ok(n) => Some(Value::number(n)),
            Err(e) => {
                self.push_diagnostic(e.to_string(), whole.span());
                None
            }
        }
    }
}
