//! The line-oriented document driver.
//!
//! [`interpret`] scans a whole document for annotated lines (`#|`, `//|`,
//! or piped lines inside a `/* */` block), evaluates each one in order
//! against a single shared environment, and resolves any accumulation
//! commands (`sum`, `product`, `difference`, `quotient`) in a second,
//! reverse pass. This is the only entry point a host embedding needs —
//! everything else in this workspace is plumbing `interpret` wires together.

mod accumulate;
mod scan;

use calcline_diagnostic::Diagnostic;
use calcline_eval::{Environment, Evaluator, Value};
use calcline_units::CurrencyConverter;

pub use accumulate::is_accumulation_command;
pub use scan::AnnotatedLine;

/// One annotated line's result.
#[derive(Clone, Debug, PartialEq)]
pub struct Interpretation {
    /// Zero-based index of the line this interpretation came from.
    pub line_index: u32,
    /// What to show next to the line: the evaluated value's rendering, the
    /// closed accumulator's rendering for a command line, or empty if the
    /// line produced nothing to show.
    pub evaluation_text: String,
    /// Diagnostics for this line, already shifted to be relative to the
    /// full source line rather than the expression text after `|`.
    pub diagnostics: Vec<Diagnostic>,
}

/// Evaluate every annotated line in `text`, sharing one [`Environment`]
/// across the whole document, then resolve accumulation commands in a
/// second pass.
///
/// A fresh [`Evaluator`] and [`Environment`] are created for this call only
/// — nothing here is retained between calls, matching the single-threaded,
/// one-document-per-call contract the rest of the engine assumes.
pub fn interpret(text: &str, converter: &dyn CurrencyConverter) -> Vec<Interpretation> {
    let lines = scan::scan(text);

    let mut env = Environment::new();
    let mut evaluator = Evaluator::new(&mut env, converter);

    let mut line_indices = Vec::with_capacity(lines.len());
    let mut commands: Vec<Option<&str>> = Vec::with_capacity(lines.len());
    let mut values = Vec::with_capacity(lines.len());
    let mut renderings = Vec::with_capacity(lines.len());
    let mut diagnostics_per_line = Vec::with_capacity(lines.len());

    for line in &lines {
        line_indices.push(line.line_index);

        if accumulate::is_accumulation_command(line.expression) {
            commands.push(Some(line.expression));
            values.push(None);
            renderings.push(line.expression.to_string());
            diagnostics_per_line.push(Vec::new());
            continue;
        }

        commands.push(None);
        tracing::debug!(line = line.line_index, "evaluating annotated line");
        match calcline_parse::parse_expression(line.expression) {
            Ok(expr) => {
                let value = evaluator.eval(&expr);
                let diagnostics = evaluator
                    .take_diagnostics()
                    .into_iter()
                    .map(|d| d.offset_by(line.expression_offset))
                    .collect();
                renderings.push(value.as_ref().map(Value::inspect).unwrap_or_default());
                values.push(value);
                diagnostics_per_line.push(diagnostics);
            }
            Err(diagnostic) => {
                renderings.push(String::new());
                values.push(None);
                diagnostics_per_line.push(vec![diagnostic.offset_by(line.expression_offset)]);
            }
        }
    }

    accumulate::accumulate(&commands, &values, converter, &mut renderings);

    line_indices
        .into_iter()
        .zip(renderings)
        .zip(diagnostics_per_line)
        .map(|((line_index, evaluation_text), diagnostics)| Interpretation {
            line_index,
            evaluation_text,
            diagnostics,
        })
        .collect()
}
