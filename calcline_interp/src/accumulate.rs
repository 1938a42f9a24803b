//! The reverse accumulation pass over produced values.
//!
//! `sum`, `product`, `difference`, and `quotient` are not expressions — they
//! are placeholders that fold every value produced *above* them (up to the
//! previous placeholder or the top of the document) into a running total,
//! rendered back into the placeholder's own line once the fold closes.

use calcline_eval::Value;
use calcline_units::{convert_currency, CurrencyConverter};

/// Is `text` one of the four recognized accumulation command names?
#[must_use]
pub fn is_accumulation_command(text: &str) -> bool {
    matches!(text, "sum" | "product" | "difference" | "quotient")
}

#[derive(Copy, Clone)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

fn op_and_identity(command: &str) -> (Op, f64) {
    match command {
        "sum" => (Op::Add, 0.0),
        "difference" => (Op::Subtract, 0.0),
        "product" => (Op::Multiply, 1.0),
        "quotient" => (Op::Divide, 1.0),
        _ => unreachable!("caller checked is_accumulation_command"),
    }
}

fn apply(op: Op, a: f64, b: f64) -> f64 {
    match op {
        Op::Add => a + b,
        Op::Subtract => a - b,
        Op::Multiply => a * b,
        Op::Divide => a / b,
    }
}

/// The kind-matched fold. Not created until the first value that can seed
/// it is seen, so a command with nothing reconcilable above it renders as
/// the bare identity of its operation.
enum Accumulator {
    Number(f64),
    Currency { acc: f64, unit: String },
}

impl Accumulator {
    /// Start a fresh accumulator at `identity`, kind-matched to `value`.
    /// Returns `None` for a kind the fold doesn't recognize (Boolean,
    /// Percent, FixedUnit).
    fn seed(identity: f64, value: &Value) -> Option<Self> {
        match value {
            Value::Number(..) => Some(Accumulator::Number(identity)),
            Value::Currency { unit, .. } => Some(Accumulator::Currency {
                acc: identity,
                unit: unit.clone(),
            }),
            _ => None,
        }
    }

    fn feed(&mut self, op: Op, value: &Value, converter: &dyn CurrencyConverter) {
        match (self, value) {
            (Accumulator::Number(acc), Value::Number(n, _)) => *acc = apply(op, *acc, *n),
            (Accumulator::Currency { acc, .. }, Value::Number(n, _)) => *acc = apply(op, *acc, *n),
            (Accumulator::Currency { acc, unit }, Value::Currency { number, unit: other }) => {
                if unit.eq_ignore_ascii_case(other) {
                    *acc = apply(op, *acc, *number);
                } else if let Ok(converted) = convert_currency(converter, *number, other, unit) {
                    *acc = apply(op, *acc, converted);
                }
                // An unreconcilable cross-currency conversion leaves the
                // accumulator unchanged rather than failing the whole line.
            }
            // A Number-kind accumulator meeting a Currency value (or any
            // other kind pairing) is a mismatch the fold cannot reconcile;
            // per spec it leaves the accumulator unchanged.
            _ => {}
        }
    }

    fn render(&self) -> String {
        match self {
            Accumulator::Number(acc) => calcline_eval::format_number(*acc),
            Accumulator::Currency { acc, unit } => format!("{} {unit}", calcline_eval::format_number(*acc)),
        }
    }
}

struct Pending {
    placeholder_index: usize,
    op: Op,
    identity: f64,
    acc: Option<Accumulator>,
}

impl Pending {
    fn open(placeholder_index: usize, command: &str) -> Self {
        let (op, identity) = op_and_identity(command);
        Pending { placeholder_index, op, identity, acc: None }
    }

    /// Fold `value` in. The first reconcilable value seen both seeds the
    /// accumulator's kind and is itself folded against the identity — it
    /// is not merely a kind hint that gets discarded.
    fn feed(&mut self, value: &Value, converter: &dyn CurrencyConverter) {
        match &mut self.acc {
            Some(acc) => acc.feed(self.op, value, converter),
            None => {
                if let Some(mut acc) = Accumulator::seed(self.identity, value) {
                    acc.feed(self.op, value, converter);
                    self.acc = Some(acc);
                }
            }
        }
    }

    fn render(&self) -> String {
        match &self.acc {
            Some(acc) => acc.render(),
            None => calcline_eval::format_number(self.identity),
        }
    }
}

/// Fold `values` (one per produced record, in document order; `None` where
/// a record is itself a placeholder or carries no value) into the
/// placeholders named by `commands`, replacing each placeholder's entry in
/// `renderings` with the closed accumulator's rendering.
///
/// Walks the records in reverse, exactly as specified: a placeholder closes
/// whatever accumulator preceded it (if any) and opens a fresh one that
/// locks onto the kind of the first reconcilable value it then sees — the
/// value immediately above the placeholder in document order, since the
/// reverse walk reaches it first.
pub fn accumulate(
    commands: &[Option<&str>],
    values: &[Option<Value>],
    converter: &dyn CurrencyConverter,
    renderings: &mut [String],
) {
    debug_assert_eq!(commands.len(), values.len());
    debug_assert_eq!(commands.len(), renderings.len());

    let mut open: Option<Pending> = None;

    for i in (0..commands.len()).rev() {
        if let Some(command) = commands[i] {
            if let Some(pending) = open.take() {
                renderings[pending.placeholder_index] = pending.render();
            }
            open = Some(Pending::open(i, command));
            continue;
        }

        if let (Some(pending), Some(value)) = (&mut open, &values[i]) {
            pending.feed(value, converter);
        }
    }

    if let Some(pending) = open {
        renderings[pending.placeholder_index] = pending.render();
    }
}

#[cfg(test)]
mod tests {
    use super::{accumulate, is_accumulation_command};
    use calcline_eval::Value;
    use calcline_units::{CurrencyConverter, CurrencyError};
    use pretty_assertions::assert_eq;

    struct FixedRateConverter;
    impl CurrencyConverter for FixedRateConverter {
        fn convert(&self, amount: f64, _from: &str, to: &str) -> Result<f64, CurrencyError> {
            if to == "EUR" {
                Ok(amount * 0.5)
            } else {
                Ok(amount)
            }
        }
    }

    #[test]
    fn recognizes_the_four_command_names() {
        assert!(is_accumulation_command("sum"));
        assert!(is_accumulation_command("product"));
        assert!(is_accumulation_command("difference"));
        assert!(is_accumulation_command("quotient"));
        assert!(!is_accumulation_command("avg"));
    }

    #[test]
    fn sums_the_numbers_above_it() {
        let commands = vec![None, None, Some("sum")];
        let values = vec![Some(Value::number(2.0)), Some(Value::number(3.0)), None];
        let mut renderings = vec!["2".to_string(), "3".to_string(), "sum".to_string()];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        assert_eq!(renderings[2], "5");
    }

    #[test]
    fn product_identity_is_one_when_nothing_feeds_it() {
        let commands = vec![Some("product")];
        let values = vec![None];
        let mut renderings = vec!["product".to_string()];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        assert_eq!(renderings[0], "1");
    }

    #[test]
    fn two_placeholders_each_fold_only_their_own_span() {
        let commands = vec![None, Some("sum"), None, Some("sum")];
        let values = vec![
            Some(Value::number(10.0)),
            None,
            Some(Value::number(100.0)),
            None,
        ];
        let mut renderings = vec![
            "10".to_string(),
            "sum".to_string(),
            "100".to_string(),
            "sum".to_string(),
        ];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        assert_eq!(renderings[1], "10");
        assert_eq!(renderings[3], "100");
    }

    #[test]
    fn currency_plus_number_preserves_the_unit() {
        let commands = vec![None, None, Some("sum")];
        let values = vec![
            Some(Value::number(5.0)),
            Some(Value::Currency { number: 10.0, unit: "USD".to_string() }),
            None,
        ];
        let mut renderings = vec!["5".to_string(), "10 USD".to_string(), "sum".to_string()];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        assert_eq!(renderings[2], "15 USD");
    }

    #[test]
    fn mismatched_currencies_convert_into_the_accumulator_code() {
        let commands = vec![None, None, Some("sum")];
        let values = vec![
            Some(Value::Currency { number: 10.0, unit: "USD".to_string() }),
            Some(Value::Currency { number: 4.0, unit: "EUR".to_string() }),
            None,
        ];
        let mut renderings = vec!["10 USD".to_string(), "4 EUR".to_string(), "sum".to_string()];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        // The accumulator kind-matches to EUR (the value directly above the
        // placeholder); the USD entry above that converts into EUR.
        assert_eq!(renderings[2], "9 EUR");
    }

    #[test]
    fn a_quotient_folds_in_reverse_document_order() {
        let commands = vec![None, None, Some("quotient")];
        let values = vec![Some(Value::number(100.0)), Some(Value::number(5.0)), None];
        let mut renderings = vec!["100".to_string(), "5".to_string(), "quotient".to_string()];
        accumulate(&commands, &values, &FixedRateConverter, &mut renderings);
        // identity 1, fed 5 first (1/5 = 0.2), then fed 100 (0.2/100 = 0.002)
        // — the reverse pass reaches the line closest to the command first.
        assert_eq!(renderings[2], "0.002");
    }
}
