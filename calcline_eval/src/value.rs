//! The boxed value model.
//!
//! Every value in the language is one of five kinds. Binary arithmetic
//! dispatches on the *pair* of kinds involved rather than through a trait
//! object per kind — with only five kinds and roughly five ops, a `match` on
//! `(left, right)` is both exhaustive-checked by the compiler and easier to
//! read than five trait impls scattered across five files.

use std::fmt;

use calcline_units::{convert_currency, convert_fixed_unit, is_fiat_currency, is_fixed_unit, lookup_unit, CurrencyConverter};

/// The display mode of a [`Value::Number`]. Carried on the value itself
/// rather than inferred at render time: `5 in binary` must keep rendering as
/// binary through however many further operations touch it, until something
/// re-tags it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum NumberForm {
    #[default]
    Decimal,
    Binary,
    Hex,
}

/// Does `keyword` name a number form (`decimal`, `binary`, `hex`)? Matched
/// case-insensitively so `5 in Binary` and `5 in BINARY` both tag the value.
#[must_use]
pub fn number_form_keyword(keyword: &str) -> Option<NumberForm> {
    if keyword.eq_ignore_ascii_case("decimal") {
        Some(NumberForm::Decimal)
    } else if keyword.eq_ignore_ascii_case("binary") {
        Some(NumberForm::Binary)
    } else if keyword.eq_ignore_ascii_case("hex") {
        Some(NumberForm::Hex)
    } else {
        None
    }
}

/// A value produced by evaluating an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64, NumberForm),
    Boolean(bool),
    /// A bare `N%` literal. Percent never appears standalone in rendered
    /// output except as `N%` — it only has meaning relative to another
    /// value in arithmetic.
    Percent(f64),
    /// An amount tagged with an ISO-4217 code, stored exactly as the user
    /// wrote it (rendering shows the unit code as-written; lookups and
    /// comparisons against it are case-insensitive).
    Currency { number: f64, unit: String },
    /// An amount tagged with a fixed-unit registry key, stored lower-case.
    FixedUnit { number: f64, unit: String },
}

impl Value {
    /// Construct a plain decimal number. The overwhelming majority of
    /// `Value::Number` construction sites want this; the few that care about
    /// `in binary`/`in hex` tagging go through [`eval_in`] instead.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Value::Number(value, NumberForm::Decimal)
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(..) => "number",
            Value::Boolean(_) => "boolean",
            Value::Percent(_) => "percent",
            Value::Currency { .. } => "currency",
            Value::FixedUnit { .. } => "unit",
        }
    }

    /// Render this value the way a host displays it next to a `|` line.
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Value::Number(n, form) => format_number_with_form(*n, *form),
            Value::Boolean(b) => b.to_string(),
            Value::Percent(p) => format!("{}%", format_number(*p)),
            Value::Currency { number, unit } => format!("{} {}", format_number(*number), unit),
            Value::FixedUnit { number, unit } => {
                let name = lookup_unit(unit).map_or(unit.as_str(), |def| def.full_name);
                format!("{} {name}", format_number(*number))
            }
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n, _) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

/// Render a float in decimal form: `NaN` literally, everything else as a
/// shortest round-tripping decimal with no forced trailing zeroes.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        let mut s = format!("{value}");
        if s.ends_with(".0") {
            s.truncate(s.len() - 2);
        }
        s
    }
}

/// Render a float under an explicit [`NumberForm`]. A `NaN` value renders as
/// the literal `NaN` regardless of form — binary/hex truncate to an integer
/// first, and there is no meaningful binary or hex rendering of `NaN`.
#[must_use]
pub fn format_number_with_form(value: f64, form: NumberForm) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    match form {
        NumberForm::Decimal => format_number(value),
        #[allow(clippy::cast_possible_truncation)]
        NumberForm::Binary => format!("0b{:b}", value.trunc() as i64),
        #[allow(clippy::cast_possible_truncation)]
        NumberForm::Hex => format!("0x{:x}", value.trunc() as i64),
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl ArithOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Pow => a.powf(b),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CmpOp {
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl CmpOp {
    fn apply(self, a: f64, b: f64) -> bool {
        match self {
            CmpOp::Lt => a < b,
            CmpOp::Gt => a > b,
            CmpOp::LtEq => a <= b,
            CmpOp::GtEq => a >= b,
        }
    }
}

/// Errors raised while combining two [`Value`]s. Carries no span — the
/// caller attaches one when turning this into a
/// [`calcline_diagnostic::Diagnostic`].
#[derive(Debug)]
pub enum ArithError {
    Mismatch {
        left: &'static str,
        right: &'static str,
    },
    UnknownUnit(String),
    QuantityMismatch {
        from: String,
        to: String,
    },
    UnknownCurrency(String),
    ConverterFailed(String),
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithError::Mismatch { left, right } => {
                write!(f, "cannot combine a {left} with a {right}")
            }
            ArithError::UnknownUnit(u) => write!(f, "unknown unit `{u}`"),
            ArithError::QuantityMismatch { from, to } => {
                write!(f, "cannot convert `{from}` to `{to}`: different quantities")
            }
            ArithError::UnknownCurrency(c) => write!(f, "unknown currency code `{c}`"),
            ArithError::ConverterFailed(msg) => write!(f, "currency conversion failed: {msg}"),
        }
    }
}

impl From<calcline_units::UnitError> for ArithError {
    fn from(err: calcline_units::UnitError) -> Self {
        match err {
            calcline_units::UnitError::UnknownUnit(u) => ArithError::UnknownUnit(u),
            calcline_units::UnitError::QuantityMismatch { from, to } => {
                ArithError::QuantityMismatch { from, to }
            }
        }
    }
}

impl From<calcline_units::CurrencyError> for ArithError {
    fn from(err: calcline_units::CurrencyError) -> Self {
        match err {
            calcline_units::CurrencyError::UnknownCurrency(c) => ArithError::UnknownCurrency(c),
            calcline_units::CurrencyError::Converter(e) => ArithError::ConverterFailed(e.to_string()),
        }
    }
}

fn scale_by_percent(base: f64, percent: f64) -> f64 {
    (percent / 100.0) * base
}

/// Combine `left` and `right` with `op`, dispatching on the pair of value
/// kinds.
///
/// # Errors
/// Returns [`ArithError`] when the two kinds cannot be combined, or when a
/// cross-unit combination requires a conversion that fails.
pub fn binary_arith(
    left: &Value,
    right: &Value,
    op: ArithOp,
    converter: &dyn CurrencyConverter,
) -> Result<Value, ArithError> {
    use Value::{Currency, FixedUnit, Number, Percent};

    match (left, right) {
        (Percent(l), Number(r, form)) => Ok(Number(op.apply(*r, scale_by_percent(*r, *l)), *form)),
        (Percent(l), Currency { number: r, unit }) => Ok(Currency {
            number: op.apply(*r, scale_by_percent(*r, *l)),
            unit: unit.clone(),
        }),
        (Percent(l), FixedUnit { number: r, unit }) => Ok(FixedUnit {
            number: op.apply(*r, scale_by_percent(*r, *l)),
            unit: unit.clone(),
        }),
        (Percent(l), Percent(r)) => Ok(Percent(op.apply(*l, *r))),

        (Number(l, form), Number(r, _)) => Ok(Number(op.apply(*l, *r), *form)),
        (Number(l, _), Currency { number: r, unit }) => Ok(Currency {
            number: op.apply(*l, *r),
            unit: unit.clone(),
        }),
        (Number(l, _), FixedUnit { number: r, unit }) => Ok(FixedUnit {
            number: op.apply(*l, *r),
            unit: unit.clone(),
        }),
        (Number(l, form), Percent(r)) => Ok(Number(op.apply(*l, scale_by_percent(*l, *r)), *form)),

        (Currency { number: l, unit: lu }, Number(r, _)) => Ok(Currency {
            number: op.apply(*l, *r),
            unit: lu.clone(),
        }),
        (Currency { number: l, unit: lu }, Currency { number: r, unit: ru }) => {
            if lu.eq_ignore_ascii_case(ru) {
                Ok(Currency {
                    number: op.apply(*l, *r),
                    unit: lu.clone(),
                })
            } else {
                let left_value = convert_currency(converter, *l, lu, ru)?;
                Ok(Currency {
                    number: op.apply(left_value, *r),
                    unit: ru.clone(),
                })
            }
        }
        (Currency { number: l, unit: lu }, Percent(r)) => Ok(Currency {
            number: op.apply(*l, scale_by_percent(*l, *r)),
            unit: lu.clone(),
        }),

        (FixedUnit { number: l, unit: lu }, Number(r, _)) => Ok(FixedUnit {
            number: op.apply(*l, *r),
            unit: lu.clone(),
        }),
        (FixedUnit { number: l, unit: lu }, FixedUnit { number: r, unit: ru }) => {
            let left_value = if lu.eq_ignore_ascii_case(ru) {
                *l
            } else {
                convert_fixed_unit(*l, lu, ru)?
            };
            Ok(FixedUnit {
                number: op.apply(left_value, *r),
                unit: ru.clone(),
            })
        }
        (FixedUnit { number: l, unit: lu }, Percent(r)) => Ok(FixedUnit {
            number: op.apply(*l, scale_by_percent(*l, *r)),
            unit: lu.clone(),
        }),

        (a, b) => Err(ArithError::Mismatch {
            left: a.kind_name(),
            right: b.kind_name(),
        }),
    }
}

/// Evaluate `left && right` or `left || right`. Both operands must already be
/// booleans — there is no truthiness coercion in this language.
///
/// # Errors
/// Returns [`ArithError::Mismatch`] if either operand is not a boolean.
pub fn binary_logical(left: &Value, right: &Value, and: bool) -> Result<Value, ArithError> {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => {
            Ok(Value::Boolean(if and { *l && *r } else { *l || *r }))
        }
        (a, b) => Err(ArithError::Mismatch {
            left: a.kind_name(),
            right: b.kind_name(),
        }),
    }
}

/// `==` / `!=` compare by rendered text — this works uniformly across every
/// value kind without special-casing which kinds are comparable.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    left.inspect() == right.inspect()
}

/// Evaluate a relational comparison (`<`, `>`, `<=`, `>=`). Both sides must
/// be the same kind; `Currency`/`FixedUnit` operands are converted into the
/// right-hand side's unit before comparing.
///
/// # Errors
/// Returns [`ArithError`] if the kinds don't match or a required conversion
/// fails.
pub fn compare(
    left: &Value,
    right: &Value,
    op: CmpOp,
    converter: &dyn CurrencyConverter,
) -> Result<bool, ArithError> {
    match (left, right) {
        (Value::Number(l, _), Value::Number(r, _)) => Ok(op.apply(*l, *r)),
        (Value::Percent(l), Value::Percent(r)) => Ok(op.apply(*l, *r)),
        (Value::Currency { number: l, unit: lu }, Value::Currency { number: r, unit: ru }) => {
            let left_value = if lu.eq_ignore_ascii_case(ru) {
                *l
            } else {
                convert_currency(converter, *l, lu, ru)?
            };
            Ok(op.apply(left_value, *r))
        }
        (Value::FixedUnit { number: l, unit: lu }, Value::FixedUnit { number: r, unit: ru }) => {
            let left_value = if lu.eq_ignore_ascii_case(ru) {
                *l
            } else {
                convert_fixed_unit(*l, lu, ru)?
            };
            Ok(op.apply(left_value, *r))
        }
        (a, b) => Err(ArithError::Mismatch {
            left: a.kind_name(),
            right: b.kind_name(),
        }),
    }
}

/// Evaluate `left in unit_name` (and the equivalent bare postfix tag,
/// `5 km`): tag or convert `left` into `unit_name`.
///
/// A `Currency` result stores `unit_name` exactly as written (not
/// upper-cased) so that `2 in usd in thb` renders `"... thb"`, matching
/// whatever case the user typed — lookups against the stored code stay
/// case-insensitive throughout, so this is purely a display choice.
///
/// # Errors
/// Returns [`ArithError`] if `left` isn't a number/currency/fixed-unit, if
/// `unit_name` isn't recognized, or if a required conversion fails.
pub fn eval_in(
    left: &Value,
    unit_name: &str,
    converter: &dyn CurrencyConverter,
) -> Result<Value, ArithError> {
    match left {
        Value::Number(n, _) => {
            if let Some(form) = number_form_keyword(unit_name) {
                Ok(Value::Number(*n, form))
            } else if is_fiat_currency(unit_name) {
                Ok(Value::Currency {
                    number: *n,
                    unit: unit_name.to_string(),
                })
            } else if is_fixed_unit(unit_name) {
                Ok(Value::FixedUnit {
                    number: *n,
                    unit: unit_name.to_lowercase(),
                })
            } else {
                Err(ArithError::UnknownUnit(unit_name.to_string()))
            }
        }
        Value::Currency { number, unit } => {
            // A currency amount has no number form of its own to update; a
            // number-form keyword applied to one is accepted but has no
            // observable effect, the same as tagging it with its own code.
            if number_form_keyword(unit_name).is_some() {
                return Ok(Value::Currency {
                    number: *number,
                    unit: unit.clone(),
                });
            }
            if unit.eq_ignore_ascii_case(unit_name) {
                Ok(Value::Currency {
                    number: *number,
                    unit: unit.clone(),
                })
            } else {
                let converted = convert_currency(converter, *number, unit, unit_name)?;
                Ok(Value::Currency {
                    number: converted,
                    unit: unit_name.to_string(),
                })
            }
        }
        Value::FixedUnit { number, unit } => {
            if unit.eq_ignore_ascii_case(unit_name) {
                Ok(Value::FixedUnit {
                    number: *number,
                    unit: unit.clone(),
                })
            } else {
                let converted = convert_fixed_unit(*number, unit, unit_name)?;
                Ok(Value::FixedUnit {
                    number: converted,
                    unit: unit_name.to_lowercase(),
                })
            }
        }
        other => Err(ArithError::Mismatch {
            left: other.kind_name(),
            right: "unit",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{binary_arith, compare, eval_in, format_number, ArithOp, CmpOp, Value};
    use calcline_units::{CurrencyConverter, CurrencyError};
    use pretty_assertions::assert_eq;

    struct FixedRateConverter;
    impl CurrencyConverter for FixedRateConverter {
        fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
            match (from, to) {
                ("USD", "EUR") => Ok(value * 0.9),
                ("EUR", "USD") => Ok(value / 0.9),
                _ => Ok(value),
            }
        }
    }

    #[test]
    fn number_plus_number() {
        let result = binary_arith(&Value::number(1.0), &Value::number(2.0), ArithOp::Add, &FixedRateConverter).unwrap();
        assert!(matches!(result, Value::Number(n, _) if (n - 3.0).abs() < 1e-9));
    }

    #[test]
    fn percent_of_number_as_left_operand() {
        // 50% + 200 -> 200 + (50/100)*200 = 300
        let result = binary_arith(&Value::Percent(50.0), &Value::number(200.0), ArithOp::Add, &FixedRateConverter).unwrap();
        assert!(matches!(result, Value::Number(n, _) if (n - 300.0).abs() < 1e-9));
    }

    #[test]
    fn number_plus_percent_as_right_operand() {
        // 200 + 50% -> 200 + (50/100)*200 = 300
        let result = binary_arith(&Value::number(200.0), &Value::Percent(50.0), ArithOp::Add, &FixedRateConverter).unwrap();
        assert!(matches!(result, Value::Number(n, _) if (n - 300.0).abs() < 1e-9));
    }

    #[test]
    fn currency_plus_currency_with_the_same_code_keeps_the_lefts_casing() {
        let left = Value::Currency { number: 5.0, unit: "usd".to_string() };
        let right = Value::Currency { number: 3.0, unit: "USD".to_string() };
        let result = binary_arith(&left, &right, ArithOp::Add, &FixedRateConverter).unwrap();
        match result {
            Value::Currency { number, unit } => {
                assert_eq!(unit, "usd");
                assert!((number - 8.0).abs() < 1e-9);
            }
            other => panic!("expected currency, got {other:?}"),
        }
    }

    #[test]
    fn currency_plus_currency_converts_left_into_rights_unit() {
        let left = Value::Currency { number: 10.0, unit: "USD".to_string() };
        let right = Value::Currency { number: 5.0, unit: "EUR".to_string() };
        let result = binary_arith(&left, &right, ArithOp::Add, &FixedRateConverter).unwrap();
        match result {
            Value::Currency { number, unit } => {
                assert_eq!(unit, "EUR");
                assert!((number - 14.0).abs() < 1e-9); // 10*0.9 + 5
            }
            other => panic!("expected currency, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_kinds_are_rejected() {
        let err = binary_arith(&Value::Boolean(true), &Value::number(1.0), ArithOp::Add, &FixedRateConverter).unwrap_err();
        assert!(matches!(err, super::ArithError::Mismatch { .. }));
    }

    #[test]
    fn fixed_unit_plus_fixed_unit_converts_through_base() {
        let left = Value::FixedUnit { number: 1.0, unit: "m".to_string() };
        let right = Value::FixedUnit { number: 50.0, unit: "cm".to_string() };
        let result = binary_arith(&left, &right, ArithOp::Add, &FixedRateConverter).unwrap();
        match result {
            Value::FixedUnit { number, unit } => {
                assert_eq!(unit, "cm");
                assert!((number - 150.0).abs() < 1e-6);
            }
            other => panic!("expected fixed unit, got {other:?}"),
        }
    }

    #[test]
    fn equality_compares_rendered_text() {
        assert!(super::values_equal(&Value::number(1.0), &Value::number(1.0)));
        assert!(!super::values_equal(&Value::number(1.0), &Value::Boolean(true)));
    }

    #[test]
    fn comparison_requires_matching_kinds() {
        let err = compare(&Value::number(1.0), &Value::Boolean(true), CmpOp::Lt, &FixedRateConverter).unwrap_err();
        assert!(matches!(err, super::ArithError::Mismatch { .. }));
    }

    #[test]
    fn comparison_converts_currency_before_comparing() {
        let left = Value::Currency { number: 1.0, unit: "USD".to_string() };
        let right = Value::Currency { number: 0.5, unit: "EUR".to_string() };
        // 1 USD -> 0.9 EUR, which is > 0.5 EUR
        assert!(compare(&left, &right, CmpOp::Gt, &FixedRateConverter).unwrap());
    }

    #[test]
    fn percent_compares_against_percent() {
        assert!(compare(&Value::Percent(50.0), &Value::Percent(10.0), CmpOp::Gt, &FixedRateConverter).unwrap());
    }

    #[test]
    fn percent_plus_percent_adds_the_raw_values() {
        let result = binary_arith(&Value::Percent(10.0), &Value::Percent(5.0), ArithOp::Add, &FixedRateConverter).unwrap();
        assert!(matches!(result, Value::Percent(n) if (n - 15.0).abs() < 1e-9));
    }

    #[test]
    fn eval_in_tags_a_bare_number_as_currency() {
        let result = eval_in(&Value::number(10.0), "usd", &FixedRateConverter).unwrap();
        match result {
            Value::Currency { number, unit } => {
                assert!((number - 10.0).abs() < 1e-9);
                // Stored exactly as written, not upper-cased — only lookups
                // against the code are case-insensitive.
                assert_eq!(unit, "usd");
            }
            other => panic!("expected currency, got {other:?}"),
        }
    }

    #[test]
    fn chained_in_conversions_render_with_the_last_written_case() {
        struct StubConverter;
        impl CurrencyConverter for StubConverter {
            fn convert(&self, _value: f64, _from: &str, _to: &str) -> Result<f64, CurrencyError> {
                Ok(200.0)
            }
        }
        let tagged = eval_in(&Value::number(2.0), "usd", &StubConverter).unwrap();
        let converted = eval_in(&tagged, "thb", &StubConverter).unwrap();
        assert_eq!(converted.inspect(), "200 thb");
    }

    #[test]
    fn eval_in_tags_a_bare_number_as_a_fixed_unit() {
        let result = eval_in(&Value::number(5.0), "km", &FixedRateConverter).unwrap();
        match result {
            Value::FixedUnit { number, unit } => {
                assert!((number - 5.0).abs() < 1e-9);
                assert_eq!(unit, "km");
            }
            other => panic!("expected fixed unit, got {other:?}"),
        }
    }

    #[test]
    fn eval_in_rejects_an_unrecognized_unit_name() {
        assert!(eval_in(&Value::number(1.0), "zzz", &FixedRateConverter).is_err());
    }

    #[test]
    fn format_number_renders_nan_literally() {
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn format_number_drops_trailing_point_zero() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.5), "3.5");
    }

    #[test]
    fn eval_in_tags_a_number_with_an_explicit_form() {
        let result = eval_in(&Value::number(255.0), "hex", &FixedRateConverter).unwrap();
        assert_eq!(result.inspect(), "0xff");
        let result = eval_in(&result, "binary", &FixedRateConverter).unwrap();
        assert_eq!(result.inspect(), "0b11111111");
        let result = eval_in(&result, "decimal", &FixedRateConverter).unwrap();
        assert_eq!(result.inspect(), "255");
    }

    #[test]
    fn arithmetic_between_two_numbers_keeps_the_left_operands_form() {
        let hex = eval_in(&Value::number(16.0), "hex", &FixedRateConverter).unwrap();
        let result = binary_arith(&hex, &Value::number(1.0), ArithOp::Add, &FixedRateConverter).unwrap();
        assert_eq!(result.inspect(), "0x11");
    }

    #[test]
    fn nan_renders_literally_regardless_of_form() {
        let binary_nan = eval_in(&Value::number(f64::NAN), "binary", &FixedRateConverter).unwrap();
        assert_eq!(binary_nan.inspect(), "NaN");
    }
}
