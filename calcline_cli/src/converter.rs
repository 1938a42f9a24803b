//! A standalone harness's currency converter.
//!
//! The engine has no network access of its own — `CurrencyConverter` is a
//! seam the host fills in (see `calcline_units::CurrencyConverter`). A real
//! host memoizes live rates behind this trait; fetching them is out of
//! scope here; the harness instead carries a small fixed table of
//! USD-relative rates so `2 USD in EUR` has something to answer with
//! offline and deterministically.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use calcline_units::{CurrencyConverter, CurrencyError};

/// Approximate, fixed USD-per-unit rates. Not live data — good enough to
/// exercise `in`/accumulation over currencies without a network call.
const USD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.78),
    ("JPY", 151.0),
    ("CNY", 7.24),
    ("CHF", 0.88),
    ("CAD", 1.36),
    ("AUD", 1.52),
    ("NZD", 1.64),
    ("THB", 36.0),
    ("SGD", 1.34),
    ("HKD", 7.82),
    ("KRW", 1345.0),
    ("INR", 83.4),
    ("MXN", 17.0),
    ("BRL", 5.1),
];

fn rates() -> &'static FxHashMap<&'static str, f64> {
    static RATES: OnceLock<FxHashMap<&'static str, f64>> = OnceLock::new();
    RATES.get_or_init(|| USD_RATES.iter().copied().collect())
}

/// A [`CurrencyConverter`] backed by [`USD_RATES`] rather than a live feed.
#[derive(Default)]
pub struct FixedRateConverter;

impl CurrencyConverter for FixedRateConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let table = rates();
        let from_rate = table.get(from).copied().ok_or_else(|| {
            CurrencyError::Converter(format!("no fixed rate for {from}").into())
        })?;
        let to_rate = table.get(to).copied().ok_or_else(|| {
            CurrencyError::Converter(format!("no fixed rate for {to}").into())
        })?;
        Ok(value / from_rate * to_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::FixedRateConverter;
    use calcline_units::CurrencyConverter;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_between_two_rated_currencies() {
        let converter = FixedRateConverter;
        let eur = converter.convert(100.0, "USD", "EUR").unwrap();
        assert!((eur - 92.0).abs() < 1e-9);
    }

    #[test]
    fn an_unrated_code_is_an_error() {
        let converter = FixedRateConverter;
        assert!(converter.convert(1.0, "USD", "ZZZ").is_err());
    }
}
