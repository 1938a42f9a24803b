//! Fixed-unit registry and currency code table.
//!
//! A [`UnitDef`] converts to and from a quantity-specific base unit
//! (millimeters for length, milligrams for mass, and so on). Converting
//! between two units of the same [`Quantity`] is always `to_base` on the
//! source followed by `from_base` on the destination — this crate never
//! hard-codes a direct `X -> Y` factor, matching how the registry this is
//! grounded on expresses every unit.
//!
//! Currency conversion is different: exchange rates are not static data, so
//! this crate only defines the ISO-4217 code table and the
//! [`CurrencyConverter`] trait a host implements and injects into the
//! evaluator.

use thiserror::Error;

/// The physical quantity a fixed unit measures. Two units only convert if
/// they belong to the same quantity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Quantity {
    Length,
    Mass,
    Volume,
    Temperature,
    Time,
    Storage,
    Power,
}

/// A single entry in the fixed-unit registry.
pub struct UnitDef {
    /// The short key as it appears in source text (`"kg"`, `"mi"`).
    pub key: &'static str,
    /// Plural display name (`"kilograms"`).
    pub full_name: &'static str,
    /// Singular display name (`"kilogram"`).
    pub full_name_singular: &'static str,
    pub quantity: Quantity,
    to_base: fn(f64) -> f64,
    from_base: fn(f64) -> f64,
}

impl UnitDef {
    #[must_use]
    pub fn to_base_unit(&self, value: f64) -> f64 {
        (self.to_base)(value)
    }

    #[must_use]
    pub fn from_base_unit(&self, value: f64) -> f64 {
        (self.from_base)(value)
    }
}

fn identity(v: f64) -> f64 {
    v
}

macro_rules! scale_pair {
    ($factor:expr) => {
        (|v: f64| v * $factor, |v: f64| v / $factor)
    };
}

const LENGTH_MM: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const LENGTH_CM: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(10.0);
const LENGTH_M: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);
const LENGTH_KM: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000.0);
const LENGTH_IN: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(25.4);
const LENGTH_FT: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(304.8);
const LENGTH_YD: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(914.4);
const LENGTH_MI: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_609_344.0);

const MASS_MG: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const MASS_G: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);
const MASS_KG: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000.0);
const MASS_LBS: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(453_592.37);
const MASS_TONNE: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000_000.0);

const VOLUME_ML: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const VOLUME_L: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);

fn celsius_to_base(v: f64) -> f64 {
    v
}
fn celsius_from_base(v: f64) -> f64 {
    v
}
fn fahrenheit_to_base(v: f64) -> f64 {
    (v - 32.0) * 5.0 / 9.0
}
fn fahrenheit_from_base(v: f64) -> f64 {
    (v * 9.0 / 5.0) + 32.0
}
fn kelvin_to_base(v: f64) -> f64 {
    v - 273.15
}
fn kelvin_from_base(v: f64) -> f64 {
    v + 273.15
}

const TIME_MS: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const TIME_S: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);
const TIME_MIN: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(60_000.0);
const TIME_HR: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(3_600_000.0);
const TIME_DAY: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(86_400_000.0);
const TIME_YEAR: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(31_536_000_000.0);

const STORAGE_B: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const STORAGE_KB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);
const STORAGE_MB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000.0);
const STORAGE_GB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000_000.0);
const STORAGE_TB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000_000_000.0);
const STORAGE_PB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000_000_000_000_000.0);
const STORAGE_KIB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_024.0);
const STORAGE_MIB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_048_576.0);
const STORAGE_GIB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_073_741_824.0);
const STORAGE_TIB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_099_511_627_776.0);
const STORAGE_PIB: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_125_899_906_842_624.0);

const POWER_W: (fn(f64) -> f64, fn(f64) -> f64) = (identity, identity);
const POWER_KW: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(1_000.0);
const POWER_HP: (fn(f64) -> f64, fn(f64) -> f64) = scale_pair!(745.7);

macro_rules! unit {
    ($key:literal, $plural:literal, $singular:literal, $quantity:expr, $pair:expr) => {
        UnitDef {
            key: $key,
            full_name: $plural,
            full_name_singular: $singular,
            quantity: $quantity,
            to_base: $pair.0,
            from_base: $pair.1,
        }
    };
}

/// The full fixed-unit registry, grouped by quantity.
pub static UNITS: &[UnitDef] = &[
    unit!("mm", "millimeters", "millimeter", Quantity::Length, LENGTH_MM),
    unit!("cm", "centimeters", "centimeter", Quantity::Length, LENGTH_CM),
    unit!("m", "meters", "meter", Quantity::Length, LENGTH_M),
    unit!("km", "kilometers", "kilometer", Quantity::Length, LENGTH_KM),
    unit!("in", "inches", "inch", Quantity::Length, LENGTH_IN),
    unit!("ft", "feet", "foot", Quantity::Length, LENGTH_FT),
    unit!("yd", "yards", "yard", Quantity::Length, LENGTH_YD),
    unit!("mi", "miles", "mile", Quantity::Length, LENGTH_MI),
    unit!("mg", "milligrams", "milligram", Quantity::Mass, MASS_MG),
    unit!("g", "grams", "gram", Quantity::Mass, MASS_G),
    unit!("kg", "kilograms", "kilogram", Quantity::Mass, MASS_KG),
    unit!("lbs", "pounds", "pound", Quantity::Mass, MASS_LBS),
    unit!("tonne", "tonnes", "tonne", Quantity::Mass, MASS_TONNE),
    unit!("ml", "milliliters", "milliliter", Quantity::Volume, VOLUME_ML),
    unit!("l", "liters", "liter", Quantity::Volume, VOLUME_L),
    unit!(
        "c",
        "celsius",
        "celsius",
        Quantity::Temperature,
        (celsius_to_base as fn(f64) -> f64, celsius_from_base as fn(f64) -> f64)
    ),
    unit!(
        "f",
        "fahrenheit",
        "fahrenheit",
        Quantity::Temperature,
        (fahrenheit_to_base as fn(f64) -> f64, fahrenheit_from_base as fn(f64) -> f64)
    ),
    unit!(
        "k",
        "kelvin",
        "kelvin",
        Quantity::Temperature,
        (kelvin_to_base as fn(f64) -> f64, kelvin_from_base as fn(f64) -> f64)
    ),
    unit!("ms", "milliseconds", "millisecond", Quantity::Time, TIME_MS),
    unit!("s", "seconds", "second", Quantity::Time, TIME_S),
    unit!("min", "minutes", "minute", Quantity::Time, TIME_MIN),
    unit!("hr", "hours", "hour", Quantity::Time, TIME_HR),
    unit!("day", "days", "day", Quantity::Time, TIME_DAY),
    unit!("year", "years", "year", Quantity::Time, TIME_YEAR),
    unit!("b", "bytes", "byte", Quantity::Storage, STORAGE_B),
    unit!("kb", "kilobytes", "kilobyte", Quantity::Storage, STORAGE_KB),
    unit!("mb", "megabytes", "megabyte", Quantity::Storage, STORAGE_MB),
    unit!("gb", "gigabytes", "gigabyte", Quantity::Storage, STORAGE_GB),
    unit!("tb", "terabytes", "terabyte", Quantity::Storage, STORAGE_TB),
    unit!("pb", "petabytes", "petabyte", Quantity::Storage, STORAGE_PB),
    unit!("kib", "kibibytes", "kibibyte", Quantity::Storage, STORAGE_KIB),
    unit!("mib", "mebibytes", "mebibyte", Quantity::Storage, STORAGE_MIB),
    unit!("gib", "gibibytes", "gibibyte", Quantity::Storage, STORAGE_GIB),
    unit!("tib", "tebibytes", "tebibyte", Quantity::Storage, STORAGE_TIB),
    unit!("pib", "pebibytes", "pebibyte", Quantity::Storage, STORAGE_PIB),
    unit!("w", "watts", "watt", Quantity::Power, POWER_W),
    unit!("kw", "kilowatts", "kilowatt", Quantity::Power, POWER_KW),
    unit!("hp", "horsepower", "horsepower", Quantity::Power, POWER_HP),
];

/// Look up a unit by key, plural name, or singular name, case-insensitively.
#[must_use]
pub fn lookup_unit(name: &str) -> Option<&'static UnitDef> {
    UNITS.iter().find(|u| {
        u.key.eq_ignore_ascii_case(name)
            || u.full_name.eq_ignore_ascii_case(name)
            || u.full_name_singular.eq_ignore_ascii_case(name)
    })
}

/// Is `name` recognized as a fixed unit under any of its spellings?
#[must_use]
pub fn is_fixed_unit(name: &str) -> bool {
    lookup_unit(name).is_some()
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum UnitError {
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),
    #[error("cannot convert `{from}` to `{to}`: different quantities")]
    QuantityMismatch { from: String, to: String },
}

/// Convert `value` from `from` to `to`.
///
/// Matching units (by key, case-insensitively) short-circuit to the input
/// value unchanged, even if `from`/`to` are not recognized unit names — this
/// matches the fixed-unit converter's identity check, which runs before
/// validating that either side is a known unit.
pub fn convert_fixed_unit(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    if from.eq_ignore_ascii_case(to) {
        return Ok(value);
    }
    let from_unit = lookup_unit(from).ok_or_else(|| UnitError::UnknownUnit(from.to_string()))?;
    let to_unit = lookup_unit(to).ok_or_else(|| UnitError::UnknownUnit(to.to_string()))?;
    if from_unit.quantity != to_unit.quantity {
        return Err(UnitError::QuantityMismatch {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let base = from_unit.to_base_unit(value);
    Ok(to_unit.from_base_unit(base))
}

/// ISO-4217 codes this engine recognizes as valid currency units.
pub static FIAT_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CNY", "CHF", "CAD", "AUD", "NZD", "THB", "SGD", "HKD", "KRW",
    "INR", "IDR", "MYR", "PHP", "VND", "PKR", "BDT", "LKR", "NPR", "KHR", "MMK", "LAK", "MNT",
    "KZT", "UZS", "AED", "SAR", "QAR", "KWD", "BHD", "OMR", "ILS", "JOD", "IRR", "IQD", "SEK",
    "NOK", "DKK", "PLN", "CZK", "HUF", "RON", "BGN", "ISK", "UAH", "RSD", "ALL", "MKD", "BAM",
    "MDL", "BYN", "RUB", "MXN", "BRL", "ARS", "CLP", "COP", "PEN", "UYU", "BOB", "PYG", "VES",
    "DOP", "CUP", "JMD", "TTD", "ZAR", "NGN", "KES", "UGX", "TZS", "GHS", "ETB", "MAD", "DZD",
    "TND", "EGP", "SDG", "ZMW", "BWP", "MUR", "XAF", "XOF", "XPF", "XCD",
];

/// Is `code` a recognized ISO-4217 currency code (case-insensitive)?
#[must_use]
pub fn is_fiat_currency(code: &str) -> bool {
    FIAT_CURRENCIES.iter().any(|c| c.eq_ignore_ascii_case(code))
}

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("unknown ISO-4217 currency code `{0}`")]
    UnknownCurrency(String),
    #[error("currency conversion failed: {0}")]
    Converter(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A host-supplied source of exchange rates.
///
/// The core engine has no network access and no notion of "current" rates —
/// it only validates that both currency codes are known ISO-4217 codes and
/// delegates the actual conversion to whatever a host plugs in here. A
/// caching/memoizing implementation is expected but is the host's
/// responsibility, not this trait's.
pub trait CurrencyConverter {
    /// Convert `value` units of `from` into `to`. Both codes are guaranteed
    /// by the caller to be known ISO-4217 codes before this is invoked.
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, CurrencyError>;
}

/// Validate and convert a currency amount using `converter`.
///
/// Unlike [`convert_fixed_unit`], identity conversions still validate that
/// the code is a known currency first — an unrecognized three-letter code
/// used on both sides of `in` is still an error.
pub fn convert_currency(
    converter: &dyn CurrencyConverter,
    value: f64,
    from: &str,
    to: &str,
) -> Result<f64, CurrencyError> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    if !is_fiat_currency(&from) {
        return Err(CurrencyError::UnknownCurrency(from));
    }
    if !is_fiat_currency(&to) {
        return Err(CurrencyError::UnknownCurrency(to));
    }
    if from == to {
        return Ok(value);
    }
    converter.convert(value, &from, &to)
}

#[cfg(test)]
mod tests {
    use super::{convert_fixed_unit, is_fiat_currency, lookup_unit, Quantity, UnitError};
    use pretty_assertions::assert_eq;

    #[test]
    fn looks_up_units_case_insensitively_and_by_plural_name() {
        assert_eq!(lookup_unit("KG").unwrap().key, "kg");
        assert_eq!(lookup_unit("Kilograms").unwrap().key, "kg");
        assert_eq!(lookup_unit("kilogram").unwrap().key, "kg");
    }

    #[test]
    fn converts_length_through_the_base_unit() {
        let v = convert_fixed_unit(1.0, "m", "cm").unwrap();
        assert!((v - 100.0).abs() < 1e-9);
    }

    #[test]
    fn converts_fahrenheit_to_celsius() {
        let v = convert_fixed_unit(32.0, "f", "c").unwrap();
        assert!((v - 0.0).abs() < 1e-9);
    }

    #[test]
    fn converts_celsius_to_kelvin() {
        let v = convert_fixed_unit(0.0, "c", "k").unwrap();
        assert!((v - 273.15).abs() < 1e-9);
    }

    #[test]
    fn rejects_cross_quantity_conversion() {
        let err = convert_fixed_unit(1.0, "kg", "m").unwrap_err();
        assert_eq!(
            err,
            UnitError::QuantityMismatch {
                from: "kg".to_string(),
                to: "m".to_string()
            }
        );
    }

    #[test]
    fn same_unit_is_a_no_op_even_for_unknown_names() {
        assert_eq!(convert_fixed_unit(5.0, "frobs", "frobs").unwrap(), 5.0);
    }

    #[test]
    fn storage_binary_units_use_powers_of_1024() {
        let v = convert_fixed_unit(1.0, "gib", "mib").unwrap();
        assert!((v - 1024.0).abs() < 1e-6);
    }

    #[test]
    fn every_registered_unit_has_a_unique_key() {
        let keys: Vec<&str> = super::UNITS.iter().map(|u| u.key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(keys.len(), sorted.len());
    }

    #[test]
    fn fiat_currency_lookup_is_case_insensitive() {
        assert!(is_fiat_currency("usd"));
        assert!(is_fiat_currency("USD"));
        assert!(!is_fiat_currency("zzz"));
    }

    #[test]
    fn temperature_quantity_is_shared_by_all_three_scales() {
        for key in ["c", "f", "k"] {
            assert_eq!(lookup_unit(key).unwrap().quantity, Quantity::Temperature);
        }
    }
}
