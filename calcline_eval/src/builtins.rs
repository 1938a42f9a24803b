//! Built-in numeric functions callable from expression text.
//!
//! Every built-in takes and returns plain `f64`s — the call site in the
//! evaluator is responsible for unwrapping [`crate::Value::Number`] operands
//! before calling in and wrapping the result back into a `Value` after.

use std::fmt;

#[derive(Debug)]
pub enum BuiltinError {
    UnknownFunction(String),
    ArityMismatch {
        name: String,
        expected: &'static str,
        got: usize,
    },
}

impl fmt::Display for BuiltinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinError::UnknownFunction(name) => write!(f, "unknown function `{name}`"),
            BuiltinError::ArityMismatch { name, expected, got } => {
                write!(f, "`{name}` expects {expected} argument(s), got {got}")
            }
        }
    }
}

fn arity1(name: &str, args: &[f64]) -> Result<f64, BuiltinError> {
    match args {
        [a] => Ok(*a),
        _ => Err(BuiltinError::ArityMismatch {
            name: name.to_string(),
            expected: "1",
            got: args.len(),
        }),
    }
}

fn arity2(name: &str, args: &[f64]) -> Result<(f64, f64), BuiltinError> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(BuiltinError::ArityMismatch {
            name: name.to_string(),
            expected: "2",
            got: args.len(),
        }),
    }
}

fn arity3(name: &str, args: &[f64]) -> Result<(f64, f64, f64), BuiltinError> {
    match args {
        [a, b, c] => Ok((*a, *b, *c)),
        _ => Err(BuiltinError::ArityMismatch {
            name: name.to_string(),
            expected: "3",
            got: args.len(),
        }),
    }
}

/// Is `name` a recognized built-in function?
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "mod"
            | "log10"
            | "logE"
            | "log2"
            | "round"
            | "floor"
            | "ceil"
            | "abs"
            | "sin"
            | "cos"
            | "tan"
            | "sqrt"
            | "lerp"
            | "invLerp"
            | "sum"
            | "product"
    )
}

/// Call a built-in by name with already-evaluated numeric arguments.
///
/// # Errors
/// Returns [`BuiltinError::UnknownFunction`] if `name` isn't a built-in, or
/// [`BuiltinError::ArityMismatch`] if the argument count doesn't match.
pub fn call_builtin(name: &str, args: &[f64]) -> Result<f64, BuiltinError> {
    match name {
        "mod" => arity2(name, args).map(|(a, b)| a % b),
        "log10" => arity1(name, args).map(f64::log10),
        "logE" => arity1(name, args).map(f64::ln),
        "log2" => arity1(name, args).map(f64::log2),
        "round" => arity1(name, args).map(f64::round),
        "floor" => arity1(name, args).map(f64::floor),
        "ceil" => arity1(name, args).map(f64::ceil),
        "abs" => arity1(name, args).map(f64::abs),
        "sin" => arity1(name, args).map(f64::sin),
        "cos" => arity1(name, args).map(f64::cos),
        "tan" => arity1(name, args).map(f64::tan),
        "sqrt" => arity1(name, args).map(f64::sqrt),
        "lerp" => arity3(name, args).map(|(v0, v1, t)| (1.0 - t) * v0 + t * v1),
        "invLerp" => arity3(name, args).map(|(v0, v1, v)| (v - v0) / (v1 - v0)),
        // The identity for `product` is 1, not 0 — an empty `product()` call
        // must return the multiplicative identity so that `product(x) == x`
        // holds, mirroring how `sum()` returns the additive identity `0`.
        "sum" => Ok(args.iter().sum()),
        "product" => Ok(if args.is_empty() {
            1.0
        } else {
            args.iter().product()
        }),
        other => Err(BuiltinError::UnknownFunction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::call_builtin;
    use pretty_assertions::assert_eq;

    #[test]
    fn mod_computes_a_remainder() {
        assert_eq!(call_builtin("mod", &[7.0, 3.0]).unwrap(), 1.0);
    }

    #[test]
    fn lerp_interpolates_between_two_values() {
        let v = call_builtin("lerp", &[0.0, 10.0, 0.5]).unwrap();
        assert!((v - 5.0).abs() < 1e-9);
    }

    #[test]
    fn inv_lerp_is_the_inverse_of_lerp() {
        let v = call_builtin("invLerp", &[0.0, 10.0, 5.0]).unwrap();
        assert!((v - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sum_of_no_arguments_is_zero() {
        assert_eq!(call_builtin("sum", &[]).unwrap(), 0.0);
    }

    #[test]
    fn product_of_no_arguments_is_one() {
        assert_eq!(call_builtin("product", &[]).unwrap(), 1.0);
    }

    #[test]
    fn product_of_several_arguments_multiplies_them() {
        assert_eq!(call_builtin("product", &[2.0, 3.0, 4.0]).unwrap(), 24.0);
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(call_builtin("sqrt", &[1.0, 2.0]).is_err());
    }

    #[test]
    fn unknown_function_is_an_error() {
        assert!(call_builtin("frobnicate", &[1.0]).is_err());
    }
}
