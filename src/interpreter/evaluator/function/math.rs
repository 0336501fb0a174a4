use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::float_to_int,
};

/// Defines a builtin applying an `f64` method to one numeric argument.
///
/// Integers are promoted to floats first. The result is always a float.
macro_rules! float_builtin {
    ($($(#[$meta:meta])* $fname:ident => $method:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fname(args: &[Value], line: usize) -> EvalResult<Value> {
                Ok(Value::Float(args[0].as_float(line)?.$method()))
            }
        )*
    };
}

float_builtin! {
    /// `Sin(x)`, in radians.
    sin => sin,
    /// `Cos(x)`, in radians.
    cos => cos,
    /// `Tan(x)`, in radians.
    tan => tan,
    /// `Atan(x)`.
    atan => atan,
    /// `Exp(x)`.
    exp => exp,
    /// `Degrees(x)`: radians to degrees.
    degrees => to_degrees,
    /// `Radians(x)`: degrees to radians.
    radians => to_radians,
}

fn domain_error(line: usize) -> RuntimeError {
    RuntimeError::value("math domain error", line)
}

/// `Sqrt(x)`.
///
/// # Errors
/// `ValueError` for negative input.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::math::sqrt, value::core::Value};
///
/// assert_eq!(sqrt(&[Value::Integer(9)], 1).unwrap(), Value::Float(3.0));
/// assert!(sqrt(&[Value::Integer(-1)], 1).is_err());
/// ```
pub fn sqrt(args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_float(line)?;
    if x < 0.0 {
        return Err(domain_error(line));
    }
    Ok(Value::Float(x.sqrt()))
}

/// `Asin(x)`, for `x` in `[-1, 1]`.
pub fn asin(args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_float(line)?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain_error(line));
    }
    Ok(Value::Float(x.asin()))
}

/// `Acos(x)`, for `x` in `[-1, 1]`.
pub fn acos(args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_float(line)?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain_error(line));
    }
    Ok(Value::Float(x.acos()))
}

/// `Atan2(y, x)`.
pub fn atan2(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Float(args[0].as_float(line)?.atan2(args[1].as_float(line)?)))
}

/// `Hypot(x, y)`.
pub fn hypot(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Float(args[0].as_float(line)?.hypot(args[1].as_float(line)?)))
}

/// `Pow(base, exp)`: an integer for an integer base and a non-negative
/// integer exponent, a float otherwise.
///
/// # Errors
/// `Exception` on integer overflow.
pub fn pow(args: &[Value], line: usize) -> EvalResult<Value> {
    if let (Value::Integer(base), Value::Integer(exp)) = (&args[0], &args[1])
       && let Ok(exp) = u32::try_from(*exp)
    {
        return base.checked_pow(exp)
                   .map(Value::Integer)
                   .ok_or_else(|| RuntimeError::exception("integer overflow", line));
    }
    Ok(Value::Float(args[0].as_float(line)?.powf(args[1].as_float(line)?)))
}

/// `Log(x[, base])`: natural logarithm, or logarithm in `base`.
///
/// # Errors
/// `ValueError` for a non-positive `x`, or a base that is non-positive or
/// one.
pub fn log(args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_float(line)?;
    if x <= 0.0 {
        return Err(domain_error(line));
    }
    match args.get(1) {
        None => Ok(Value::Float(x.ln())),
        Some(base) => {
            let base = base.as_float(line)?;
            if base <= 0.0 || (base - 1.0).abs() < f64::EPSILON {
                return Err(domain_error(line));
            }
            Ok(Value::Float(x.log(base)))
        },
    }
}

/// `Log10(x)`.
pub fn log10(args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_float(line)?;
    if x <= 0.0 {
        return Err(domain_error(line));
    }
    Ok(Value::Float(x.log10()))
}

/// Rounds a number to an integer with `f`; integers pass through.
pub fn round_with(args: &[Value], line: usize, f: fn(f64) -> f64) -> EvalResult<Value> {
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        other => Ok(Value::Integer(float_to_int(f(other.as_float(line)?), line)?)),
    }
}

/// `Round(x[, digits])`: rounds half to even.
///
/// Without `digits` the result is an integer; with `digits` it keeps the
/// type of `x`.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::math::round, value::core::Value};
///
/// assert_eq!(round(&[Value::Float(2.5)], 1).unwrap(), Value::Integer(2));
/// assert_eq!(round(&[Value::Float(3.14159), Value::Integer(2)], 1).unwrap(),
///            Value::Float(3.14));
/// ```
pub fn round(args: &[Value], line: usize) -> EvalResult<Value> {
    let Some(digits) = args.get(1) else {
        return round_with(args, line, f64::round_ties_even);
    };
    let digits = i32::try_from(digits.as_int(line)?).map_err(|_| domain_error(line))?;
    match &args[0] {
        Value::Integer(n) if digits >= 0 => Ok(Value::Integer(*n)),
        other => {
            let scale = 10f64.powi(digits);
            let x = other.as_float(line)?;
            let rounded = (x * scale).round_ties_even() / scale;
            match other {
                Value::Integer(_) => Ok(Value::Integer(float_to_int(rounded, line)?)),
                _ => Ok(Value::Float(rounded)),
            }
        },
    }
}

fn non_negative(value: &Value, line: usize) -> EvalResult<i64> {
    let n = value.as_int(line)?;
    if n < 0 {
        return Err(RuntimeError::value("expected a non-negative integer", line));
    }
    Ok(n)
}

fn overflow(line: usize) -> RuntimeError {
    RuntimeError::exception("integer overflow", line)
}

/// `Factorial(n)`.
///
/// # Errors
/// `ValueError` for a negative `n`; `Exception` on overflow.
pub fn factorial(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = non_negative(&args[0], line)?;
    (1..=n).try_fold(1i64, |acc, k| acc.checked_mul(k))
           .map(Value::Integer)
           .ok_or_else(|| overflow(line))
}

/// `Perm(n, k)`: ordered selections of `k` out of `n`.
pub fn perm(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = non_negative(&args[0], line)?;
    let k = non_negative(&args[1], line)?;
    if k > n {
        return Ok(Value::Integer(0));
    }
    (n - k + 1..=n).try_fold(1i64, |acc, f| acc.checked_mul(f))
                   .map(Value::Integer)
                   .ok_or_else(|| overflow(line))
}

/// `Comb(n, k)`: unordered selections of `k` out of `n`.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::math::comb, value::core::Value};
///
/// assert_eq!(comb(&[Value::Integer(5), Value::Integer(2)], 1).unwrap(), Value::Integer(10));
/// assert_eq!(comb(&[Value::Integer(2), Value::Integer(5)], 1).unwrap(), Value::Integer(0));
/// ```
pub fn comb(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = non_negative(&args[0], line)?;
    let k = non_negative(&args[1], line)?;
    if k > n {
        return Ok(Value::Integer(0));
    }
    let k = k.min(n - k);
    let mut acc: i128 = 1;
    for i in 0..k {
        acc = acc.checked_mul(i128::from(n - i)).ok_or_else(|| overflow(line))? / i128::from(i + 1);
    }
    i64::try_from(acc).map(Value::Integer).map_err(|_| overflow(line))
}

fn gcd_of(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

/// `Gcd(a, b)`, always non-negative.
pub fn gcd(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Integer(gcd_of(args[0].as_int(line)?, args[1].as_int(line)?)))
}

/// `Lcm(a, b)`, always non-negative; zero when either argument is zero.
pub fn lcm(args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (args[0].as_int(line)?, args[1].as_int(line)?);
    if a == 0 || b == 0 {
        return Ok(Value::Integer(0));
    }
    (a / gcd_of(a, b)).checked_mul(b)
                      .map(|n| Value::Integer(n.abs()))
                      .ok_or_else(|| overflow(line))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Integer).collect()
    }

    #[test]
    fn integer_power_stays_integral() {
        assert_eq!(pow(&ints(&[2, 10]), 1).unwrap(), Value::Integer(1024));
        assert_eq!(pow(&ints(&[2, -1]), 1).unwrap(), Value::Float(0.5));
        assert_eq!(pow(&ints(&[10, 30]), 1).unwrap_err().kind_name(), "Exception");
    }

    #[test]
    fn combinatorics() {
        assert_eq!(factorial(&ints(&[5]), 1).unwrap(), Value::Integer(120));
        assert_eq!(perm(&ints(&[5, 2]), 1).unwrap(), Value::Integer(20));
        assert_eq!(comb(&ints(&[60, 30]), 1).unwrap(), Value::Integer(118_264_581_564_861_424));
        assert_eq!(factorial(&ints(&[-1]), 1).unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn gcd_and_lcm_ignore_signs() {
        assert_eq!(gcd(&ints(&[-12, 18]), 1).unwrap(), Value::Integer(6));
        assert_eq!(lcm(&ints(&[-4, 6]), 1).unwrap(), Value::Integer(12));
        assert_eq!(lcm(&ints(&[0, 6]), 1).unwrap(), Value::Integer(0));
    }

    #[test]
    fn floor_and_ceil_return_integers() {
        assert_eq!(round_with(&[Value::Float(-1.5)], 1, f64::floor).unwrap(), Value::Integer(-2));
        assert_eq!(round_with(&[Value::Float(1.2)], 1, f64::ceil).unwrap(), Value::Integer(2));
    }

    #[test]
    fn logarithm_domain() {
        assert_eq!(log(&[Value::Integer(8), Value::Integer(2)], 1).unwrap(), Value::Float(3.0));
        assert_eq!(log(&[Value::Integer(0)], 1).unwrap_err().kind_name(), "ValueError");
    }
}
