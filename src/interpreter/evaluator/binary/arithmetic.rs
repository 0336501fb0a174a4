use std::rc::Rc;

use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    util::num::int_to_float,
};

/// Returns both operands as floats when at least one of them is a float and
/// the other is numeric.
fn float_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => Some((*a, *b)),
        (Value::Float(a), Value::Integer(b)) => Some((*a, int_to_float(*b))),
        (Value::Integer(a), Value::Float(b)) => Some((int_to_float(*a), *b)),
        _ => None,
    }
}

fn overflow(line: usize) -> RuntimeError {
    RuntimeError::exception("integer overflow", line)
}

fn unsupported(op: BinaryOperator, left: &Value, right: &Value, line: usize) -> RuntimeError {
    RuntimeError::type_error(format!("Unsupported operand types for {op}: '{}' and '{}'",
                                     left.type_name(),
                                     right.type_name()),
                             line)
}

/// Number of repetitions for `str * int` and `list * int`. Negative counts
/// repeat zero times.
fn repeat_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

/// Integer floor division, rounding toward negative infinity.
fn floor_div(a: i64, b: i64, line: usize) -> EvalResult<i64> {
    let q = a.checked_div(b).ok_or_else(|| overflow(line))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Integer modulo taking the sign of the divisor.
fn floor_mod(a: i64, b: i64, line: usize) -> EvalResult<i64> {
    let r = a.checked_rem(b).ok_or_else(|| overflow(line))?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn float_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}

impl Context {
    /// Evaluates an arithmetic operator.
    ///
    /// Integer operands stay integers except for `/`, which always yields a
    /// float. Integer overflow raises `Exception`. Mixing an integer with a
    /// float promotes to float. `+` also concatenates strings and lists,
    /// and `*` repeats a string or list by an integer count.
    ///
    /// # Errors
    /// - `ZeroDivisionError` for `/`, `//` and `%` by zero, and for zero
    ///   raised to a negative power.
    /// - `TypeError` for operand types the operator does not support.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let r = Context::eval_arithmetic(BinaryOperator::Mod,
    ///                                  &Value::Integer(-7),
    ///                                  &Value::Integer(3),
    ///                                  1);
    /// assert_eq!(r.unwrap(), Value::Integer(2));
    ///
    /// let r = Context::eval_arithmetic(BinaryOperator::Mul, &Value::from("ab"), &Value::Integer(2), 1);
    /// assert_eq!(r.unwrap(), Value::from("abab"));
    /// ```
    pub fn eval_arithmetic(op: BinaryOperator,
                           left: &Value,
                           right: &Value,
                           line: usize)
                           -> EvalResult<Value> {
        use BinaryOperator::{Add, Div, FloorDiv, Mod, Mul, Pow, Sub};
        use Value::{Float, Integer, List, Str};

        if matches!(op, Div | FloorDiv | Mod) && Self::is_zero(right) {
            return Err(RuntimeError::zero_division(format!("Division by zero in '{op}'"), line));
        }

        match (op, left, right) {
            (Add, Integer(a), Integer(b)) => a.checked_add(*b).map(Integer).ok_or_else(|| overflow(line)),
            (Sub, Integer(a), Integer(b)) => a.checked_sub(*b).map(Integer).ok_or_else(|| overflow(line)),
            (Mul, Integer(a), Integer(b)) => a.checked_mul(*b).map(Integer).ok_or_else(|| overflow(line)),
            (FloorDiv, Integer(a), Integer(b)) => floor_div(*a, *b, line).map(Integer),
            (Mod, Integer(a), Integer(b)) => floor_mod(*a, *b, line).map(Integer),
            (Pow, Integer(a), Integer(b)) => Self::int_pow(*a, *b, line),

            (Add, Str(a), Str(b)) => Ok(Str(format!("{a}{b}"))),
            (Add, List(a), List(b)) => {
                let mut items = a.as_ref().clone();
                items.extend(b.iter().cloned());
                Ok(List(Rc::new(items)))
            },
            (Mul, Str(s), Integer(n)) | (Mul, Integer(n), Str(s)) => {
                Ok(Str(s.repeat(repeat_count(*n))))
            },
            (Mul, List(items), Integer(n)) | (Mul, Integer(n), List(items)) => {
                let count = repeat_count(*n);
                let mut out = Vec::with_capacity(items.len().saturating_mul(count));
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Ok(List(Rc::new(out)))
            },

            (Div, _, _) => {
                let a = left.as_float(line).map_err(|_| unsupported(op, left, right, line))?;
                let b = right.as_float(line).map_err(|_| unsupported(op, left, right, line))?;
                Ok(Float(a / b))
            },

            _ => {
                let (a, b) = float_pair(left, right).ok_or_else(|| unsupported(op, left, right, line))?;
                match op {
                    Add => Ok(Float(a + b)),
                    Sub => Ok(Float(a - b)),
                    Mul => Ok(Float(a * b)),
                    FloorDiv => Ok(Float((a / b).floor())),
                    Mod => Ok(Float(float_mod(a, b))),
                    Pow => {
                        if a == 0.0 && b < 0.0 {
                            return Err(RuntimeError::zero_division("0.0 cannot be raised to a negative power",
                                                                   line));
                        }
                        Ok(Float(a.powf(b)))
                    },
                    _ => Err(unsupported(op, left, right, line)),
                }
            },
        }
    }

    /// Integer exponentiation. A negative exponent produces a float.
    fn int_pow(base: i64, exp: i64, line: usize) -> EvalResult<Value> {
        if exp < 0 {
            if base == 0 {
                return Err(RuntimeError::zero_division("0 cannot be raised to a negative power",
                                                       line));
            }
            return Ok(Value::Float(int_to_float(base).powf(int_to_float(exp))));
        }
        u32::try_from(exp).ok()
                          .and_then(|exp| base.checked_pow(exp))
                          .map(Value::Integer)
                          .ok_or_else(|| overflow(line))
    }

    fn is_zero(value: &Value) -> bool {
        match value {
            Value::Integer(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn arith(op: BinaryOperator, a: Value, b: Value) -> EvalResult<Value> {
        Context::eval_arithmetic(op, &a, &b, 1)
    }

    #[test]
    fn floor_division_rounds_down() {
        assert_eq!(arith(BinaryOperator::FloorDiv, Value::Integer(-7), Value::Integer(2)).unwrap(),
                   Value::Integer(-4));
        assert_eq!(arith(BinaryOperator::FloorDiv, Value::Float(7.5), Value::Integer(2)).unwrap(),
                   Value::Float(3.0));
    }

    #[test]
    fn modulo_takes_the_sign_of_the_divisor() {
        assert_eq!(arith(BinaryOperator::Mod, Value::Integer(7), Value::Integer(-3)).unwrap(),
                   Value::Integer(-2));
        assert_eq!(arith(BinaryOperator::Mod, Value::Float(-1.5), Value::Integer(1)).unwrap(),
                   Value::Float(0.5));
    }

    #[test]
    fn zero_divisors_are_rejected() {
        for op in [BinaryOperator::Div, BinaryOperator::FloorDiv, BinaryOperator::Mod] {
            let err = arith(op, Value::Integer(1), Value::Float(0.0)).unwrap_err();
            assert_eq!(err.kind_name(), "ZeroDivisionError");
        }
    }

    #[test]
    fn overflow_raises_exception() {
        let err = arith(BinaryOperator::Add, Value::Integer(i64::MAX), Value::Integer(1)).unwrap_err();
        assert_eq!(err.kind_name(), "Exception");
        let err = arith(BinaryOperator::Pow, Value::Integer(2), Value::Integer(64)).unwrap_err();
        assert_eq!(err.kind_name(), "Exception");
    }

    #[test]
    fn power_stays_integral_for_integer_operands() {
        assert_eq!(arith(BinaryOperator::Pow, Value::Integer(2), Value::Integer(10)).unwrap(),
                   Value::Integer(1024));
        assert_eq!(arith(BinaryOperator::Pow, Value::Integer(2), Value::Integer(-1)).unwrap(),
                   Value::Float(0.5));
    }

    #[test]
    fn lists_concatenate_and_repeat() {
        let list = Value::from(vec![Value::Integer(1)]);
        assert_eq!(arith(BinaryOperator::Add, list.clone(), list.clone()).unwrap()
                                                                         .to_string(),
                   "[1, 1]");
        assert_eq!(arith(BinaryOperator::Mul, list, Value::Integer(3)).unwrap().to_string(),
                   "[1, 1, 1]");
    }

    #[test]
    fn mixed_strings_and_numbers_are_type_errors() {
        let err = arith(BinaryOperator::Add, Value::from("a"), Value::Integer(1)).unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
