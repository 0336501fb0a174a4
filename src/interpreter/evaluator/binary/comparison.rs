use std::cmp::Ordering;

use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a comparison of the form `Value <Operator> Value`.
    ///
    /// `==` and `!=` use structural equality and never fail; an integer equals
    /// a float of the same value and values of unrelated types are unequal.
    /// The ordering operators accept two numbers or two strings.
    ///
    /// # Parameters
    /// - `op`: The comparison operator.
    /// - `left`: The left-hand value.
    /// - `right`: The right-hand value.
    /// - `line`: Current line number used for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing a boolean result.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let a = Value::Integer(3);
    /// let b = Value::Float(5.0);
    ///
    /// let result = Context::eval_comparison(BinaryOperator::Less, &a, &b, 1);
    /// assert_eq!(result.unwrap(), Value::Bool(true));
    ///
    /// let result = Context::eval_comparison(BinaryOperator::Less, &a, &Value::from("x"), 1);
    /// assert!(result.is_err());
    /// ```
    pub fn eval_comparison(op: BinaryOperator,
                           left: &Value,
                           right: &Value,
                           line: usize)
                           -> EvalResult<Value> {
        use BinaryOperator::{Equal, Greater, GreaterEqual, Less, LessEqual, NotEqual};

        if matches!(op, Equal | NotEqual) {
            return Ok(Value::Bool((left == right) == (op == Equal)));
        }

        let ordering = match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                left.as_float(line)?.partial_cmp(&right.as_float(line)?)
            },
            _ => {
                return Err(RuntimeError::type_error(format!("'{op}' not supported between '{}' and '{}'",
                                                            left.type_name(),
                                                            right.type_name()),
                                                    line));
            },
        };

        // NaN compares false against everything.
        let Some(ordering) = ordering else {
            return Ok(Value::Bool(false));
        };

        Ok(Value::Bool(match op {
                           Less => ordering == Ordering::Less,
                           Greater => ordering == Ordering::Greater,
                           LessEqual => ordering != Ordering::Greater,
                           GreaterEqual => ordering != Ordering::Less,
                           _ => false,
                       }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_order_lexicographically() {
        let r = Context::eval_comparison(BinaryOperator::GreaterEqual,
                                         &Value::from("b"),
                                         &Value::from("abc"),
                                         1);
        assert_eq!(r.unwrap(), Value::Bool(true));
    }

    #[test]
    fn unrelated_types_are_unequal_not_errors() {
        let r = Context::eval_comparison(BinaryOperator::NotEqual,
                                         &Value::Integer(1),
                                         &Value::from("1"),
                                         1);
        assert_eq!(r.unwrap(), Value::Bool(true));
    }

    #[test]
    fn nan_is_never_ordered() {
        let r = Context::eval_comparison(BinaryOperator::LessEqual,
                                         &Value::Float(f64::NAN),
                                         &Value::Integer(1),
                                         1);
        assert_eq!(r.unwrap(), Value::Bool(false));
    }
}
