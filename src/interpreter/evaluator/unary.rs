use crate::{
    ast::{Expr, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates the operand of a unary operator and applies it.
    pub(crate) fn eval_unary_op(&mut self,
                                op: UnaryOperator,
                                operand: &Expr,
                                line: usize)
                                -> EvalResult<Value> {
        let value = self.eval(operand)?;
        Self::eval_unary(op, &value, line)
    }

    /// Evaluates a unary operation on a value.
    ///
    /// Supported operators:
    /// - `Negate`: numeric negation for integers and floats. Negating the
    ///   smallest integer overflows and raises `Exception`.
    /// - `Not`: logical negation of the operand's truthiness; accepts any
    ///   value.
    ///
    /// # Parameters
    /// - `op`: Unary operator.
    /// - `value`: Input value.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The computed `Value` wrapped in `EvalResult`.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::UnaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let neg = Context::eval_unary(UnaryOperator::Negate, &Value::Float(2.5), 1);
    /// assert_eq!(neg.unwrap(), Value::Float(-2.5));
    ///
    /// let not = Context::eval_unary(UnaryOperator::Not, &Value::from(""), 1);
    /// assert_eq!(not.unwrap(), Value::Bool(true));
    /// ```
    pub fn eval_unary(op: UnaryOperator, value: &Value, line: usize) -> EvalResult<Value> {
        match op {
            UnaryOperator::Negate => match value {
                Value::Integer(n) => n.checked_neg()
                                      .map(Value::Integer)
                                      .ok_or_else(|| RuntimeError::exception("integer overflow", line)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(RuntimeError::type_error(format!("Cannot negate a value of type {}",
                                                              other.type_name()),
                                                      line)),
            },
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negating_a_string_is_a_type_error() {
        let err = Context::eval_unary(UnaryOperator::Negate, &Value::from("x"), 1).unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }

    #[test]
    fn negating_the_smallest_integer_overflows() {
        let err = Context::eval_unary(UnaryOperator::Negate, &Value::Integer(i64::MIN), 1).unwrap_err();
        assert_eq!(err.kind_name(), "Exception");
    }
}
