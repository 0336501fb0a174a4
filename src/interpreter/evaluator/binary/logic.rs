use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

/// Reads an operand of `and` as a boolean.
///
/// The strings `"True"` and `"False"` are accepted alongside real booleans.
fn logic_operand(value: &Value, line: usize) -> EvalResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(s) if s == "True" => Ok(true),
        Value::Str(s) if s == "False" => Ok(false),
        other => Err(RuntimeError::type_error(format!("Operands of 'and' must be bool, found {}",
                                                      other.type_name()),
                                              line)),
    }
}

impl Context {
    /// Evaluates a logical operation.
    ///
    /// `and` requires boolean operands and yields a boolean. `or` accepts any
    /// operands and yields the left one when it is truthy, otherwise the
    /// right one.
    ///
    /// # Parameters
    /// - `op`: The logical operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let result = Context::eval_logic(BinaryOperator::Or, &Value::Integer(0), &Value::from("x"), 1);
    /// assert_eq!(result.unwrap(), Value::from("x"));
    ///
    /// let result = Context::eval_logic(BinaryOperator::And, &Value::Integer(1), &Value::Bool(true), 1);
    /// assert!(result.is_err());
    /// ```
    pub fn eval_logic(op: BinaryOperator,
                      left: &Value,
                      right: &Value,
                      line: usize)
                      -> EvalResult<Value> {
        match op {
            BinaryOperator::And => {
                let l = logic_operand(left, line)?;
                let r = logic_operand(right, line)?;
                Ok(Value::Bool(l && r))
            },
            BinaryOperator::Or => Ok(if left.is_truthy() { left.clone() } else { right.clone() }),
            other => Err(RuntimeError::type_error(format!("'{other}' is not a logical operator"),
                                                  line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_accepts_capitalised_boolean_strings() {
        let r = Context::eval_logic(BinaryOperator::And,
                                    &Value::from("True"),
                                    &Value::Bool(false),
                                    1);
        assert_eq!(r.unwrap(), Value::Bool(false));
    }

    #[test]
    fn or_keeps_a_truthy_left_operand() {
        let r = Context::eval_logic(BinaryOperator::Or, &Value::Integer(5), &Value::Integer(6), 1);
        assert_eq!(r.unwrap(), Value::Integer(5));
    }
}
