use crate::{
    ast::{BinaryOperator, Expr},
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates `left op right`.
    ///
    /// Both operands are always evaluated, left first. Neither `and` nor `or`
    /// short-circuits.
    pub(crate) fn eval_binary_op(&mut self,
                                 left: &Expr,
                                 op: BinaryOperator,
                                 right: &Expr,
                                 line: usize)
                                 -> EvalResult<Value> {
        let left = self.eval(left)?;
        let right = self.eval(right)?;
        Self::apply_binary(op, &left, &right, line)
    }

    /// Applies a binary operator to two evaluated operands.
    ///
    /// This function routes the operation to specialized handlers depending on
    /// the operator. Arithmetic operators call `eval_arithmetic`, relational
    /// and equality operators call `eval_comparison`, and logical operators
    /// call `eval_logic`. Compound assignment (`+=` and friends) goes through
    /// here as well.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing the evaluated result.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let left = Value::Integer(7);
    /// let right = Value::Integer(2);
    ///
    /// let result = Context::apply_binary(BinaryOperator::Div, &left, &right, 1);
    /// assert_eq!(result.unwrap(), Value::Float(3.5));
    ///
    /// let result = Context::apply_binary(BinaryOperator::FloorDiv, &left, &right, 1);
    /// assert_eq!(result.unwrap(), Value::Integer(3));
    /// ```
    pub fn apply_binary(op: BinaryOperator,
                        left: &Value,
                        right: &Value,
                        line: usize)
                        -> EvalResult<Value> {
        use BinaryOperator::{
            Add, And, Div, Equal, FloorDiv, Greater, GreaterEqual, Less, LessEqual, Mod, Mul,
            NotEqual, Or, Pow, Sub,
        };

        match op {
            Add | Sub | Mul | Div | FloorDiv | Mod | Pow => {
                Self::eval_arithmetic(op, left, right, line)
            },
            Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual => {
                Self::eval_comparison(op, left, right, line)
            },
            And | Or => Self::eval_logic(op, left, right, line),
        }
    }
}
