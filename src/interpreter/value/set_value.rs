use std::fmt::Display;

use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// Enum representing values allowed in sets.
///
/// Sets are ordered, so elements derive `Ord`; floats are wrapped in
/// `OrderedFloat` to get a total order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetValue {
    /// A boolean such as `true`.
    Bool(bool),
    /// An integer such as `-4` or `42`.
    Integer(i64),
    /// A float such as `3.5`.
    Float(OrderedFloat<f64>),
    /// A string such as `"red"`.
    Str(String),
}

impl SetValue {
    /// Converts a runtime value into a set element.
    ///
    /// # Errors
    /// Containers, functions, instances and `void` are unhashable and produce
    /// a `TypeError`.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::value::{core::Value, set_value::SetValue};
    ///
    /// assert_eq!(SetValue::try_from_value(&Value::Integer(3), 1).unwrap(),
    ///            SetValue::Integer(3));
    /// assert!(SetValue::try_from_value(&Value::from(vec![]), 1).is_err());
    /// ```
    pub fn try_from_value(value: &Value, line: usize) -> EvalResult<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Integer(i) => Ok(Self::Integer(*i)),
            Value::Float(f) => Ok(Self::Float(OrderedFloat(*f))),
            Value::Str(s) => Ok(Self::Str(s.clone())),
            other => Err(RuntimeError::type_error(format!("unhashable type: '{}'",
                                                          other.type_name()),
                                                  line)),
        }
    }
}

impl From<SetValue> for Value {
    fn from(s: SetValue) -> Self {
        match s {
            SetValue::Bool(b) => Self::Bool(b),
            SetValue::Integer(i) => Self::Integer(i),
            SetValue::Float(f) => Self::Float(f.into_inner()),
            SetValue::Str(s) => Self::Str(s),
        }
    }
}

impl Display for SetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: Value = self.clone().into();
        write!(f, "{}", value.repr())
    }
}
