use crate::{
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::float_to_int,
};

/// `IsInstance(value, "Class")`: true when `value` is an instance of the
/// class or of one of its subclasses.
pub fn is_instance(args: &[Value], line: usize) -> EvalResult<Value> {
    let class = args[1].as_str(line)?;
    let holds = match &args[0] {
        Value::Instance(instance) => instance.borrow().class.inherits_from(class),
        _ => false,
    };
    Ok(Value::Bool(holds))
}

/// Converts to an integer, truncating floats. Yields `false` when the
/// value has no integer form.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::common::to_integer, value::core::Value};
///
/// assert_eq!(to_integer(&[Value::from(" 42 ")], 1).unwrap(), Value::Integer(42));
/// assert_eq!(to_integer(&[Value::Float(-2.7)], 1).unwrap(), Value::Integer(-2));
/// assert_eq!(to_integer(&[Value::from("4x")], 1).unwrap(), Value::Bool(false));
/// ```
pub fn to_integer(args: &[Value], line: usize) -> EvalResult<Value> {
    let converted = match &args[0] {
        Value::Integer(n) => Some(*n),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Float(f) => float_to_int(*f, line).ok(),
        Value::Str(s) => {
            let s = s.trim();
            s.parse::<i64>()
             .ok()
             .or_else(|| s.parse::<f64>().ok().and_then(|f| float_to_int(f, line).ok()))
        },
        _ => None,
    };
    Ok(converted.map_or(Value::Bool(false), Value::Integer))
}

/// Converts to a float. Yields `false` when the value has no numeric form.
pub fn to_float(args: &[Value], line: usize) -> EvalResult<Value> {
    let converted = match &args[0] {
        Value::Integer(_) | Value::Float(_) => Some(args[0].as_float(line)?),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(converted.map_or(Value::Bool(false), Value::Float))
}

/// Converts to an integer when possible, otherwise to a float, otherwise
/// yields `false`.
pub fn to_number(args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Integer(_) | Value::Float(_) => args[0].clone(),
        Value::Str(s) => {
            let s = s.trim();
            s.parse::<i64>()
             .map(Value::Integer)
             .or_else(|_| s.parse::<f64>().map(Value::Float))
             .unwrap_or(Value::Bool(false))
        },
        _ => Value::Bool(false),
    })
}

/// Converts to a boolean. The strings `true` and `false` convert in any
/// letter case; everything else converts by truthiness.
pub fn to_boolean(args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(match &args[0] {
                       Value::Str(s) if s.eq_ignore_ascii_case("true") => true,
                       Value::Str(s) if s.eq_ignore_ascii_case("false") => false,
                       other => other.is_truthy(),
                   }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(to_number(&[Value::from("12")], 1).unwrap(), Value::Integer(12));
        assert_eq!(to_number(&[Value::from("1.5")], 1).unwrap(), Value::Float(1.5));
        assert_eq!(to_number(&[Value::from("x")], 1).unwrap(), Value::Bool(false));
    }

    #[test]
    fn boolean_strings() {
        assert_eq!(to_boolean(&[Value::from("False")], 1).unwrap(), Value::Bool(false));
        assert_eq!(to_boolean(&[Value::from("yes")], 1).unwrap(), Value::Bool(true));
        assert_eq!(to_boolean(&[Value::Integer(0)], 1).unwrap(), Value::Bool(false));
    }

    #[test]
    fn float_conversion_fails_softly() {
        assert_eq!(to_float(&[Value::from(vec![])], 1).unwrap(), Value::Bool(false));
        assert_eq!(to_float(&[Value::Integer(2)], 1).unwrap(), Value::Float(2.0));
    }
}
