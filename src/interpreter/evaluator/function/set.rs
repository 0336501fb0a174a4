use crate::{
    interpreter::{
        evaluator::core::EvalResult,
        value::{core::Value, set_value::SetValue},
    },
    util::num::usize_to_int,
};

/// `SetLength(s)`.
pub fn length(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Integer(usize_to_int(args[0].as_set(line)?.len())))
}

/// `SetContains(s, v)`.
pub fn contains(args: &[Value], line: usize) -> EvalResult<Value> {
    let member = SetValue::try_from_value(&args[1], line)?;
    Ok(Value::Bool(args[0].as_set(line)?.contains(&member)))
}

/// `SetIsSubset(a, b)`: every member of `a` is in `b`.
pub fn is_subset(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(args[0].as_set(line)?.is_subset(args[1].as_set(line)?)))
}

/// `SetIsSuperset(a, b)`: every member of `b` is in `a`.
pub fn is_superset(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(args[0].as_set(line)?.is_superset(args[1].as_set(line)?)))
}

/// `SetUnion(a, b)`.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
///
/// use fight::interpreter::{
///     evaluator::function::set::union,
///     value::{core::Value, set_value::SetValue},
/// };
///
/// let a = Value::from(BTreeSet::from([SetValue::Integer(1)]));
/// let b = Value::from(BTreeSet::from([SetValue::Integer(2)]));
/// assert_eq!(union(&[a, b], 1).unwrap().to_string(), "set<1, 2>");
/// ```
pub fn union(args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (args[0].as_set(line)?, args[1].as_set(line)?);
    Ok(Value::from(a.union(b).cloned().collect::<std::collections::BTreeSet<_>>()))
}

/// `SetIntersection(a, b)`.
pub fn intersection(args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (args[0].as_set(line)?, args[1].as_set(line)?);
    Ok(Value::from(a.intersection(b).cloned().collect::<std::collections::BTreeSet<_>>()))
}

/// `SetDiff(a, b)`: members of `a` not in `b`.
pub fn difference(args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (args[0].as_set(line)?, args[1].as_set(line)?);
    Ok(Value::from(a.difference(b).cloned().collect::<std::collections::BTreeSet<_>>()))
}
