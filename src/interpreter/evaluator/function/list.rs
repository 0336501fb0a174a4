use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, index::slice_value, method, method::core::MethodOutcome},
        value::core::Value,
    },
    util::num::{clamp_slice_bound, resolve_index, usize_to_int},
};

fn owned(value: &Value, line: usize) -> EvalResult<Vec<Value>> {
    Ok(value.as_list(line)?.as_ref().clone())
}

/// `ListLength(xs)`.
pub fn length(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Integer(usize_to_int(args[0].as_list(line)?.len())))
}

/// `ListIndex(xs, v)`: position of the first element equal to `v`.
///
/// # Errors
/// `ValueError` when no element matches.
pub fn index(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].as_list(line)?
           .iter()
           .position(|item| *item == args[1])
           .map(|pos| Value::Integer(usize_to_int(pos)))
           .ok_or_else(|| RuntimeError::value(format!("{} is not in list", args[1].repr()), line))
}

/// `ListCount(xs, v)`.
pub fn count(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = args[0].as_list(line)?.iter().filter(|item| **item == args[1]).count();
    Ok(Value::Integer(usize_to_int(n)))
}

/// `ListReverse(xs)`: a reversed copy.
pub fn reverse(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = args[0].as_list(line)?;
    Ok(Value::from(items.iter().rev().cloned().collect::<Vec<_>>()))
}

/// `ListSlice(xs, start[, end])`, with the same inclusive bounds as
/// `xs[start:end]`.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::list::slice, value::core::Value};
///
/// let xs = Value::from(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
/// assert_eq!(slice(&[xs.clone(), Value::Integer(1)], 1).unwrap().to_string(), "[2, 3]");
/// assert_eq!(slice(&[xs, Value::Integer(0), Value::Integer(1)], 1).unwrap().to_string(),
///            "[1, 2]");
/// ```
pub fn slice(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].as_list(line)?;
    let start = args[1].as_int(line)?;
    let end = args.get(2).map(|end| end.as_int(line)).transpose()?;
    slice_value(&args[0], Some(start), end, line)
}

/// `ListJoin(sep, xs)`.
pub fn join(args: &[Value], line: usize) -> EvalResult<Value> {
    let sep = args[0].as_str(line)?;
    Ok(Value::from(method::list::join(args[1].as_list(line)?, sep)))
}

/// `ListShallowCopy(xs)`.
pub fn shallow_copy(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::from(owned(&args[0], line)?))
}

/// `ListAppend(xs, v)`.
pub fn append(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = owned(&args[0], line)?;
    items.push(args[1].clone());
    Ok(MethodOutcome::mutated(Value::Void, Value::from(items)))
}

/// `ListExtend(xs, ys)`.
pub fn extend(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = owned(&args[0], line)?;
    items.extend(args[1].as_list(line)?.iter().cloned());
    Ok(MethodOutcome::mutated(Value::Void, Value::from(items)))
}

/// `ListInsert(xs, index, v)`. Indexes past either end clamp to it.
pub fn insert(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = owned(&args[0], line)?;
    let at = clamp_slice_bound(args[1].as_int(line)?, items.len());
    items.insert(at, args[2].clone());
    Ok(MethodOutcome::mutated(Value::Void, Value::from(items)))
}

/// `ListRemove(xs, v)`: drops the first element equal to `v`.
///
/// # Errors
/// `ValueError` when no element matches.
pub fn remove(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = owned(&args[0], line)?;
    let pos = items.iter()
                   .position(|item| *item == args[1])
                   .ok_or_else(|| RuntimeError::value(format!("{} is not in list", args[1].repr()), line))?;
    items.remove(pos);
    Ok(MethodOutcome::mutated(Value::Void, Value::from(items)))
}

/// `ListPop(xs[, index])`: removes and returns an element, the last one by
/// default.
///
/// # Errors
/// `IndexError` for an empty list or an index out of range.
pub fn pop(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = owned(&args[0], line)?;
    if items.is_empty() {
        return Err(RuntimeError::index("pop from empty list", line));
    }
    let index = args.get(1).map_or(Ok(-1), |i| i.as_int(line))?;
    let at = resolve_index(index, items.len(), line)?;
    let removed = items.remove(at);
    Ok(MethodOutcome::mutated(removed, Value::from(items)))
}

/// `ListClear(xs)`.
pub fn clear(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    args[0].as_list(line)?;
    Ok(MethodOutcome::mutated(Value::Void, Value::from(Vec::new())))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::from(values.iter().copied().map(Value::Integer).collect::<Vec<_>>())
    }

    fn updated(outcome: MethodOutcome) -> String {
        outcome.updated.map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn insert_clamps_like_python() {
        let xs = ints(&[1, 2, 3]);
        let at = |i: i64| updated(insert(&[xs.clone(), Value::Integer(i), Value::Integer(9)], 1).unwrap());
        assert_eq!(at(0), "[9, 1, 2, 3]");
        assert_eq!(at(-1), "[1, 2, 9, 3]");
        assert_eq!(at(10), "[1, 2, 3, 9]");
        assert_eq!(at(-10), "[9, 1, 2, 3]");
    }

    #[test]
    fn pop_returns_the_removed_element() {
        let out = pop(&[ints(&[1, 2, 3])], 1).unwrap();
        assert_eq!(out.result, Value::Integer(3));
        assert_eq!(updated(out), "[1, 2]");
        let out = pop(&[ints(&[1, 2, 3]), Value::Integer(0)], 1).unwrap();
        assert_eq!(out.result, Value::Integer(1));
        assert_eq!(pop(&[ints(&[])], 1).unwrap_err().kind_name(), "IndexError");
        assert_eq!(pop(&[ints(&[1]), Value::Integer(4)], 1).unwrap_err().kind_name(), "IndexError");
    }

    #[test]
    fn remove_takes_the_first_match() {
        assert_eq!(updated(remove(&[ints(&[1, 2, 1]), Value::Integer(1)], 1).unwrap()), "[2, 1]");
        assert_eq!(remove(&[ints(&[1]), Value::Integer(5)], 1).unwrap_err().kind_name(),
                   "ValueError");
    }

    #[test]
    fn append_extend_and_clear() {
        assert_eq!(updated(append(&[ints(&[1]), ints(&[2])], 1).unwrap()), "[1, [2]]");
        assert_eq!(updated(extend(&[ints(&[1]), ints(&[2, 3])], 1).unwrap()), "[1, 2, 3]");
        assert_eq!(updated(clear(&[ints(&[1])], 1).unwrap()), "[]");
        assert_eq!(shallow_copy(&[ints(&[4])], 1).unwrap(), ints(&[4]));
    }
}
