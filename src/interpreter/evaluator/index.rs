use std::rc::Rc;

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            utils::object_key,
        },
        value::core::Value,
    },
    util::num::{clamp_slice_bound, resolve_index, usize_to_int},
};

impl Context {
    /// Evaluates `target[index]`.
    pub(crate) fn eval_index(&mut self, target: &Expr, index: &Expr, line: usize) -> EvalResult<Value> {
        let container = self.eval(target)?;
        let index = self.eval(index)?;
        index_value(&container, &index, line)
    }

    /// Evaluates `target{key}`.
    ///
    /// Objects are looked up by key; lists accept an integer key.
    pub(crate) fn eval_object_index(&mut self,
                                    target: &Expr,
                                    key: &Expr,
                                    line: usize)
                                    -> EvalResult<Value> {
        let container = self.eval(target)?;
        let key = self.eval(key)?;
        index_value(&container, &key, line)
    }

    /// Evaluates `target[start:end]`.
    pub(crate) fn eval_slice(&mut self,
                             target: &Expr,
                             start: Option<&Expr>,
                             end: Option<&Expr>,
                             line: usize)
                             -> EvalResult<Value> {
        let container = self.eval(target)?;
        let start = start.map(|e| self.eval(e).and_then(|v| v.as_int(line)))
                         .transpose()?;
        let end = end.map(|e| self.eval(e).and_then(|v| v.as_int(line)))
                     .transpose()?;
        slice_value(&container, start, end, line)
    }
}

/// Reads one element of a list, string, object or struct.
///
/// Lists and strings take integer indices, negative ones counting from the
/// end. Objects and structs take keys (see [`object_key`]).
///
/// # Errors
/// - `IndexError` for an index out of range.
/// - `KeyError` for a missing object key, `NameError` for a missing struct
///   field.
/// - `TypeError` for a value that cannot be indexed.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::index::index_value, value::core::Value};
///
/// let list = Value::from(vec![Value::Integer(1), Value::Integer(2)]);
/// assert_eq!(index_value(&list, &Value::Integer(-1), 1).unwrap(), Value::Integer(2));
/// assert_eq!(index_value(&Value::from("abc"), &Value::Integer(1), 1).unwrap(),
///            Value::from("b"));
/// ```
pub fn index_value(container: &Value, index: &Value, line: usize) -> EvalResult<Value> {
    match container {
        Value::List(items) => {
            let i = resolve_index(index.as_int(line)?, items.len(), line)?;
            Ok(items[i].clone())
        },
        Value::Str(s) => {
            let chars = s.chars().collect::<Vec<_>>();
            let i = resolve_index(index.as_int(line)?, chars.len(), line)?;
            Ok(Value::Str(chars[i].to_string()))
        },
        Value::Object(map) => {
            let key = object_key(index, line)?;
            map.get(&key)
               .cloned()
               .ok_or_else(|| RuntimeError::key(format!("Key '{key}' not defined in object"), line))
        },
        Value::Struct(s) => {
            let key = object_key(index, line)?;
            s.fields.get(&key).cloned().ok_or_else(|| {
                                           RuntimeError::name(format!("Field '{key}' not found in struct '{}'",
                                                                      s.name),
                                                              line)
                                       })
        },
        other => Err(RuntimeError::type_error(format!("'{}' object is not subscriptable",
                                                      other.type_name()),
                                              line)),
    }
}

/// Slices a list or string.
///
/// Both bounds are inclusive and may be negative. A missing start means the
/// first element, a missing end the last one. Out-of-range bounds are
/// clamped, so slicing never fails on a list or string.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::index::slice_value, value::core::Value};
///
/// let s = Value::from("abcdef");
/// assert_eq!(slice_value(&s, Some(1), Some(3), 1).unwrap(), Value::from("bcd"));
/// assert_eq!(slice_value(&s, Some(-2), None, 1).unwrap(), Value::from("ef"));
/// assert_eq!(slice_value(&s, Some(4), Some(2), 1).unwrap(), Value::from(""));
/// ```
pub fn slice_value(container: &Value,
                   start: Option<i64>,
                   end: Option<i64>,
                   line: usize)
                   -> EvalResult<Value> {
    match container {
        Value::List(items) => {
            let (from, to) = slice_bounds(start, end, items.len());
            Ok(Value::from(items[from..to].to_vec()))
        },
        Value::Str(s) => {
            let chars = s.chars().collect::<Vec<_>>();
            let (from, to) = slice_bounds(start, end, chars.len());
            Ok(Value::Str(chars[from..to].iter().collect()))
        },
        other => Err(RuntimeError::type_error(format!("'{}' object cannot be sliced",
                                                      other.type_name()),
                                              line)),
    }
}

/// Resolves inclusive slice bounds to a half-open range within `0..=len`.
fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let from = start.map_or(0, |s| clamp_slice_bound(s, len));
    let to = end.map_or(len, |e| {
                    let resolved = if e < 0 { e + usize_to_int(len) } else { e };
                    if resolved < 0 {
                        0
                    } else {
                        clamp_slice_bound(resolved.saturating_add(1), len)
                    }
                });
    (from, to.max(from))
}

/// Returns `container` with the element at the `indices` path replaced.
///
/// Each index selects into the result of the previous one: integer indices
/// into lists, keys into objects. Containers are copied on write, so other
/// bindings sharing the same list or object are unaffected. Assigning a
/// new object key is allowed at the last step only.
///
/// # Errors
/// - `IndexError` / `KeyError` for a missing intermediate element.
/// - `TypeError` for a value that does not support item assignment.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::index::assign_into, value::core::Value};
///
/// let grid = Value::from(vec![Value::from(vec![Value::Integer(0)])]);
/// let updated = assign_into(grid, &[Value::Integer(0), Value::Integer(0)], Value::Integer(7), 1)
///     .unwrap();
/// assert_eq!(updated.to_string(), "[[7]]");
/// ```
pub fn assign_into(container: Value,
                   indices: &[Value],
                   value: Value,
                   line: usize)
                   -> EvalResult<Value> {
    let Some((first, rest)) = indices.split_first() else {
        return Ok(value);
    };

    match container {
        Value::List(mut items) => {
            let i = resolve_index(first.as_int(line)?, items.len(), line)?;
            let slots = Rc::make_mut(&mut items);
            let inner = std::mem::replace(&mut slots[i], Value::Void);
            slots[i] = assign_into(inner, rest, value, line)?;
            Ok(Value::List(items))
        },
        Value::Object(mut map) => {
            let key = object_key(first, line)?;
            let entries = Rc::make_mut(&mut map);
            if rest.is_empty() {
                entries.insert(key, value);
            } else {
                let inner = entries.get(&key).cloned().ok_or_else(|| {
                                RuntimeError::key(format!("Key '{key}' not defined in object"), line)
                            })?;
                entries.insert(key, assign_into(inner, rest, value, line)?);
            }
            Ok(Value::Object(map))
        },
        other => Err(RuntimeError::type_error(format!("'{}' object does not support item assignment",
                                                      other.type_name()),
                                              line)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::from(values.iter().copied().map(Value::Integer).collect::<Vec<_>>())
    }

    #[test]
    fn slice_end_is_inclusive() {
        let list = ints(&[1, 2, 3, 4]);
        assert_eq!(slice_value(&list, Some(0), Some(1), 1).unwrap(), ints(&[1, 2]));
        assert_eq!(slice_value(&list, None, Some(-1), 1).unwrap(), ints(&[1, 2, 3, 4]));
        assert_eq!(slice_value(&list, Some(2), Some(99), 1).unwrap(), ints(&[3, 4]));
        assert_eq!(slice_value(&list, None, Some(-9), 1).unwrap(), ints(&[]));
    }

    #[test]
    fn index_errors_have_the_right_kind() {
        let list = ints(&[1]);
        assert_eq!(index_value(&list, &Value::Integer(3), 1).unwrap_err().kind_name(),
                   "IndexError");
        assert_eq!(index_value(&Value::Integer(3), &Value::Integer(0), 1).unwrap_err()
                                                                         .kind_name(),
                   "TypeError");
    }

    #[test]
    fn assignment_does_not_touch_shared_copies() {
        let original = ints(&[1, 2]);
        let updated = assign_into(original.clone(), &[Value::Integer(0)], Value::Integer(9), 1)
            .unwrap();
        assert_eq!(original, ints(&[1, 2]));
        assert_eq!(updated, ints(&[9, 2]));
    }
}
