use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, method::core::MethodOutcome, utils::object_key},
        value::{core::Value, object_map::ObjectMap},
    },
};

fn owned(value: &Value, line: usize) -> EvalResult<ObjectMap> {
    Ok(value.as_object(line)?.as_ref().clone())
}

/// `ObjectKeys(d)`: keys in insertion order.
pub fn keys(args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_object(line)?;
    Ok(Value::from(map.keys().map(Value::from).collect::<Vec<_>>()))
}

/// `ObjectValues(d)`: values in insertion order.
pub fn values(args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_object(line)?;
    Ok(Value::from(map.values().cloned().collect::<Vec<_>>()))
}

/// `ObjectGet(d, key[, default])`: the value under `key`, or the default
/// (`void` when none is given).
///
/// # Example
/// ```
/// use fight::interpreter::{
///     evaluator::function::object::get,
///     value::{core::Value, object_map::ObjectMap},
/// };
///
/// let mut map = ObjectMap::new();
/// map.insert("a", Value::Integer(1));
/// let d = Value::from(map);
///
/// assert_eq!(get(&[d.clone(), Value::from("a")], 1).unwrap(), Value::Integer(1));
/// assert_eq!(get(&[d, Value::from("b"), Value::Integer(0)], 1).unwrap(), Value::Integer(0));
/// ```
pub fn get(args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_object(line)?;
    let key = object_key(&args[1], line)?;
    Ok(map.get(&key)
          .cloned()
          .unwrap_or_else(|| args.get(2).cloned().unwrap_or(Value::Void)))
}

/// `ObjectContains(d, key)`.
pub fn contains(args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_object(line)?;
    let key = object_key(&args[1], line)?;
    Ok(Value::Bool(map.contains_key(&key)))
}

/// `ObjectCopy(d)`: a shallow copy.
pub fn copy(args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_object(line)?;
    Ok(Value::from(map.as_ref().clone()))
}

/// `ObjectMerge([d1, d2, ...])`: one object holding every entry; later
/// objects win on repeated keys.
pub fn merge(args: &[Value], line: usize) -> EvalResult<Value> {
    let mut merged = ObjectMap::new();
    for item in args[0].as_list(line)?.iter() {
        for (key, value) in item.as_object(line)?.iter() {
            merged.insert(key, value.clone());
        }
    }
    Ok(Value::from(merged))
}

/// `ObjectSet(d, key, value)`.
pub fn set(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut map = owned(&args[0], line)?;
    map.insert(object_key(&args[1], line)?, args[2].clone());
    Ok(MethodOutcome::mutated(Value::Void, Value::from(map)))
}

/// `ObjectClear(d)`.
pub fn clear(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    args[0].as_object(line)?;
    Ok(MethodOutcome::mutated(Value::Void, Value::from(ObjectMap::new())))
}

/// `ObjectUpdate(d, other)`: copies every entry of `other` into `d`.
pub fn update(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut map = owned(&args[0], line)?;
    for (key, value) in args[1].as_object(line)?.iter() {
        map.insert(key, value.clone());
    }
    Ok(MethodOutcome::mutated(Value::Void, Value::from(map)))
}

/// `ObjectPop(d, key[, default])`: removes `key` and returns its value, or
/// the default (`void` when none is given) when the key is absent.
pub fn pop(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut map = owned(&args[0], line)?;
    let key = object_key(&args[1], line)?;
    Ok(match map.remove(&key) {
        Some(removed) => MethodOutcome::mutated(removed, Value::from(map)),
        None => MethodOutcome::value(args.get(2).cloned().unwrap_or(Value::Void)),
    })
}

/// `ObjHasAttribute(d, key)`.
///
/// # Errors
/// `TypeError` when `d` is not an object.
pub fn has_attribute(args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Object(map) = &args[0] else {
        return Err(RuntimeError::type_error(format!("ObjHasAttribute() needs an object, got {}",
                                                    args[0].type_name()),
                                            line));
    };
    Ok(Value::Bool(map.contains_key(&object_key(&args[1], line)?)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Value {
        let mut map = ObjectMap::new();
        map.insert("a", Value::Integer(1));
        Value::from(map)
    }

    fn updated(outcome: MethodOutcome) -> String {
        outcome.updated.map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn set_and_update_write_entries() {
        let out = set(&[sample(), Value::from("b"), Value::Integer(2)], 1).unwrap();
        assert_eq!(updated(out), "{a: 1, b: 2}");

        let mut other = ObjectMap::new();
        other.insert("a", Value::Integer(5));
        let out = update(&[sample(), Value::from(other)], 1).unwrap();
        assert_eq!(updated(out), "{a: 5}");
        assert_eq!(updated(clear(&[sample()], 1).unwrap()), "{}");
    }

    #[test]
    fn pop_falls_back_to_the_default() {
        let out = pop(&[sample(), Value::from("a")], 1).unwrap();
        assert_eq!(out.result, Value::Integer(1));
        assert_eq!(updated(out), "{}");

        let out = pop(&[sample(), Value::from("z"), Value::Integer(0)], 1).unwrap();
        assert_eq!(out.result, Value::Integer(0));
        assert!(out.updated.is_none());
    }

    #[test]
    fn has_attribute_needs_an_object() {
        assert_eq!(has_attribute(&[sample(), Value::from("a")], 1).unwrap(), Value::Bool(true));
        assert_eq!(has_attribute(&[sample(), Value::from("b")], 1).unwrap(), Value::Bool(false));
        assert_eq!(has_attribute(&[Value::Integer(1), Value::from("a")], 1).unwrap_err().kind_name(),
                   "TypeError");
    }
}
