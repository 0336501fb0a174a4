use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::EvalResult,
            method::core::MethodOutcome,
            utils::{check_arity, object_key},
        },
        value::{core::Value, object_map::ObjectMap},
    },
    util::num::usize_to_int,
};

/// Dispatches `d->name(args)` for an object receiver.
///
/// `deleteItem`, `update` and `clear` replace the receiver. `getValue` yields
/// `void` for a missing key.
///
/// # Returns
/// `None` when objects have no method called `name`.
pub fn call(map: &Rc<ObjectMap>, name: &str, args: &[Value], line: usize) -> EvalResult<Option<MethodOutcome>> {
    let outcome = match name {
        "length" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::Integer(usize_to_int(map.len())))
        },
        "getKeys" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::from(map.keys().map(Value::from).collect::<Vec<_>>()))
        },
        "getValues" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::from(map.values().cloned().collect::<Vec<_>>()))
        },
        "getItems" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::from(items(map)))
        },
        "getValue" => {
            check_arity(args, 1, line)?;
            let key = object_key(&args[0], line)?;
            MethodOutcome::value(map.get(&key).cloned().unwrap_or(Value::Void))
        },
        "hasKey" => {
            check_arity(args, 1, line)?;
            let key = object_key(&args[0], line)?;
            MethodOutcome::value(Value::Bool(map.contains_key(&key)))
        },
        "deleteItem" => {
            check_arity(args, 1, line)?;
            let key = object_key(&args[0], line)?;
            let mut out = map.as_ref().clone();
            let removed = out.remove(&key).ok_or_else(|| {
                                              RuntimeError::key(format!("Key '{key}' not defined in object"),
                                                                line)
                                          })?;
            MethodOutcome::mutated(removed, Value::from(out))
        },
        "update" => {
            check_arity(args, 1, line)?;
            let mut out = map.as_ref().clone();
            for (key, value) in args[0].as_object(line)?.iter() {
                out.insert(key, value.clone());
            }
            MethodOutcome::mutated(Value::Void, Value::from(out))
        },
        "clear" => {
            check_arity(args, 0, line)?;
            MethodOutcome::mutated(Value::Void, Value::from(ObjectMap::new()))
        },
        _ => return Ok(None),
    };
    Ok(Some(outcome))
}

/// `[key, value]` pairs in insertion order.
pub(crate) fn items(map: &ObjectMap) -> Vec<Value> {
    map.iter()
       .map(|(key, value)| Value::from(vec![Value::from(key), value.clone()]))
       .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Rc<ObjectMap> {
        let mut map = ObjectMap::new();
        map.insert("a", Value::Integer(1));
        map.insert("b", Value::from("x"));
        Rc::new(map)
    }

    #[test]
    fn items_keep_insertion_order() {
        let out = call(&sample(), "getItems", &[], 1).unwrap().unwrap();
        assert_eq!(out.result.to_string(), "[[\"a\", 1], [\"b\", \"x\"]]");
    }

    #[test]
    fn delete_item_returns_the_value_and_shrinks_the_object() {
        let out = call(&sample(), "deleteItem", &[Value::from("a")], 1).unwrap().unwrap();
        assert_eq!(out.result, Value::Integer(1));
        assert_eq!(out.updated.unwrap().to_string(), "{b: \"x\"}");

        let err = call(&sample(), "deleteItem", &[Value::from("z")], 1).unwrap_err();
        assert_eq!(err.kind_name(), "KeyError");
    }

    #[test]
    fn update_overwrites_and_appends() {
        let mut other = ObjectMap::new();
        other.insert("b", Value::Integer(2));
        other.insert("c", Value::Integer(3));
        let out = call(&sample(), "update", &[Value::from(other)], 1).unwrap().unwrap();
        assert_eq!(out.updated.unwrap().to_string(), "{a: 1, b: 2, c: 3}");
    }

    #[test]
    fn missing_values_are_void() {
        let out = call(&sample(), "getValue", &[Value::from("z")], 1).unwrap().unwrap();
        assert_eq!(out.result, Value::Void);
    }
}
