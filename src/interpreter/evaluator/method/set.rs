use std::{collections::BTreeSet, rc::Rc};

use crate::{
    interpreter::{
        evaluator::{core::EvalResult, method::core::MethodOutcome, utils::check_arity},
        value::{core::Value, set_value::SetValue},
    },
    util::num::usize_to_int,
};

/// Dispatches `s->name(args)` for a set receiver.
///
/// `add` and `remove` report whether the set changed and replace the
/// receiver; `clear` empties it and yields `true`.
///
/// # Returns
/// `None` when sets have no method called `name`.
///
/// # Example
/// ```
/// use std::{collections::BTreeSet, rc::Rc};
///
/// use fight::interpreter::{
///     evaluator::method::set::call,
///     value::{core::Value, set_value::SetValue},
/// };
///
/// let set = Rc::new(BTreeSet::from([SetValue::Integer(1)]));
/// let out = call(&set, "add", &[Value::Integer(1), Value::Integer(2)], 1).unwrap().unwrap();
/// assert_eq!(out.result, Value::Bool(true));
/// assert_eq!(out.updated.unwrap().to_string(), "set<1, 2>");
/// ```
pub fn call(set: &Rc<BTreeSet<SetValue>>,
            name: &str,
            args: &[Value],
            line: usize)
            -> EvalResult<Option<MethodOutcome>> {
    let outcome = match name {
        "size" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::Integer(usize_to_int(set.len())))
        },
        "contains" => {
            check_arity(args, 1, line)?;
            let member = SetValue::try_from_value(&args[0], line)?;
            MethodOutcome::value(Value::Bool(set.contains(&member)))
        },
        "add" => {
            let mut out = set.as_ref().clone();
            let mut changed = false;
            for arg in args {
                changed |= out.insert(SetValue::try_from_value(arg, line)?);
            }
            MethodOutcome::mutated(Value::Bool(changed), Value::from(out))
        },
        "remove" => {
            check_arity(args, 1, line)?;
            let mut out = set.as_ref().clone();
            let removed = out.remove(&SetValue::try_from_value(&args[0], line)?);
            MethodOutcome::mutated(Value::Bool(removed), Value::from(out))
        },
        "clear" => {
            check_arity(args, 0, line)?;
            MethodOutcome::mutated(Value::Bool(true), Value::from(BTreeSet::new()))
        },
        "isSubset" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Bool(set.is_subset(args[0].as_set(line)?)))
        },
        "isSuperset" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Bool(set.is_superset(args[0].as_set(line)?)))
        },
        "union" => combined(set, args, line, |a, b| a.union(b).cloned().collect())?,
        "intersection" => combined(set, args, line, |a, b| a.intersection(b).cloned().collect())?,
        "difference" => combined(set, args, line, |a, b| a.difference(b).cloned().collect())?,
        _ => return Ok(None),
    };
    Ok(Some(outcome))
}

type SetOp = fn(&BTreeSet<SetValue>, &BTreeSet<SetValue>) -> BTreeSet<SetValue>;

fn combined(set: &BTreeSet<SetValue>, args: &[Value], line: usize, op: SetOp) -> EvalResult<MethodOutcome> {
    check_arity(args, 1, line)?;
    Ok(MethodOutcome::value(Value::from(op(set, args[0].as_set(line)?))))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set_of(values: &[i64]) -> Rc<BTreeSet<SetValue>> {
        Rc::new(values.iter().copied().map(SetValue::Integer).collect())
    }

    #[test]
    fn remove_reports_whether_the_member_existed() {
        let out = call(&set_of(&[1, 2]), "remove", &[Value::Integer(5)], 1).unwrap().unwrap();
        assert_eq!(out.result, Value::Bool(false));
        assert_eq!(out.updated.unwrap().to_string(), "set<1, 2>");
    }

    #[test]
    fn algebra() {
        let other = Value::Set(set_of(&[2, 3]));
        let show = |name| {
            call(&set_of(&[1, 2]), name, &[other.clone()], 1).unwrap()
                                                             .unwrap()
                                                             .result
                                                             .to_string()
        };
        assert_eq!(show("union"), "set<1, 2, 3>");
        assert_eq!(show("intersection"), "set<2>");
        assert_eq!(show("difference"), "set<1>");
        assert_eq!(show("isSubset"), "false");
    }

    #[test]
    fn unhashable_members_are_type_errors() {
        let err = call(&set_of(&[]), "add", &[Value::from(vec![])], 1).unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
