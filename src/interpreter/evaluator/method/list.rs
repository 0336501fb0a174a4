use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            method::core::MethodOutcome,
            utils::check_arity,
        },
        value::core::Value,
    },
    util::num::{clamp_slice_bound, resolve_index, usize_to_int},
};

impl Context {
    /// Dispatches `xs->name(args)` for a list receiver.
    ///
    /// Mutating methods return `void`, except `pop` and `removeAt` which
    /// return the element they took out. `filter` and `map` call their
    /// function argument once per element, in order.
    ///
    /// # Returns
    /// `None` when lists have no method called `name`.
    pub(crate) fn call_list_method(&mut self,
                                   items: &Rc<Vec<Value>>,
                                   name: &str,
                                   args: Vec<Value>,
                                   line: usize)
                                   -> EvalResult<Option<MethodOutcome>> {
        let outcome = match name {
            "length" => {
                check_arity(&args, 0, line)?;
                MethodOutcome::value(Value::Integer(usize_to_int(items.len())))
            },
            "isEmpty" => {
                check_arity(&args, 0, line)?;
                MethodOutcome::value(Value::Bool(items.is_empty()))
            },
            "append" => {
                at_least(&args, 1, name, line)?;
                let mut out = items.as_ref().clone();
                out.extend(args);
                MethodOutcome::mutated(Value::Void, Value::from(out))
            },
            "insert" => {
                at_least(&args, 2, name, line)?;
                let mut args = args.into_iter();
                let index = args.next().unwrap_or(Value::Void).as_int(line)?;
                let at = clamp_slice_bound(index, items.len());
                let mut out = items.as_ref().clone();
                out.splice(at..at, args);
                MethodOutcome::mutated(Value::Void, Value::from(out))
            },
            "remove" => {
                at_least(&args, 1, name, line)?;
                let mut out = items.as_ref().clone();
                for value in &args {
                    let Some(pos) = out.iter().position(|item| item == value) else {
                        return Err(RuntimeError::value(format!("{} not in list", value.repr()), line));
                    };
                    out.remove(pos);
                }
                MethodOutcome::mutated(Value::Void, Value::from(out))
            },
            "removeAt" => {
                check_arity(&args, 1, line)?;
                let index = resolve_index(args[0].as_int(line)?, items.len(), line)?;
                let mut out = items.as_ref().clone();
                let removed = out.remove(index);
                MethodOutcome::mutated(removed, Value::from(out))
            },
            "pop" => {
                check_arity(&args, 0, line)?;
                let mut out = items.as_ref().clone();
                let last = out.pop()
                              .ok_or_else(|| RuntimeError::index("pop from empty list", line))?;
                MethodOutcome::mutated(last, Value::from(out))
            },
            "setAt" => {
                check_arity(&args, 2, line)?;
                let index = resolve_index(args[0].as_int(line)?, items.len(), line)?;
                let mut out = items.as_ref().clone();
                out[index] = args[1].clone();
                MethodOutcome::mutated(Value::Void, Value::from(out))
            },
            "reverse" => {
                check_arity(&args, 0, line)?;
                let out = items.iter().rev().cloned().collect::<Vec<_>>();
                MethodOutcome::mutated(Value::Void, Value::from(out))
            },
            "clear" => {
                check_arity(&args, 0, line)?;
                MethodOutcome::mutated(Value::Void, Value::from(Vec::new()))
            },
            "indexOf" => {
                check_arity(&args, 1, line)?;
                let pos = items.iter()
                               .position(|item| *item == args[0])
                               .map_or(-1, usize_to_int);
                MethodOutcome::value(Value::Integer(pos))
            },
            "count" => {
                check_arity(&args, 1, line)?;
                let n = items.iter().filter(|item| **item == args[0]).count();
                MethodOutcome::value(Value::Integer(usize_to_int(n)))
            },
            "has" => {
                check_arity(&args, 1, line)?;
                MethodOutcome::value(Value::Bool(items.contains(&args[0])))
            },
            "join" => {
                check_arity(&args, 1, line)?;
                MethodOutcome::value(Value::from(join(items, args[0].as_str(line)?)))
            },
            "combine" => {
                let sep = match args.as_slice() {
                    [] => "",
                    [sep] => sep.as_str(line)?,
                    _ => return Err(RuntimeError::type_error("combine() takes at most 1 argument", line)),
                };
                MethodOutcome::value(Value::from(join(items, sep)))
            },
            "filter" => {
                check_arity(&args, 1, line)?;
                let mut out = Vec::new();
                for item in items.iter() {
                    if self.call_value(&args[0], vec![item.clone()], Vec::new(), line)?
                           .is_truthy()
                    {
                        out.push(item.clone());
                    }
                }
                MethodOutcome::value(Value::from(out))
            },
            "map" => {
                check_arity(&args, 1, line)?;
                let out = items.iter()
                               .map(|item| self.call_value(&args[0], vec![item.clone()], Vec::new(), line))
                               .collect::<EvalResult<Vec<_>>>()?;
                MethodOutcome::value(Value::from(out))
            },
            _ => return Ok(None),
        };
        Ok(Some(outcome))
    }
}

/// Joins the display forms of `items` with `sep`.
pub(crate) fn join(items: &[Value], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

fn at_least(args: &[Value], min: usize, name: &str, line: usize) -> EvalResult<()> {
    if args.len() >= min {
        return Ok(());
    }
    Err(RuntimeError::type_error(format!("{name}() takes at least {min} argument(s), got {}",
                                         args.len()),
                                 line))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_program,
        value::core::Value,
    };

    fn run(source: &str) -> EvalResult<Option<Value>> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        Context::new().run_program(&program)
    }

    fn shown(source: &str) -> String {
        run(source).unwrap().unwrap().to_string()
    }

    #[test]
    fn insertion_and_removal() {
        assert_eq!(shown("let xs = [1, 4]; xs->insert(1, 2, 3); xs;"), "[1, 2, 3, 4]");
        assert_eq!(shown("let xs = [1, 2, 1]; xs->remove(1); xs;"), "[2, 1]");
        assert_eq!(shown("let xs = [1, 2, 3]; let r = xs->removeAt(-1); [r, xs];"), "[3, [1, 2]]");
        assert_eq!(run("let xs = [1]; xs->remove(5);").unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn pop_takes_the_last_element() {
        assert_eq!(shown("let xs = [1, 2]; let last = xs->pop(); [last, xs];"), "[2, [1]]");
        assert_eq!(run("let xs = []; xs->pop();").unwrap_err().kind_name(), "IndexError");
    }

    #[test]
    fn searching() {
        assert_eq!(run("[1, 2, 2]->count(2);").unwrap(), Some(Value::Integer(2)));
        assert_eq!(run("[1, 2]->indexOf(9);").unwrap(), Some(Value::Integer(-1)));
        assert_eq!(run("[1, 2]->has(2);").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn filter_and_map_call_the_function() {
        assert_eq!(shown("[1, 2, 3, 4]->filter(lambda x: x % 2 == 0);"), "[2, 4]");
        assert_eq!(shown("def sq(x) { return x * x; } [1, 2, 3]->map(sq);"), "[1, 4, 9]");
    }

    #[test]
    fn join_uses_display_forms() {
        assert_eq!(run("[\"a\", 1, 2.5]->join(\"-\");").unwrap(), Some(Value::from("a-1-2.5")));
        assert_eq!(run("[1, 2]->combine();").unwrap(), Some(Value::from("12")));
    }
}
