use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, method::core::MethodOutcome, utils::check_arity},
        value::core::Value,
    },
    util::num::{resolve_index, usize_to_int},
};

/// Dispatches `s->name(args)` for a string receiver.
///
/// Case and whitespace transformations and `concat` return the new string
/// and also replace the receiver. Every other method leaves it alone.
///
/// # Returns
/// `None` when strings have no method called `name`.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::method::string::call, value::core::Value};
///
/// let out = call("a,b", "split", &[Value::from(",")], 1).unwrap().unwrap();
/// assert_eq!(out.result.to_string(), "[\"a\", \"b\"]");
/// assert_eq!(out.updated, None);
///
/// let out = call("hi", "upper", &[], 1).unwrap().unwrap();
/// assert_eq!(out.updated, Some(Value::from("HI")));
/// ```
pub fn call(s: &str, name: &str, args: &[Value], line: usize) -> EvalResult<Option<MethodOutcome>> {
    let outcome = match name {
        "length" => {
            check_arity(args, 0, line)?;
            MethodOutcome::value(Value::Integer(usize_to_int(s.chars().count())))
        },
        "upper" => transformed(args, line, || s.to_uppercase())?,
        "lower" => transformed(args, line, || s.to_lowercase())?,
        "capitalize" => transformed(args, line, || capitalize(s))?,
        "swapcase" => transformed(args, line, || swapcase(s))?,
        "strip" => transformed(args, line, || s.trim().to_string())?,
        "concat" => {
            let mut out = s.to_string();
            for arg in args {
                out.push_str(arg.as_str(line)?);
            }
            let out = Value::from(out);
            MethodOutcome::mutated(out.clone(), out)
        },
        "split" => MethodOutcome::value(split(s, args, line)?),
        "startsWith" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Bool(s.starts_with(args[0].as_str(line)?)))
        },
        "endsWith" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Bool(s.ends_with(args[0].as_str(line)?)))
        },
        "contains" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Bool(s.contains(args[0].as_str(line)?)))
        },
        "indexOf" => {
            check_arity(args, 1, line)?;
            MethodOutcome::value(Value::Integer(find(s, args[0].as_str(line)?)))
        },
        "charAt" => {
            check_arity(args, 1, line)?;
            let chars = s.chars().collect::<Vec<_>>();
            let index = resolve_index(args[0].as_int(line)?, chars.len(), line)?;
            MethodOutcome::value(Value::from(chars[index].to_string()))
        },
        "replace" => {
            check_arity(args, 2, line)?;
            let replaced = s.replace(args[0].as_str(line)?, args[1].as_str(line)?);
            MethodOutcome::value(Value::from(replaced))
        },
        "isAlpha" => predicate(args, line, !s.is_empty() && s.chars().all(char::is_alphabetic))?,
        "isDigit" => predicate(args, line, !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))?,
        "isAlphaNum" => predicate(args, line, !s.is_empty() && s.chars().all(char::is_alphanumeric))?,
        "isSpace" => predicate(args, line, !s.is_empty() && s.chars().all(char::is_whitespace))?,
        "isLower" => predicate(args, line, cased_all(s, char::is_lowercase))?,
        "isUpper" => predicate(args, line, cased_all(s, char::is_uppercase))?,
        _ => return Ok(None),
    };
    Ok(Some(outcome))
}

fn transformed(args: &[Value], line: usize, f: impl FnOnce() -> String) -> EvalResult<MethodOutcome> {
    check_arity(args, 0, line)?;
    let out = Value::from(f());
    Ok(MethodOutcome::mutated(out.clone(), out))
}

fn predicate(args: &[Value], line: usize, holds: bool) -> EvalResult<MethodOutcome> {
    check_arity(args, 0, line)?;
    Ok(MethodOutcome::value(Value::Bool(holds)))
}

/// Splits on `sep`, or on runs of whitespace when no separator is given.
///
/// # Errors
/// `ValueError` for an empty separator.
pub(crate) fn split(s: &str, args: &[Value], line: usize) -> EvalResult<Value> {
    let parts: Vec<Value> = match args {
        [] => s.split_whitespace().map(Value::from).collect(),
        [sep] => {
            let sep = sep.as_str(line)?;
            if sep.is_empty() {
                return Err(RuntimeError::value("empty separator", line));
            }
            s.split(sep).map(Value::from).collect()
        },
        _ => {
            return Err(RuntimeError::type_error(format!("split() takes at most 1 argument, got {}",
                                                        args.len()),
                                                line));
        },
    };
    Ok(Value::from(parts))
}

/// Character position of the first occurrence of `needle`, or -1.
pub(crate) fn find(s: &str, needle: &str) -> i64 {
    s.find(needle)
     .map_or(-1, |byte| usize_to_int(s[..byte].chars().count()))
}

/// Upper-cases the first character and lower-cases the rest.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub(crate) fn swapcase(s: &str) -> String {
    s.chars()
     .flat_map(|c| {
         if c.is_uppercase() {
             c.to_lowercase().collect::<Vec<_>>()
         } else {
             c.to_uppercase().collect::<Vec<_>>()
         }
     })
     .collect()
}

/// True when `s` has at least one cased character and all of them pass
/// `test`.
fn cased_all(s: &str, test: fn(char) -> bool) -> bool {
    let mut cased = s.chars().filter(|c| c.is_lowercase() || c.is_uppercase()).peekable();
    cased.peek().is_some() && cased.all(test)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn result(s: &str, name: &str, args: &[Value]) -> Value {
        call(s, name, args, 1).unwrap().unwrap().result
    }

    #[test]
    fn index_of_counts_characters() {
        assert_eq!(result("héllo", "indexOf", &[Value::from("l")]), Value::Integer(2));
        assert_eq!(result("abc", "indexOf", &[Value::from("z")]), Value::Integer(-1));
    }

    #[test]
    fn char_at_accepts_negative_indices() {
        assert_eq!(result("abc", "charAt", &[Value::Integer(-1)]), Value::from("c"));
        assert_eq!(call("abc", "charAt", &[Value::Integer(3)], 1).unwrap_err().kind_name(),
                   "IndexError");
    }

    #[test]
    fn case_predicates_need_cased_characters() {
        assert_eq!(result("abc1", "isLower", &[]), Value::Bool(true));
        assert_eq!(result("123", "isLower", &[]), Value::Bool(false));
        assert_eq!(result("", "isAlpha", &[]), Value::Bool(false));
    }

    #[test]
    fn transformations_replace_the_receiver() {
        let out = call("hello World", "swapcase", &[], 1).unwrap().unwrap();
        assert_eq!(out.updated, Some(Value::from("HELLO wORLD")));
        assert_eq!(result("hELLO", "capitalize", &[]), Value::from("Hello"));
    }

    #[test]
    fn unknown_methods_are_not_dispatched() {
        assert!(call("x", "frobnicate", &[], 1).unwrap().is_none());
    }
}
