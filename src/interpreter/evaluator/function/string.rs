use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, method},
        value::core::Value,
    },
    util::num::usize_to_int,
};

pub(crate) use crate::interpreter::evaluator::method::string::{capitalize, swapcase};

/// `StrLength(s)`: number of characters.
pub fn length(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Integer(usize_to_int(args[0].as_str(line)?.chars().count())))
}

/// Applies a string-to-string transformation to the only argument.
pub fn map(args: &[Value], line: usize, f: fn(&str) -> String) -> EvalResult<Value> {
    Ok(Value::from(f(args[0].as_str(line)?)))
}

/// Tests the first argument against the second with `f`.
pub fn test_pair(args: &[Value], line: usize, f: fn(&str, &str) -> bool) -> EvalResult<Value> {
    Ok(Value::Bool(f(args[0].as_str(line)?, args[1].as_str(line)?)))
}

/// True for a non-empty string whose characters all pass `f`.
pub fn test_chars(args: &[Value], line: usize, f: fn(char) -> bool) -> EvalResult<Value> {
    let s = args[0].as_str(line)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(f)))
}

/// Upper-cases the first letter of every word.
///
/// # Example
/// ```
/// use fight::interpreter::evaluator::function::string::title;
///
/// assert_eq!(title("hello wORLD-wide"), "Hello World-Wide");
/// ```
#[must_use]
pub fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// `StrConcat(a, b, ...)`.
pub fn concat(args: &[Value], line: usize) -> EvalResult<Value> {
    let mut out = String::new();
    for arg in args {
        out.push_str(arg.as_str(line)?);
    }
    Ok(Value::from(out))
}

/// `StrSplit(s[, sep])`.
pub fn split(args: &[Value], line: usize) -> EvalResult<Value> {
    method::string::split(args[0].as_str(line)?, &args[1..], line)
}

/// `StrJoin(list, sep)`.
pub fn join(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = args[0].as_list(line)?;
    Ok(Value::from(method::list::join(items, args[1].as_str(line)?)))
}

/// `StrReplace(s, old, new)`: replaces every occurrence.
pub fn replace(args: &[Value], line: usize) -> EvalResult<Value> {
    let s = args[0].as_str(line)?;
    Ok(Value::from(s.replace(args[1].as_str(line)?, args[2].as_str(line)?)))
}

/// `StrFind(s, sub)`: character position of the first match, or -1.
pub fn find(args: &[Value], line: usize) -> EvalResult<Value> {
    let s = args[0].as_str(line)?;
    Ok(Value::Integer(method::string::find(s, args[1].as_str(line)?)))
}

/// `StrCount(s, sub)`: number of non-overlapping matches.
pub fn count(args: &[Value], line: usize) -> EvalResult<Value> {
    let s = args[0].as_str(line)?;
    let sub = args[1].as_str(line)?;
    let n = if sub.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(sub).count()
    };
    Ok(Value::Integer(usize_to_int(n)))
}

/// `Char2Asc(c)`: the code point of a one-character string.
///
/// # Errors
/// `TypeError` unless the string has exactly one character.
pub fn char_to_code(args: &[Value], line: usize) -> EvalResult<Value> {
    let s = args[0].as_str(line)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Integer(i64::from(u32::from(c)))),
        _ => Err(RuntimeError::type_error(format!("Expected a single character, got '{s}'"),
                                          line)),
    }
}

/// `Asc2Char(n)`: the one-character string for a code point.
///
/// # Errors
/// `ValueError` when `n` is not a valid code point.
pub fn code_to_char(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = args[0].as_int(line)?;
    u32::try_from(n).ok()
                    .and_then(char::from_u32)
                    .map(|c| Value::from(c.to_string()))
                    .ok_or_else(|| RuntimeError::value(format!("{n} is not a valid character code"), line))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn character_codes_round_trip() {
        assert_eq!(char_to_code(&[Value::from("A")], 1).unwrap(), Value::Integer(65));
        assert_eq!(code_to_char(&[Value::Integer(97)], 1).unwrap(), Value::from("a"));
        assert!(char_to_code(&[Value::from("ab")], 1).is_err());
        assert_eq!(code_to_char(&[Value::Integer(-1)], 1).unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn count_is_non_overlapping() {
        assert_eq!(count(&[Value::from("aaaa"), Value::from("aa")], 1).unwrap(), Value::Integer(2));
    }

    #[test]
    fn split_defaults_to_whitespace() {
        let out = split(&[Value::from(" a  b ")], 1).unwrap();
        assert_eq!(out.to_string(), "[\"a\", \"b\"]");
    }
}
