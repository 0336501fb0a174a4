use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// Checks if the argument list matches the expected count.
/// Returns a `TypeError` if the argument count does not match.
///
/// ## Example
/// ```
/// use fight::interpreter::{evaluator::utils::check_arity, value::core::Value};
///
/// let arg_vals = vec![Value::Integer(2), Value::Integer(1)];
/// let line = 15;
///
/// assert!(check_arity(&arg_vals, 2, line).is_ok()); // Requires exactly 2 arguments.
/// assert!(check_arity(&arg_vals, 1, line).is_err());
/// ```
pub fn check_arity<T>(args: &[T], expected: usize, line: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::type_error(format!("Expected {expected} argument(s), got {}",
                                             args.len()),
                                     line))
    }
}

/// Replaces every `${name}` in `template` with the current value of `name`.
///
/// Names are trimmed before lookup. Unbound names and an unterminated `${`
/// are kept exactly as written.
///
/// ## Example
/// ```
/// use fight::interpreter::{evaluator::utils::interpolate, value::core::Value};
///
/// let lookup = |name: &str| (name == "n").then(|| Value::Integer(3));
///
/// assert_eq!(interpolate("n = ${n}", lookup), "n = 3");
/// assert_eq!(interpolate("m = ${m}", lookup), "m = ${m}");
/// assert_eq!(interpolate("open ${n", lookup), "open ${n");
/// ```
pub fn interpolate(template: &str, lookup: impl Fn(&str) -> Option<Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = after[..end].trim();
        match lookup(name) {
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Converts a value used as an object key into its string form.
///
/// Strings are used as they are; integers and booleans are converted to
/// their display form.
///
/// ## Errors
/// `TypeError` for every other kind of value.
///
/// ## Example
/// ```
/// use fight::interpreter::{evaluator::utils::object_key, value::core::Value};
///
/// assert_eq!(object_key(&Value::from("a"), 1).unwrap(), "a");
/// assert_eq!(object_key(&Value::Integer(7), 1).unwrap(), "7");
/// assert!(object_key(&Value::Float(1.5), 1).is_err());
/// ```
pub fn object_key(value: &Value, line: usize) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Integer(_) | Value::Bool(_) => Ok(value.to_string()),
        other => Err(RuntimeError::type_error(format!("Object keys must be strings, found {}",
                                                      other.type_name()),
                                              line)),
    }
}

/// Splits a string into one-character strings.
#[must_use]
pub fn chars_of(s: &str) -> Vec<Value> {
    s.chars().map(|c| Value::Str(c.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interpolation_handles_adjacent_and_spaced_names() {
        let lookup = |name: &str| match name {
            "a" => Some(Value::Integer(1)),
            "b" => Some(Value::from(vec![Value::from("x")])),
            _ => None,
        };
        assert_eq!(interpolate("${a}${b}", lookup), "1[\"x\"]");
        assert_eq!(interpolate("${ a }!", lookup), "1!");
        assert_eq!(interpolate("no markers", lookup), "no markers");
    }

    #[test]
    fn boolean_keys_are_lowercase() {
        assert_eq!(object_key(&Value::Bool(true), 1).unwrap(), "true");
    }
}
