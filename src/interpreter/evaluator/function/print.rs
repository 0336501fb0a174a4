use std::io::{self, Write};

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const LIGHT_GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// Joins the display forms of the arguments with single spaces.
fn joined(args: &[Value]) -> String {
    args.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn emit(text: &str, line: usize) -> EvalResult<Value> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())
       .and_then(|()| out.flush())
       .map_err(|e| RuntimeError::io(format!("Failed to write to stdout: {e}"), line))?;
    Ok(Value::Void)
}

/// Prints the arguments separated by spaces, without a trailing newline.
pub fn print(args: &[Value], line: usize) -> EvalResult<Value> {
    emit(&joined(args), line)
}

/// Prints the arguments separated by spaces, followed by a newline.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::print::println, value::core::Value};
///
/// // The function prints to stdout; the doctest only checks the result.
/// let result = println(&[Value::from("answer:"), Value::Integer(42)], 1).unwrap();
/// assert_eq!(result, Value::Void);
/// ```
pub fn println(args: &[Value], line: usize) -> EvalResult<Value> {
    emit(&format!("{}\n", joined(args)), line)
}

/// Prints a line in an ANSI colour, resetting the colour afterwards.
pub fn println_colored(color: &str, args: &[Value], line: usize) -> EvalResult<Value> {
    emit(&format!("{color}{}{RESET}\n", joined(args)), line)
}

/// Prints integers in base 16, 2 or 8 with a `0x`, `0b` or `0o` prefix.
///
/// Strings holding an integer are accepted too.
///
/// # Errors
/// `TypeError` for any other argument.
pub fn println_radix(radix: u32, args: &[Value], line: usize) -> EvalResult<Value> {
    let rendered = args.iter()
                       .map(|arg| format_radix(radix, arg, line))
                       .collect::<EvalResult<Vec<_>>>()?;
    emit(&format!("{}\n", rendered.join(" ")), line)
}

/// Renders one integer in the given radix.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::print::format_radix, value::core::Value};
///
/// assert_eq!(format_radix(16, &Value::Integer(255), 1).unwrap(), "0xff");
/// assert_eq!(format_radix(2, &Value::from("-5"), 1).unwrap(), "-0b101");
/// assert!(format_radix(8, &Value::Float(1.5), 1).is_err());
/// ```
pub fn format_radix(radix: u32, value: &Value, line: usize) -> EvalResult<String> {
    let n = match value {
        Value::Integer(n) => *n,
        Value::Str(s) => s.trim().parse::<i64>().map_err(|_| {
                                                     RuntimeError::type_error(format!("'{s}' is not an integer"),
                                                                              line)
                                                 })?,
        other => {
            return Err(RuntimeError::type_error(format!("Expected an integer, found {}",
                                                        other.type_name()),
                                                line));
        },
    };
    let sign = if n < 0 { "-" } else { "" };
    let magnitude = n.unsigned_abs();
    Ok(match radix {
        16 => format!("{sign}0x{magnitude:x}"),
        2 => format!("{sign}0b{magnitude:b}"),
        _ => format!("{sign}0o{magnitude:o}"),
    })
}

/// Raises `AssertionError` unless the argument is truthy.
pub fn assert_fn(args: &[Value], line: usize) -> EvalResult<Value> {
    if args[0].is_truthy() {
        Ok(Value::Void)
    } else {
        Err(RuntimeError::AssertionError { message: "assertion failed".to_string(),
                                           line })
    }
}
