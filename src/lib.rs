//! # fight
//!
//! fight is an interpreter for a small dynamically typed scripting language
//! with optional type annotations, classes with interfaces and single
//! inheritance, structs, enums, exceptions, and file-based modules.
//!
//! ```
//! use fight::{config::Config, interpreter::value::core::Value, run};
//!
//! let value = run("def twice(x: int) int { return x * 2; } twice(21);",
//!                 &Config::default()).unwrap();
//! assert_eq!(value, Some(Value::Integer(42)));
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{fs, path::Path};

use tracing::debug;

use crate::{
    ast::Statement,
    config::Config,
    error::{Error, ParseError},
    interpreter::{
        evaluator::core::Context, lexer::tokenize, parser::core::parse_program, value::core::Value,
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the statement and expression trees built by the
/// parser and walked by the evaluator. Every node that can fail at runtime
/// carries its source line.
pub mod ast;
/// Interpreter configuration.
///
/// Holds the module search path and output options, and resolves the paths
/// named in `use` statements.
pub mod config;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing, or
/// evaluating code.
///
/// # Responsibilities
/// - Defines the parse error enum and the runtime error taxonomy.
/// - Attaches line numbers and messages for reporting.
/// - Maps runtime errors to the kind names `catch` clauses match on.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, and value
/// representations.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for parsing and evaluating programs.
pub mod interpreter;
/// General utilities.
///
/// Safe numeric conversions and the naming rule that decides which members
/// are public.
pub mod util;

/// Lexes and parses a whole program.
///
/// # Example
/// ```
/// use fight::parse;
///
/// assert_eq!(parse("let x = 1; x;").unwrap().len(), 2);
/// assert!(parse("let = ;").is_err());
/// ```
pub fn parse(source: &str) -> Result<Vec<Statement>, ParseError> {
    let tokens = tokenize(source).map_err(|(token, line)| ParseError::UnexpectedToken { token,
                                                                                         line })?;
    debug!(tokens = tokens.len(), "lexed source");
    parse_program(&mut tokens.iter().peekable())
}

/// Parses and runs a program with the given configuration.
///
/// # Returns
/// The value of the last expression statement that produced a value, if any.
///
/// # Errors
/// A parse error, or the runtime error that ended the program.
pub fn run(source: &str, config: &Config) -> Result<Option<Value>, Error> {
    let program = parse(source)?;
    let mut context = Context::with_config(config.clone());
    let result = context.run_program(&program)?;
    if config.auto_print
       && let Some(value) = &result
    {
        println!("{value}");
    }
    Ok(result)
}

/// Runs a program and discards its result.
///
/// When `auto_print` is set the value of the last expression statement is
/// printed. Modules resolve against the current directory.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Examples
/// ```
/// use fight::get_result;
///
/// assert!(get_result("let result = 2 + 2;", false).is_ok());
///
/// // 'x' is not defined
/// assert!(get_result("let y = x + 1;", false).is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<(), Error> {
    run(source, &Config::from_env().with_auto_print(auto_print)).map(|_| ())
}

/// Reads and runs a script file.
///
/// Modules the script imports resolve against the script's own directory
/// before the configured library directories.
///
/// # Errors
/// `Error::Io` when the file cannot be read, otherwise as for [`run`].
pub fn run_file(path: &Path, config: &Config) -> Result<Option<Value>, Error> {
    let source = fs::read_to_string(path).map_err(|source| Error::Io { path: path.display().to_string(),
                                                                        source })?;
    let base_dir = path.parent()
                       .filter(|dir| !dir.as_os_str().is_empty())
                       .unwrap_or_else(|| Path::new("."));
    debug!(path = %path.display(), "running script");
    run(&source, &config.clone().with_base_dir(base_dir))
}
