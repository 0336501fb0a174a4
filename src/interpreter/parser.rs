/// Parser entry points.
///
/// Contains the program and expression entry points and the shared
/// `ParseResult` alias.
pub mod core;

/// Unary, postfix, and primary expression parsing.
///
/// Handles prefix operators, literals, identifiers, calls, indexing, member
/// chains, struct paths, and the bracketed expression forms.
pub mod unary;

/// Binary operator parsing.
///
/// Implements the precedence climb for logical, relational, additive, and
/// multiplicative operators.
pub mod binary;

/// Block parsing.
///
/// Parses brace-delimited statement sequences used by every compound
/// statement.
pub mod block;

/// Utility functions for the parser.
///
/// Provides token expectations, comma-separated lists, identifiers, type
/// names, parameter lists, and call arguments.
pub mod utils;

/// Statement parsing.
///
/// Dispatches on the leading token of a statement and parses declarations,
/// assignments, and expression statements.
pub mod statement;

/// Control-flow statement parsing.
///
/// Parses `if`, `loop`, `do`/`while`, `for`, `switch`, and `try` statements.
pub mod control;

/// Declaration parsing.
///
/// Parses function, class, interface, struct, and enum declarations.
pub mod declaration;
