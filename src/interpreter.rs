/// The evaluator module executes the AST.
///
/// The evaluator walks statements and expressions, manages scopes and the
/// object model, dispatches builtin functions and methods, and raises the
/// runtime errors that scripts can catch.
///
/// # Responsibilities
/// - Evaluates expressions and executes statements.
/// - Declares and instantiates classes, structs, enums, and interfaces.
/// - Resolves imports from other script files.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// tagged with the line it started on. Comments and whitespace are skipped.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with line numbers.
/// - Handles numeric and string literals, identifiers, keywords, and
///   operators.
/// - Reports lexical errors for invalid input.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and builds
/// the statements of a program.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes.
/// - Validates grammar, reporting errors with line numbers.
pub mod parser;
/// The value module defines the runtime data types.
///
/// Declares every value a script can hold: numbers, booleans, strings, lists,
/// objects, sets, structs, functions, and class instances.
pub mod value;
