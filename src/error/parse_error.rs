use thiserror::Error;

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Found an unexpected token while parsing.
    #[error("Error on line {line}: Unexpected token: {token}.")]
    UnexpectedToken {
        /// The token encountered, or a description of what was expected.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error on line {line}: Unexpected end of input.")]
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A specific token was required but another one was found.
    #[error("Error on line {line}: Expected {expected}, found {found}.")]
    Expected {
        /// What the parser was looking for.
        expected: String,
        /// What it actually found.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Tried to use a reserved identifier name.
    #[error("Error on line {line}: Identifier {name} is reserved.")]
    IdentifierReserved {
        /// The reserved identifier name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A numeric literal could not be represented.
    #[error("Error on line {line}: Literal is too large.")]
    LiteralTooLarge {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A declaration was syntactically valid but not well formed.
    #[error("Error on line {line}: {message}")]
    Other {
        /// Details about the parse error.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}
