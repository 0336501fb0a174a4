use thiserror::Error;

/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code. Parse errors include syntax mistakes, unexpected tokens, invalid
/// literals, and malformed declarations detected before evaluation.
pub mod parse_error;
/// Runtime errors.
///
/// Contains the error taxonomy raised during evaluation. Each variant maps to a
/// symbolic kind that the language's own `try`/`catch` construct can match.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Any error produced while running a script.
#[derive(Debug, Error)]
pub enum Error {
    /// The source failed to lex or parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation raised an uncaught error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// The script file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The path that was being read.
        path:   String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
