use thiserror::Error;

/// Represents all errors that can occur during evaluation.
///
/// Each variant corresponds to one symbolic error kind that scripts can name
/// in a `catch (Kind)` clause. The kind is recovered with
/// [`RuntimeError::kind_name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An unbound variable, function, instance, class, or field.
    #[error("Error on line {line}: NameError: {message}")]
    NameError {
        /// Details about the missing name.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A runtime type did not match the declared or required type.
    #[error("Error on line {line}: TypeError: {message}")]
    TypeError {
        /// Details about the mismatch.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A list or string index was out of range.
    #[error("Error on line {line}: IndexError: {message}")]
    IndexError {
        /// Details about the index.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An object key was missing.
    #[error("Error on line {line}: KeyError: {message}")]
    KeyError {
        /// Details about the key.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A class failed to implement a method required by an interface.
    #[error("Error on line {line}: NotImplementedError: {message}")]
    NotImplementedError {
        /// Details about the missing method.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A value was well-typed but unacceptable, such as a constant
    /// reassignment or a missing constructor overload.
    #[error("Error on line {line}: ValueError: {message}")]
    ValueError {
        /// Details about the value.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A module could not be loaded or did not export a requested name.
    #[error("Error on line {line}: ImportError: {message}")]
    ImportError {
        /// Details about the import.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Division or modulo by zero.
    #[error("Error on line {line}: ZeroDivisionError: {message}")]
    ZeroDivisionError {
        /// Details about the operation.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An `assert` call received a false condition.
    #[error("Error on line {line}: AssertionError: {message}")]
    AssertionError {
        /// Details about the assertion.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A filesystem operation failed.
    #[error("Error on line {line}: IOError: {message}")]
    IoError {
        /// Details reported by the operating system.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Any other failure, such as integer overflow.
    #[error("Error on line {line}: Exception: {message}")]
    Exception {
        /// Details about the failure.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl RuntimeError {
    /// Creates a `NameError`.
    pub fn name(message: impl Into<String>, line: usize) -> Self {
        Self::NameError { message: message.into(),
                          line }
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        Self::TypeError { message: message.into(),
                          line }
    }

    /// Creates an `IndexError`.
    pub fn index(message: impl Into<String>, line: usize) -> Self {
        Self::IndexError { message: message.into(),
                           line }
    }

    /// Creates a `KeyError`.
    pub fn key(message: impl Into<String>, line: usize) -> Self {
        Self::KeyError { message: message.into(),
                         line }
    }

    /// Creates a `NotImplementedError`.
    pub fn not_implemented(message: impl Into<String>, line: usize) -> Self {
        Self::NotImplementedError { message: message.into(),
                                    line }
    }

    /// Creates a `ValueError`.
    pub fn value(message: impl Into<String>, line: usize) -> Self {
        Self::ValueError { message: message.into(),
                           line }
    }

    /// Creates an `ImportError`.
    pub fn import(message: impl Into<String>, line: usize) -> Self {
        Self::ImportError { message: message.into(),
                            line }
    }

    /// Creates a `ZeroDivisionError`.
    pub fn zero_division(message: impl Into<String>, line: usize) -> Self {
        Self::ZeroDivisionError { message: message.into(),
                                  line }
    }

    /// Creates an `IOError`.
    pub fn io(message: impl Into<String>, line: usize) -> Self {
        Self::IoError { message: message.into(),
                        line }
    }

    /// Creates a generic `Exception`.
    pub fn exception(message: impl Into<String>, line: usize) -> Self {
        Self::Exception { message: message.into(),
                          line }
    }

    /// Returns the symbolic kind name matched by `catch (Kind)` clauses.
    ///
    /// # Example
    /// ```
    /// use fight::error::RuntimeError;
    ///
    /// let err = RuntimeError::type_error("expected int", 3);
    /// assert_eq!(err.kind_name(), "TypeError");
    /// ```
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::NameError { .. } => "NameError",
            Self::TypeError { .. } => "TypeError",
            Self::IndexError { .. } => "IndexError",
            Self::KeyError { .. } => "KeyError",
            Self::NotImplementedError { .. } => "NotImplementedError",
            Self::ValueError { .. } => "ValueError",
            Self::ImportError { .. } => "ImportError",
            Self::ZeroDivisionError { .. } => "ZeroDivisionError",
            Self::AssertionError { .. } => "AssertionError",
            Self::IoError { .. } => "IOError",
            Self::Exception { .. } => "Exception",
        }
    }

    /// The source line the error was raised on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::NameError { line, .. }
            | Self::TypeError { line, .. }
            | Self::IndexError { line, .. }
            | Self::KeyError { line, .. }
            | Self::NotImplementedError { line, .. }
            | Self::ValueError { line, .. }
            | Self::ImportError { line, .. }
            | Self::ZeroDivisionError { line, .. }
            | Self::AssertionError { line, .. }
            | Self::IoError { line, .. }
            | Self::Exception { line, .. } => *line,
        }
    }

    /// The human readable message without the line prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NameError { message, .. }
            | Self::TypeError { message, .. }
            | Self::IndexError { message, .. }
            | Self::KeyError { message, .. }
            | Self::NotImplementedError { message, .. }
            | Self::ValueError { message, .. }
            | Self::ImportError { message, .. }
            | Self::ZeroDivisionError { message, .. }
            | Self::AssertionError { message, .. }
            | Self::IoError { message, .. }
            | Self::Exception { message, .. } => message,
        }
    }

    /// Tests whether a `catch (kind)` clause handles this error.
    ///
    /// `Exception` is the root of the taxonomy and handles every error.
    #[must_use]
    pub fn is_caught_by(&self, kind: &str) -> bool {
        kind == "Exception" || kind == self.kind_name()
    }
}
