//! Source markup representation and error management.

use std::{cell::RefCell, fmt};

use thiserror::Error;

/// Represents a markup document.
pub struct Source<'a> {
    /// Original markup text.
    pub content: &'a str,
    /// Accumulated errors.
    /// Only statements skipped in tolerant mode end up here, every other error is returned directly.
    pub errors: ErrorReporter,
    /// Byte offsets at which each line starts.
    line_starts: Vec<usize>,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            errors: ErrorReporter::new(),
            line_starts,
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.len() == 0
    }

    /// Returns the 1-based line containing the byte `offset`.
    ///
    /// # Example
    /// ```
    /// use wordmath_source::Source;
    /// let source = Source::new("<a>\n<b/>\n</a>");
    /// assert_eq!(source.line_at(0), 1);
    /// assert_eq!(source.line_at(4), 2);
    /// assert_eq!(source.line_at(9), 3);
    /// ```
    pub fn line_at(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Formats the ` (line N)` suffix used by every error message.
fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

/// Represents a syntax error in the markup or in the formula grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", at_line(.line))]
pub struct SyntaxError {
    message: String,
    line: Option<usize>,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `message` and 1-based source `line`.
    pub fn new(message: impl ToString, line: Option<usize>) -> Self {
        Self {
            message: message.to_string(),
            line,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

/// Every error the transpiler core can raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A construct (fraction, power, root, function call) has the wrong number of operands.
    #[error("{construct} expects {expected} operand(s) but found {found}{}", at_line(.line))]
    Arity {
        construct: String,
        expected: usize,
        found: usize,
        line: Option<usize>,
    },
    /// A recognized tag, node kind or operator that is not handled.
    #[error("not implemented: {message}{}", at_line(.line))]
    NotImplemented {
        message: String,
        line: Option<usize>,
    },
    /// A call to a function that is neither builtin nor declared.
    #[error("unknown function `{name}`{}", at_line(.line))]
    UnknownFunction { name: String, line: Option<usize> },
    /// Misuse of an internal API (e.g. descending into an exhausted cursor).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for [`Error::Syntax`].
    pub fn syntax(message: impl ToString, line: Option<usize>) -> Self {
        Error::Syntax(SyntaxError::new(message, line))
    }

    /// Shorthand for [`Error::NotImplemented`].
    pub fn not_implemented(message: impl ToString, line: Option<usize>) -> Self {
        Error::NotImplemented {
            message: message.to_string(),
            line,
        }
    }

    /// The 1-based source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax(err) => err.line(),
            Error::Arity { line, .. }
            | Error::NotImplemented { line, .. }
            | Error::UnknownFunction { line, .. } => *line,
            Error::Internal(_) => None,
        }
    }

    /// Returns the same error pointing at `line` unless it already carries one.
    pub fn or_line(self, line: Option<usize>) -> Self {
        if self.line().is_some() || line.is_none() {
            return self;
        }
        match self {
            Error::Syntax(err) => Error::syntax(err.message, line),
            Error::Arity {
                construct,
                expected,
                found,
                ..
            } => Error::Arity {
                construct,
                expected,
                found,
                line,
            },
            Error::NotImplemented { message, .. } => Error::NotImplemented { message, line },
            Error::UnknownFunction { name, .. } => Error::UnknownFunction { name, line },
            Error::Internal(message) => Error::Internal(message),
        }
    }
}

/// Manages all the errors.
pub struct ErrorReporter {
    errors: RefCell<Vec<Error>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: Error) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of every accumulated error, oldest first.
    pub fn errors(&self) -> Vec<Error> {
        self.errors.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for error in errors.iter() {
            writeln!(f, "ERROR: {}", error)?;
        }

        Ok(())
    }
}
