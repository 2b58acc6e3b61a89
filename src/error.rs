//! Error types shared by every parser and serializer in the crate.
//!
//! Syntax and semantic violations (a malformed number, a table defined
//! twice, a duplicate key) are all reported through [`Error::Syntax`], which
//! carries the format, a 1-based line and column, the message and the
//! offending source line. File loading failures surface unchanged as
//! [`Error::Io`].
//!
//! ## Examples
//!
//! ```rust
//! use datafmt::{toml, Error};
//!
//! let err = toml::parse("a = 1\na = 2").unwrap_err();
//! assert_eq!(err.line(), Some(2));
//! assert!(err.to_string().contains("duplicate key `a`"));
//! ```

use std::fmt;
use thiserror::Error;

use crate::Format;

/// Represents all possible errors raised while parsing or writing data.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error while loading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax or semantic error, positioned in the source text
    #[error("{format} syntax error at line {line}, column {col}: {msg}{context}")]
    Syntax {
        format: Format,
        line: usize,
        col: usize,
        msg: String,
        context: String,
    },

    /// The value cannot be represented in the target format
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datafmt::{Error, Format};
    ///
    /// let err = Error::syntax(Format::Toml, 10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10, column 5"));
    /// ```
    pub fn syntax(format: Format, line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            format,
            line,
            col,
            msg: msg.into(),
            context: String::new(),
        }
    }

    /// Creates a syntax error that also shows the offending source line.
    pub fn syntax_with_context(
        format: Format,
        line: usize,
        col: usize,
        msg: impl Into<String>,
        source_line: &str,
    ) -> Self {
        let context = if source_line.trim().is_empty() {
            String::new()
        } else {
            format!("\n  | {}\n  | {:>width$}", source_line, "^", width = col)
        };
        Error::Syntax {
            format,
            line,
            col,
            msg: msg.into(),
            context,
        }
    }

    /// Creates an unsupported type error for values a format cannot express.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Line of a positioned error.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Column of a positioned error.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        match self {
            Error::Syntax { col, .. } => Some(*col),
            _ => None,
        }
    }

    /// Format whose parser raised the error.
    #[must_use]
    pub fn format(&self) -> Option<Format> {
        match self {
            Error::Syntax { format, .. } => Some(*format),
            _ => None,
        }
    }

    /// The bare message of a syntax error, without position or context.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Error::Syntax { msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
