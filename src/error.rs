//! Error types for PIML serialization and deserialization.
//!
//! Every failure aborts the whole encode or decode call; there is no
//! partial-result mode. The variants follow the error kinds of the format:
//!
//! - **Syntax errors**: malformed key lines, tab indentation, or a line kind
//!   that is not legal where it appears. Carry the line number and text.
//! - **Type mismatches**: scalar text that does not parse as the destination
//!   kind, numeric overflow, or `nil` for a non-nilable slot. Carry the key path.
//! - **Unsupported types**: values the encoder has no textual form for.
//! - **Invalid targets**: decode destinations that cannot hold a document.
//!
//! Unknown keys are never an error: the decoder skips them.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_piml::{from_str, Error};
//!
//! #[derive(Deserialize, Debug)]
//! struct Config { port: u16 }
//!
//! let err = from_str::<Config>("(port) thirty").unwrap_err();
//! assert!(err.is_type_mismatch());
//! assert!(err.to_string().contains("integer"));
//!
//! let err = from_str::<Config>("(port 30").unwrap_err();
//! assert!(matches!(err, Error::Syntax { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during PIML serialization/deserialization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed line, or a line kind that is illegal in its position
    #[error("Syntax error at line {line}: {msg} (line: {context:?})")]
    Syntax {
        line: usize,
        msg: String,
        context: String,
    },

    /// Scalar text that cannot be stored in the destination slot
    #[error("Type mismatch{}: expected {expected}, found {found}", key_suffix(.key))]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// Value kind with no textual representation
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Decode destination that cannot receive a document
    #[error("Invalid decode target: {0}")]
    InvalidTarget(String),

    /// Document nested deeper than the configured maximum
    #[error("Nesting depth limit of {limit} exceeded at line {line}")]
    DepthLimitExceeded { line: usize, limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn key_suffix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!(" for key `{}`", key)
    }
}

impl Error {
    /// Creates a syntax error for the given 1-based line number and its text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::Error;
    ///
    /// let err = Error::syntax(3, "missing ')'", "(age 30");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn syntax(line: usize, msg: &str, context: &str) -> Self {
        Error::Syntax {
            line,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates a type mismatch error. The key path is filled in by the decoder
    /// as the error travels up through enclosing records.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::Error;
    ///
    /// let err = Error::type_mismatch("integer", "\"thirty\"");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            key: String::new(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error for values that have no PIML form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates an invalid target error.
    pub fn invalid_target(msg: &str) -> Self {
        Error::InvalidTarget(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for [`Error::Syntax`].
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// Returns `true` for [`Error::TypeMismatch`].
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// Prefixes the key path of a type mismatch with `segment`, or tags a
    /// custom error with the field it came from.
    ///
    /// `segment` is either a key (`port`) or a list index (`[2]`).
    #[must_use]
    pub fn at(self, segment: &str) -> Self {
        match self {
            Error::TypeMismatch {
                key,
                expected,
                found,
            } => {
                let key = if key.is_empty() {
                    segment.to_string()
                } else if key.starts_with('[') {
                    format!("{}{}", segment, key)
                } else {
                    format!("{}.{}", segment, key)
                };
                Error::TypeMismatch {
                    key,
                    expected,
                    found,
                }
            }
            Error::Custom(msg) => Error::Custom(format!("{}: {}", segment, msg)),
            other => other,
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

    fn invalid_type(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(&exp.to_string(), &unexp.to_string())
    }

    fn invalid_value(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(&exp.to_string(), &unexp.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_accumulates() {
        let err = Error::type_mismatch("integer", "\"x\"").at("port").at("server");
        match err {
            Error::TypeMismatch { key, .. } => assert_eq!(key, "server.port"),
            _ => panic!("Expected type mismatch"),
        }
    }

    #[test]
    fn test_index_segments_attach_without_dot() {
        let err = Error::type_mismatch("integer", "\"x\"")
            .at("id")
            .at("[1]")
            .at("admins");
        match err {
            Error::TypeMismatch { key, .. } => assert_eq!(key, "admins[1].id"),
            _ => panic!("Expected type mismatch"),
        }
    }

    #[test]
    fn test_syntax_errors_pass_through_unchanged() {
        let err = Error::syntax(2, "tabs are not allowed", "\t(a) 1").at("outer");
        assert!(err.is_syntax());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_display_names_key() {
        let err = Error::type_mismatch("boolean", "\"yes\"").at("enabled");
        assert_eq!(
            err.to_string(),
            "Type mismatch for key `enabled`: expected boolean, found \"yes\""
        );
    }
}
