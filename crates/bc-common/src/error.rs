//! Error types for bizcode.
//!
//! Errors carry stable numeric codes for machine parsing and a category for
//! grouping:
//! - 10-19: Wire format errors
//! - 60-69: I/O errors
//!
//! Formatting itself never fails; these errors come from parsing formatted
//! strings and from reading or writing registry files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bizcode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed formatted-error strings.
    Wire,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Wire => write!(f, "wire"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for bizcode.
#[derive(Error, Debug)]
pub enum Error {
    // Wire format errors (10-19)
    #[error("message does not start with separator '{separator}'")]
    MissingLeadingSeparator { separator: char },

    #[error("message has no closing separator '{separator}' after the code")]
    MissingTrailingSeparator { separator: char },

    #[error("status/code segment has no ':' delimiter: {0:?}")]
    MissingStatusDelimiter(String),

    #[error("invalid http status: {0:?}")]
    InvalidStatus(String),

    #[error("empty business code")]
    EmptyCode,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingLeadingSeparator { .. } => 10,
            Error::MissingTrailingSeparator { .. } => 11,
            Error::MissingStatusDelimiter(_) => 12,
            Error::InvalidStatus(_) => 13,
            Error::EmptyCode => 14,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingLeadingSeparator { .. }
            | Error::MissingTrailingSeparator { .. }
            | Error::MissingStatusDelimiter(_)
            | Error::InvalidStatus(_)
            | Error::EmptyCode => ErrorCategory::Wire,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Wire => "Not a Formatted Error",
            ErrorCategory::Io => "Registry I/O Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MissingLeadingSeparator { .. } | Error::MissingTrailingSeparator { .. } => {
                "Check that the separator matches the one the message was formatted with (--separator)."
            }
            Error::MissingStatusDelimiter(_) | Error::InvalidStatus(_) | Error::EmptyCode => {
                "Expected '<sep><status>:<code><sep><message>', e.g. '#500:076233020#failed'."
            }
            Error::Io(_) => "Check that the registry path exists and is readable.",
            Error::Json(_) => {
                "The registry file is not valid JSON. Inspect it with 'jq .' or move it aside."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_categories() {
        let wire = Error::EmptyCode;
        assert_eq!(wire.category(), ErrorCategory::Wire);
        assert!((10..20).contains(&wire.code()));

        let io = Error::Io(std::io::Error::other("disk"));
        assert_eq!(io.category(), ErrorCategory::Io);
        assert!((60..70).contains(&io.code()));
    }

    #[test]
    fn display_mentions_separator() {
        let err = Error::MissingLeadingSeparator { separator: '#' };
        assert!(err.to_string().contains("'#'"));
    }

    #[test]
    fn category_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ErrorCategory::Wire).unwrap(), "\"wire\"");
    }
}
