//! Formatted error wire format.
//!
//! ```text
//! <sep><status>:<code><sep><payload>
//! ```
//!
//! `<sep>` is a single ASCII character (default `#`), `<status>` a decimal
//! HTTP-style status and `<code>` the business code. The payload is free text
//! and may itself contain the separator; only the first two separator
//! positions are structural.

use crate::code::BusinessCode;
use crate::error::{Error, Result};

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '#';

/// Assemble a formatted message.
///
/// ```
/// use bc_common::{format_wire, BusinessCode};
/// let code = BusinessCode::from_parts(7, 42, 20);
/// assert_eq!(format_wire('#', 500, &code, "failed"), "#500:007042020#failed");
/// ```
pub fn format_wire(separator: char, status: u16, code: &BusinessCode, payload: &str) -> String {
    format!("{separator}{status}:{code}{separator}{payload}")
}

/// Components recovered from a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub status: u16,
    pub code: BusinessCode,
    pub payload: String,
}

/// Split a formatted message back into status, code and payload.
pub fn parse_wire(input: &str, separator: char) -> Result<ParsedMessage> {
    let rest = input
        .strip_prefix(separator)
        .ok_or(Error::MissingLeadingSeparator { separator })?;
    let (header, payload) = rest
        .split_once(separator)
        .ok_or(Error::MissingTrailingSeparator { separator })?;
    let (status, code) = header
        .split_once(':')
        .ok_or_else(|| Error::MissingStatusDelimiter(header.to_string()))?;
    let status = status
        .parse::<u16>()
        .map_err(|_| Error::InvalidStatus(status.to_string()))?;
    if code.is_empty() {
        return Err(Error::EmptyCode);
    }
    Ok(ParsedMessage {
        status,
        code: BusinessCode::from_raw(code),
        payload: payload.to_string(),
    })
}

impl ParsedMessage {
    /// Re-assemble the message with the given separator.
    pub fn to_wire(&self, separator: char) -> String {
        format_wire(separator, self.status, &self.code, &self.payload)
    }
}
