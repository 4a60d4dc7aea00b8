//! Business code identifier.
//!
//! A business code is a decimal string laid out as `PPPFFFLLL`:
//!
//! ```text
//! ┌──────────┬──────────┬──────────┐
//! │ PPP      │ FFF      │ LLL      │
//! │ crc8 of  │ crc8 of  │ source   │
//! │ package  │ function │ line     │
//! └──────────┴──────────┴──────────┘
//! ```
//!
//! Each segment is zero-padded to three digits. Checksums are at most 255 so
//! they always fit; lines of 1000 or more widen the code rather than being
//! truncated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP status used when the caller does not supply one.
pub const DEFAULT_HTTP_STATUS: u16 = 500;

/// Business code attached to a formatted error.
///
/// Treated as an opaque string everywhere except at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessCode(String);

impl BusinessCode {
    /// Code used when no frame could be resolved.
    pub const ZERO: &'static str = "000000000";

    /// Build a code from the package checksum, function checksum and line.
    ///
    /// ```
    /// use bc_common::BusinessCode;
    /// assert_eq!(BusinessCode::from_parts(7, 42, 20).as_str(), "007042020");
    /// ```
    pub fn from_parts(package_crc: u8, function_crc: u8, line: u32) -> Self {
        BusinessCode(format!("{:03}{:03}{:03}", package_crc, function_crc, line))
    }

    /// Wrap a caller-supplied code without validation.
    pub fn from_raw(code: impl Into<String>) -> Self {
        BusinessCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the standard nine-digit layout.
    pub fn is_standard(&self) -> bool {
        self.0.len() == 9 && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Split a standard code back into `(package_crc, function_crc, line)`.
    ///
    /// Returns `None` for caller-supplied codes that do not follow the
    /// layout. Widened codes (line >= 1000) are accepted.
    pub fn segments(&self) -> Option<(u8, u8, u32)> {
        let s = self.0.as_str();
        if s.len() < 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let package = s[0..3].parse().ok()?;
        let function = s[3..6].parse().ok()?;
        let line = s[6..].parse().ok()?;
        Some((package, function, line))
    }
}

impl Default for BusinessCode {
    fn default() -> Self {
        BusinessCode(Self::ZERO.to_string())
    }
}

impl fmt::Display for BusinessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BusinessCode {
    fn from(s: &str) -> Self {
        BusinessCode(s.to_string())
    }
}

impl From<String> for BusinessCode {
    fn from(s: String) -> Self {
        BusinessCode(s)
    }
}

impl AsRef<str> for BusinessCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
