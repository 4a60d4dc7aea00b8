//! Exit codes for the `bizcode` CLI.
//!
//! - 0-1: Outcomes (parse the code, not the output)
//! - 10-19: User/environment errors
//! - 20-29: Internal errors

/// Exit codes for `bizcode` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded.
    Clean = 0,

    /// Looked-up code is not in the registry.
    NotFound = 1,

    /// Invalid arguments or configuration.
    ArgsError = 10,

    /// Input is not a formatted error string.
    ParseError = 11,

    /// Registry could not be read.
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::NotFound.as_i32(), 1);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::NotFound.is_success());
    }
}
