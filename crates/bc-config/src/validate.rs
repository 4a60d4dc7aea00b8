//! Configuration errors and semantic validation.

use crate::formatter::{FormatterConfig, MAX_SKIP};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no module name found in {0}")]
    MissingModuleName(PathBuf),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Io { .. } => 60,
            ConfigError::Parse { .. } => 61,
            ConfigError::MissingModuleName(_) => 62,
            ConfigError::InvalidValue { .. } => 65,
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a formatter configuration semantically.
pub fn validate(config: &FormatterConfig) -> ConfigResult<()> {
    validate_separator(config.separator)?;

    if config.skip > MAX_SKIP {
        return Err(ConfigError::invalid(
            "skip",
            format!("{} exceeds the maximum of {}", config.skip, MAX_SKIP),
        ));
    }

    if config.queue_capacity == 0 {
        return Err(ConfigError::invalid(
            "queue_capacity",
            "must be at least 1",
        ));
    }

    if let Some(name) = &config.package_name {
        if name.trim().is_empty() {
            return Err(ConfigError::invalid("package_name", "must not be blank"));
        }
    }

    Ok(())
}

/// The separator must be a single ASCII character that cannot appear in the
/// `<status>:<code>` header.
pub fn validate_separator(separator: char) -> ConfigResult<()> {
    if !separator.is_ascii() {
        return Err(ConfigError::invalid(
            "separator",
            format!("{separator:?} is not ASCII"),
        ));
    }
    if separator.is_ascii_digit() || separator == ':' {
        return Err(ConfigError::invalid(
            "separator",
            format!("{separator:?} collides with the status/code header"),
        ));
    }
    if separator.is_ascii_control() {
        return Err(ConfigError::invalid(
            "separator",
            format!("{separator:?} is a control character"),
        ));
    }
    Ok(())
}
