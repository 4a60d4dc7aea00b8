//! Error types for registry persistence.

use bc_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while creating, reading or writing a registry file.
///
/// These never make formatting fail. They surface from constructors, from
/// `RegistryStore` calls, and on `FormattedError::registry_error`.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to create registry directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create registry file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start registry writer: {0}")]
    Worker(#[source] std::io::Error),
}

impl RegistryError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::CreateDir { .. } => 60,
            RegistryError::CreateFile { .. } => 61,
            RegistryError::Read { .. } => 62,
            RegistryError::Parse { .. } => 63,
            RegistryError::Serialize(_) => 64,
            RegistryError::Write { .. } => 65,
            RegistryError::Worker(_) => 66,
        }
    }

    /// True for failures raised while building a store or formatter.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            RegistryError::CreateDir { .. }
                | RegistryError::CreateFile { .. }
                | RegistryError::Worker(_)
        )
    }
}

/// Errors from building a formatter or installing the process-wide one.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("global formatter already initialized")]
    AlreadyInitialized,

    #[error("invalid formatter configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
