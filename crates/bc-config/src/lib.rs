//! bizcode configuration loading and validation.
//!
//! This crate provides:
//! - `FormatterConfig`, the immutable settings a formatter is built from
//! - Config resolution (CLI → env → config file → defaults)
//! - Semantic validation
//! - Owning-package discovery from a `Cargo.toml` or `go.mod` manifest

pub mod formatter;
pub mod manifest;
pub mod resolve;
pub mod validate;

pub use formatter::{
    FormatterConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_SKIP, GLOBAL_SKIP, MAX_SKIP,
};
pub use manifest::{discover_module_name, DEFAULT_MANIFEST};
pub use resolve::{
    resolve_config, resolve_config_with, ConfigOptions, ConfigSource, ConfigSources,
    ResolvedConfig,
};
pub use validate::{validate, ConfigError, ConfigResult};
