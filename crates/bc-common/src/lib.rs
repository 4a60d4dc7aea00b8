//! Common types for bizcode.
//!
//! This crate provides the pieces shared by the formatter, the registry and
//! the CLI:
//! - `BusinessCode`, the `PPPFFFLLL` identifier attached to every error site
//! - `RegistryEntry`, the persisted code → location record
//! - The `<sep><status>:<code><sep><payload>` wire format
//! - Common error types

pub mod code;
pub mod entry;
pub mod error;
pub mod wire;

pub use code::{BusinessCode, DEFAULT_HTTP_STATUS};
pub use entry::{RegistryEntry, RegistryMap};
pub use error::{Error, ErrorCategory, Result};
pub use wire::{format_wire, parse_wire, ParsedMessage, DEFAULT_SEPARATOR};
