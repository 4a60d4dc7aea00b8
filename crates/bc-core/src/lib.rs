//! bizcode core: call-site business codes for errors.
//!
//! Every formatted error carries a status and a business code derived from
//! the call site that raised it:
//!
//! ```text
//! #500:076233020#connection refused
//!  │   │  │  │
//!  │   │  │  └─ line
//!  │   │  └──── crc8(function)
//!  │   └─────── crc8(package)
//!  └─────────── separator + HTTP status
//! ```
//!
//! New codes are recorded in a JSON registry so they can be mapped back to
//! package, function and line later (`bizcode lookup <code>`).
//!
//! # Example
//!
//! ```no_run
//! use bc_core::{CodeOverride, Formatter};
//! use bc_config::FormatterConfig;
//!
//! let config = FormatterConfig::default()
//!     .with_destination("errors/registry.json")
//!     .with_package_name("my_app");
//! let formatter = Formatter::new(config)?;
//!
//! let msg = formatter.format_msg("order not found", CodeOverride::Status(404));
//! assert!(msg.starts_with("#404:"));
//! # Ok::<(), bc_core::InitError>(())
//! ```

pub mod codegen;
pub mod error;
pub mod exit_codes;
pub mod formatter;
pub mod frame;
pub mod global;
pub mod logging;
pub mod registry;
pub mod traced;
pub mod writer;

pub use codegen::{business_code, split_qualified, strip_generic_args, Location};
pub use error::{InitError, RegistryError, Result};
pub use formatter::{CodeOverride, FormattedError, Formatter};
pub use frame::{Frame, RawFrame, StackTracer};
pub use global::{format, format_error, format_traced, global, init_global};
pub use registry::{RecordOutcome, RegistryStore};
pub use traced::TracedError;
pub use writer::RegistryWriter;
