//! Process-wide default formatter.
//!
//! Installed once, either explicitly with [`init_global`] at startup or
//! lazily on first use from the resolved configuration (`BIZCODE_*`
//! environment, config file, owning package discovered from `Cargo.toml`).
//! Immutable afterwards.
//!
//! Configurations are written as for an instance. The free functions add
//! one stack level, so one frame is added to `skip` on installation
//! ([`FormatterConfig::for_global`]).
//!
//! The global formatter is never dropped: call `global().flush()` before
//! exiting to make sure queued registry updates reach the file.

use crate::error::InitError;
use crate::formatter::{CodeOverride, FormattedError, Formatter};
use crate::frame::StackTracer;
use bc_config::{resolve_config, ConfigOptions, FormatterConfig};
use std::error::Error;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Formatter> = OnceLock::new();

/// Install the process-wide formatter.
///
/// Fails if a formatter is already installed, including one created
/// lazily by an earlier [`global`] call, or if `config` is invalid.
pub fn init_global(config: FormatterConfig) -> Result<&'static Formatter, InitError> {
    if GLOBAL.get().is_some() {
        return Err(InitError::AlreadyInitialized);
    }
    let formatter = Formatter::new(config.for_global())?;
    GLOBAL
        .set(formatter)
        .map_err(|_| InitError::AlreadyInitialized)?;
    GLOBAL.get().ok_or(InitError::AlreadyInitialized)
}

/// The process-wide formatter, built from the resolved configuration if
/// not yet installed.
pub fn global() -> &'static Formatter {
    GLOBAL.get_or_init(lazy_formatter)
}

fn lazy_formatter() -> Formatter {
    let config = match resolve_config(&ConfigOptions::default()) {
        Ok(resolved) => resolved.config,
        Err(e) => {
            tracing::warn!(error = %e, "invalid bizcode configuration, using defaults");
            FormatterConfig::default()
        }
    }
    .for_global();

    match Formatter::new(config.clone()) {
        Ok(formatter) => formatter,
        Err(e) => {
            tracing::warn!(error = %e, "global formatter will not persist codes");
            Formatter::without_registry(config)
        }
    }
}

/// [`Formatter::format_msg`] on the global formatter.
#[inline(never)]
pub fn format(msg: &str, codes: CodeOverride) -> String {
    global().format_msg(msg, codes)
}

/// [`Formatter::format_error`] on the global formatter.
#[inline(never)]
pub fn format_error<E>(err: E) -> FormattedError
where
    E: Error + Send + Sync + 'static,
{
    global().format_error(err)
}

/// [`Formatter::format_traced`] on the global formatter.
#[inline(never)]
pub fn format_traced<E>(err: E) -> FormattedError
where
    E: StackTracer + Error + Send + Sync + 'static,
{
    global().format_traced(err)
}
