//! Error formatter.
//!
//! Produces `<sep><status>:<code><sep><payload>` strings and errors whose
//! business code identifies the call site, recording each new code in the
//! registry.
//!
//! # Persistence
//!
//! | Entry point      | Registry update                              |
//! |------------------|----------------------------------------------|
//! | `format_msg`     | queued, caller never waits                   |
//! | `format_error`   | synchronous, failure kept on the result      |
//! | `format_traced`  | synchronous, failure kept on the result      |
//!
//! Formatting never fails: persistence problems are logged and reported
//! alongside the formatted output.

use crate::codegen::Location;
use crate::error::{InitError, RegistryError};
use crate::frame::{self, Frame, StackTracer};
use crate::registry::RegistryStore;
use crate::writer::RegistryWriter;
use bc_common::{format_wire, BusinessCode, DEFAULT_HTTP_STATUS};
use bc_config::{validate, FormatterConfig};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// How the status and business code of a message are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CodeOverride {
    /// Status 500, code derived from the call site.
    #[default]
    Derived,
    /// Caller-chosen status, code derived from the call site.
    Status(u16),
    /// Pre-assigned status and numeric code. No stack capture, no registry
    /// update. Digits never collide with the separator, so the output
    /// always parses back.
    Explicit { status: u16, code: u32 },
}

impl CodeOverride {
    pub fn explicit(status: u16, code: u32) -> Self {
        CodeOverride::Explicit { status, code }
    }

    fn status(&self) -> u16 {
        match self {
            CodeOverride::Derived => DEFAULT_HTTP_STATUS,
            CodeOverride::Status(status) | CodeOverride::Explicit { status, .. } => *status,
        }
    }
}

/// Formats messages and errors with call-site business codes.
#[derive(Debug)]
pub struct Formatter {
    config: FormatterConfig,
    store: Option<Arc<RegistryStore>>,
    writer: Option<RegistryWriter>,
}

impl Formatter {
    /// Build a formatter, opening the registry when a destination is set.
    ///
    /// The configuration is validated first; a separator that could not be
    /// parsed back out of the output is rejected.
    pub fn new(config: FormatterConfig) -> Result<Self, InitError> {
        validate(&config)?;
        let Some(path) = &config.destination else {
            return Ok(Self::without_registry(config));
        };
        let store = Arc::new(RegistryStore::open(path)?);
        let writer = RegistryWriter::spawn(Arc::clone(&store), config.queue_capacity)?;
        Ok(Self {
            config,
            store: Some(store),
            writer: Some(writer),
        })
    }

    /// Formatter that never persists, whatever the destination says.
    pub fn detached(config: FormatterConfig) -> Result<Self, InitError> {
        validate(&config)?;
        Ok(Self::without_registry(config))
    }

    /// Expects `config` to be valid.
    pub(crate) fn without_registry(config: FormatterConfig) -> Self {
        Self {
            config,
            store: None,
            writer: None,
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn registry(&self) -> Option<&RegistryStore> {
        self.store.as_deref()
    }

    /// Format a plain message.
    ///
    /// With call chains disabled, a message that already starts with the
    /// separator is returned unchanged.
    #[inline(never)]
    pub fn format_msg(&self, msg: &str, codes: CodeOverride) -> String {
        let separator = self.config.separator;
        let status = codes.status();
        if let CodeOverride::Explicit { code, .. } = codes {
            let code = BusinessCode::from_raw(code.to_string());
            return format_wire(separator, status, &code, msg);
        }
        if !self.config.with_call_chain && msg.starts_with(separator) {
            return msg.to_string();
        }

        let raw = frame::capture(self.config.skip);
        let location = self.locate(frame::resolve(&raw));
        let code = location.business_code();
        if let Some(writer) = &self.writer {
            writer.submit(location.into_entry(code.clone()));
        }
        format_wire(separator, status, &code, msg)
    }

    /// Wrap an error, deriving the code from a freshly captured stack.
    #[inline(never)]
    pub fn format_error<E>(&self, err: E) -> FormattedError
    where
        E: Error + Send + Sync + 'static,
    {
        let raw = frame::capture(self.config.skip);
        let location = self.locate(frame::resolve(&raw));
        self.wrap(Box::new(err), location)
    }

    /// Wrap an error that may carry its own stack.
    ///
    /// When the error provides frames, the code points at where the error
    /// was created; otherwise this behaves like [`Formatter::format_error`].
    #[inline(never)]
    pub fn format_traced<E>(&self, err: E) -> FormattedError
    where
        E: StackTracer + Error + Send + Sync + 'static,
    {
        let location = match err.stack_trace() {
            Some(raw) => self.locate(frame::resolve(raw)),
            None => {
                let raw = frame::capture(self.config.skip);
                self.locate(frame::resolve(&raw))
            }
        };
        self.wrap(Box::new(err), location)
    }

    /// Wait for queued registry updates to reach the file.
    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush();
        }
    }

    /// Queued registry updates dropped so far.
    pub fn dropped(&self) -> u64 {
        self.writer.as_ref().map_or(0, RegistryWriter::dropped)
    }

    fn locate<I>(&self, frames: I) -> Location
    where
        I: IntoIterator<Item = Frame>,
    {
        let frame =
            frame::select_frame(frames, self.config.package_name.as_deref()).unwrap_or_default();
        let location = Location::from_frame(&frame);
        tracing::trace!(function = %frame.function, line = frame.line, "resolved call site");
        location
    }

    fn wrap(&self, source: BoxError, location: Location) -> FormattedError {
        let code = location.business_code();
        let registry_error = self.store.as_ref().and_then(|store| {
            match store.record(location.into_entry(code.clone())) {
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(code = %code, error = %e, "registry update failed");
                    Some(e)
                }
            }
        });
        FormattedError {
            separator: self.config.separator,
            status: DEFAULT_HTTP_STATUS,
            code,
            source,
            registry_error,
        }
    }
}

/// An error wrapped with status and business code.
///
/// Displays as `<sep><status>:<code><sep><original>`; `source()` returns the
/// original error.
#[derive(Debug)]
pub struct FormattedError {
    separator: char,
    status: u16,
    code: BusinessCode,
    source: BoxError,
    registry_error: Option<RegistryError>,
}

impl FormattedError {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> &BusinessCode {
        &self.code
    }

    /// The wrapped error.
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.source
    }

    /// Unwrap back to the original error.
    pub fn into_inner(self) -> BoxError {
        self.source
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }

    /// Why the registry update for this error failed, if it did.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        self.registry_error.as_ref()
    }
}

impl fmt::Display for FormattedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.separator;
        write!(f, "{sep}{}:{}{sep}{}", self.status, self.code, self.source)
    }
}

impl Error for FormattedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}
