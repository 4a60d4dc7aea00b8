//! Errors that record where they were created.

use crate::frame::{self, RawFrame, StackTracer};
use std::error::Error;
use std::fmt;

/// An error carrying the stack captured at construction.
///
/// Formatting it with [`Formatter::format_traced`](crate::Formatter::format_traced)
/// attributes the business code to the construction site rather than to
/// the place the error was finally formatted.
///
/// In optimized builds a function that ends in `TracedError::new(..)` may
/// tail-call it, and its own frame is then gone from the recorded stack.
/// The code points at that function's caller instead. Binding the error
/// and passing it through [`std::hint::black_box`] before returning keeps
/// the frame.
#[derive(Debug)]
pub struct TracedError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
    frames: Vec<RawFrame>,
}

impl TracedError {
    /// New error with a message, recording the caller's stack.
    #[inline(never)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            frames: frame::capture_raw(2),
        }
    }

    /// Wrap an existing error with context, recording the caller's stack.
    #[inline(never)]
    pub fn wrap<E>(err: E, message: impl Into<String>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(err)),
            frames: frame::capture_raw(2),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(source) => Some(&**source),
            None => None,
        }
    }
}

impl StackTracer for TracedError {
    fn stack_trace(&self) -> Option<&[RawFrame]> {
        Some(&self.frames)
    }
}
