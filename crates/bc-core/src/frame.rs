//! Stack capture and frame selection.
//!
//! Stacks are captured as raw instruction pointers and symbolized lazily,
//! so selection stops resolving as soon as a frame of interest is found.
//!
//! ```text
//! capture(skip) ──► [RawFrame] ──► resolve() ──► select_frame(owner)
//!                       ▲
//! StackTracer ──────────┘   (errors that recorded their own stack)
//! ```

use crate::codegen::strip_generic_args;
use std::ffi::c_void;

/// Physical frames kept per capture.
pub const MAX_FRAMES: usize = 32;

/// One symbolized stack frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Demangled, hash-free qualified name, e.g. `my_app::db::load_user`.
    pub function: String,
    /// Source line, or 0 when no debug info is available.
    pub line: u32,
}

impl Frame {
    pub fn new(function: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            line,
        }
    }
}

/// Unresolved frame: the return address recorded by the unwinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawFrame(usize);

impl RawFrame {
    pub fn from_ip(ip: usize) -> Self {
        RawFrame(ip)
    }

    pub fn ip(self) -> usize {
        self.0
    }

    /// Address inside the call instruction that produced this frame.
    ///
    /// Return addresses point one past the call; stepping back one byte
    /// keeps symbolization on the calling line.
    pub fn call_site(self) -> usize {
        self.0.saturating_sub(1)
    }

    /// Symbolize this frame. Inlined calls yield several frames,
    /// innermost first; unresolvable addresses yield none.
    pub fn symbolize(self) -> Vec<Frame> {
        let mut frames = Vec::new();
        backtrace::resolve(self.call_site() as *mut c_void, |symbol| {
            if let Some(name) = symbol.name() {
                frames.push(Frame::new(format!("{name:#}"), symbol.lineno().unwrap_or(0)));
            }
        });
        frames
    }
}

/// Errors that carry the stack recorded when they were created.
///
/// `None` means the capability is absent for this value and the formatter
/// captures a fresh stack instead.
pub trait StackTracer {
    fn stack_trace(&self) -> Option<&[RawFrame]>;
}

/// Capture the current stack.
///
/// Frame 0 is `capture` itself, frame 1 its caller, and so on; the first
/// `skip` frames are dropped.
#[inline(never)]
pub fn capture(skip: usize) -> Vec<RawFrame> {
    let anchor = capture as fn(usize) -> Vec<RawFrame> as usize;
    trace_from(anchor, skip)
}

/// Capture raw frames for storing on an error value.
///
/// Same numbering as [`capture`], with frame 0 being `capture_raw`.
#[inline(never)]
pub fn capture_raw(skip: usize) -> Vec<RawFrame> {
    let anchor = capture_raw as fn(usize) -> Vec<RawFrame> as usize;
    trace_from(anchor, skip)
}

/// Walk the stack, discard everything inside the unwinder up to the frame
/// whose function starts at `anchor`, then drop `skip` more frames.
fn trace_from(anchor: usize, skip: usize) -> Vec<RawFrame> {
    let limit = MAX_FRAMES + skip + 16;
    let mut anchor_index = None;
    let mut frames = Vec::with_capacity(limit);
    backtrace::trace(|frame| {
        if anchor_index.is_none() && frame.symbol_address() as usize == anchor {
            anchor_index = Some(frames.len());
        }
        frames.push(RawFrame::from_ip(frame.ip() as usize));
        frames.len() < limit
    });

    // Without symbol addresses the anchor cannot be located; keep the
    // whole stack and let the owner filter do the work.
    let start = anchor_index.map_or(0, |idx| idx + skip);
    frames.into_iter().skip(start).take(MAX_FRAMES).collect()
}

/// Lazily symbolize raw frames, innermost first.
pub fn resolve(raw: &[RawFrame]) -> impl Iterator<Item = Frame> + '_ {
    raw.iter().flat_map(|frame| frame.symbolize())
}

/// Pick the frame a business code is derived from.
///
/// Without an owner the first frame wins. With an owner, the first frame
/// whose qualified name contains it wins; when none does, the last frame
/// examined is used. Returns `None` only for an empty stack.
///
/// Generic arguments are ignored when matching, so a library frame such as
/// `call_once<my_app::run::{closure_env#0}, ()>` is not mistaken for an
/// application frame.
pub fn select_frame<I>(frames: I, owner: Option<&str>) -> Option<Frame>
where
    I: IntoIterator<Item = Frame>,
{
    let mut last = None;
    for frame in frames {
        let matched = match owner {
            None => true,
            Some(pkg) => strip_generic_args(&frame.function).contains(pkg),
        };
        if matched {
            return Some(frame);
        }
        last = Some(frame);
    }
    last
}
