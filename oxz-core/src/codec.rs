//! The codec boundary: action/result codes and the step trait.
//!
//! A session never talks to the compression library directly. It drives an
//! implementation of [`Codec`], whose single interesting operation is
//! [`Codec::step`]: consume some input, produce some output, report whether
//! the stream is complete. Everything else in the session layer is plain
//! buffer bookkeeping, which keeps it testable against a fake codec.
//!
//! [`Action`] and [`Return`] mirror the liblzma wire-level codes bit for
//! bit, but both are closed Rust enumerations: conversions are exhaustive
//! matches, not lookup tables that can miss.

use crate::error::Result;
use std::fmt;

/// Per-call intent passed to the codec step.
///
/// Computed from the session's pending flush/finish intent on every call;
/// never persisted in session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep coding; neither flush nor finish requested.
    Run,
    /// Emit all pending output without resetting coder state.
    SyncFlush,
    /// Emit all pending output and reset coder state at a block boundary.
    FullFlush,
    /// No further input will arrive; drain everything and end the stream.
    Finish,
}

impl Action {
    /// Stable numeric code understood by the codec.
    pub fn code(self) -> u32 {
        match self {
            Action::Run => 0,
            Action::SyncFlush => 1,
            Action::FullFlush => 2,
            Action::Finish => 3,
        }
    }
}

/// Result codes reported by the codec step.
///
/// Only [`Return::Ok`] and [`Return::StreamEnd`] are success-class; every
/// other variant propagates as a typed [`XzError`](crate::error::XzError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Return {
    /// Operation completed successfully.
    Ok,
    /// End of stream was reached.
    StreamEnd,
    /// Input stream has no integrity check.
    NoCheck,
    /// Cannot calculate the integrity check.
    UnsupportedCheck,
    /// Integrity check type is now available.
    GetCheck,
    /// Cannot allocate memory.
    MemError,
    /// Memory usage limit was reached.
    MemlimitError,
    /// File format not recognized.
    FormatError,
    /// Invalid or unsupported options.
    OptionsError,
    /// Data is corrupt.
    DataError,
    /// No progress is possible.
    BufError,
    /// Programming error.
    ProgError,
}

impl Return {
    /// Stable numeric code reported by the codec.
    pub fn code(self) -> u32 {
        match self {
            Return::Ok => 0,
            Return::StreamEnd => 1,
            Return::NoCheck => 2,
            Return::UnsupportedCheck => 3,
            Return::GetCheck => 4,
            Return::MemError => 5,
            Return::MemlimitError => 6,
            Return::FormatError => 7,
            Return::OptionsError => 8,
            Return::DataError => 9,
            Return::BufError => 10,
            Return::ProgError => 11,
        }
    }

    /// Map a numeric code back to its variant.
    ///
    /// Codes outside the closed set classify as [`Return::ProgError`]: a
    /// codec emitting an unknown code has broken its own contract.
    pub fn from_code(code: u32) -> Return {
        match code {
            0 => Return::Ok,
            1 => Return::StreamEnd,
            2 => Return::NoCheck,
            3 => Return::UnsupportedCheck,
            4 => Return::GetCheck,
            5 => Return::MemError,
            6 => Return::MemlimitError,
            7 => Return::FormatError,
            8 => Return::OptionsError,
            9 => Return::DataError,
            10 => Return::BufError,
            11 => Return::ProgError,
            _ => Return::ProgError,
        }
    }

    /// Human-readable description of the result code.
    pub fn description(self) -> &'static str {
        match self {
            Return::Ok => "operation completed successfully",
            Return::StreamEnd => "end of stream was reached",
            Return::NoCheck => "input stream has no integrity check",
            Return::UnsupportedCheck => "cannot calculate the integrity check",
            Return::GetCheck => "integrity check type is now available",
            Return::MemError => "cannot allocate memory",
            Return::MemlimitError => "memory usage limit was reached",
            Return::FormatError => "file format not recognized",
            Return::OptionsError => "invalid or unsupported options",
            Return::DataError => "data is corrupt",
            Return::BufError => "no progress is possible",
            Return::ProgError => "programming error",
        }
    }

    /// True for the success-class codes (`Ok`, `StreamEnd`).
    pub fn is_success(self) -> bool {
        matches!(self, Return::Ok | Return::StreamEnd)
    }
}

impl fmt::Display for Return {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Completion status of a successful codec step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step succeeded but the stream is not complete; more steps (and
    /// possibly more input or output space) are needed.
    Running,
    /// The terminal signal: the stream is complete and fully drained.
    StreamEnd,
}

/// What a single codec step accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Bytes consumed from the input slice.
    pub consumed: usize,
    /// Bytes produced into the output slice.
    pub produced: usize,
    /// Whether the stream reached its end during this step.
    pub status: StepStatus,
}

/// The narrow boundary to the external compression library.
///
/// One implementation wraps the real liblzma stream; a test fake can stand
/// in for it so session logic is exercised without linking the library's
/// entropy coder into the picture. Implementations hold whatever working
/// state the underlying coder needs (dictionary, match-finder tables) and
/// own it exclusively between construction/reset and [`Codec::end`].
pub trait Codec {
    /// Run one coding step: consume from `input`, produce into `output`,
    /// honoring `action`. Advances by whole bytes only; the outcome reports
    /// exactly how far each cursor moved.
    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<StepOutcome>;

    /// Reinitialize with the same parameters the codec was constructed
    /// with, discarding all coding state.
    fn reset(&mut self) -> Result<()>;

    /// Release the working set. Safe to call more than once; after the
    /// first call the codec must not be stepped again.
    fn end(&mut self);
}
