//! Error types for OxZ session operations.
//!
//! Two families of failure live here: local precondition violations raised
//! before the codec is ever touched (bad arguments, misuse of a session's
//! state machine), and typed mappings of the codec's non-success result
//! codes. No result code is ever swallowed: everything that is not `OK` or
//! `STREAM_END` becomes one of these variants.

use crate::codec::Return;
use thiserror::Error;

/// The main error type for OxZ operations.
#[derive(Debug, Error)]
pub enum XzError {
    /// A caller-supplied argument failed validation (bad preset level,
    /// staging beyond buffer capacity, invalid option combination).
    /// Never worth retrying with the same arguments.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the offending argument.
        message: String,
    },

    /// An operation was attempted in a session state that cannot service it
    /// (operating on an ended session, overwriting unconsumed input).
    #[error("illegal state: {message}")]
    IllegalState {
        /// Description of the state violation.
        message: String,
    },

    /// The operation is recognized at the API surface but not implemented
    /// by the current encode path (sync/full flush without finish).
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// Description of the unsupported request.
        message: String,
    },

    /// The destination buffer cannot make progress. Recoverable by retrying
    /// with a larger destination.
    #[error("destination buffer too small: need at least {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Minimum number of bytes the destination must hold.
        needed: usize,
        /// Number of bytes the caller supplied.
        available: usize,
    },

    /// The codec rejected the session configuration during initialization
    /// (bad options, unsupported check, memory limits at init).
    #[error("codec initialization failed: {0}")]
    CodecInit(Return),

    /// Compressed input failed the codec's consistency checks.
    #[error("data is corrupt")]
    CorruptData,

    /// The input does not carry the expected container format.
    #[error("file format not recognized")]
    Format,

    /// The container declares an integrity check this build cannot compute.
    #[error("cannot calculate the integrity check")]
    UnsupportedCheck,

    /// The decoder working set would exceed the configured memory limit.
    /// May be retried by the caller with a larger limit.
    #[error("memory usage limit was reached")]
    MemoryLimit,

    /// Any other non-success result code surfaced by the codec step.
    #[error("codec error: {0}")]
    Codec(Return),
}

impl XzError {
    /// Map a non-success codec result code to its typed error.
    ///
    /// `Return::Ok` and `Return::StreamEnd` are success-class and must be
    /// handled before calling this; passing them here classifies them as a
    /// generic codec error, which is itself a bug in the caller.
    pub fn from_return(ret: Return) -> Self {
        match ret {
            Return::DataError => XzError::CorruptData,
            Return::FormatError => XzError::Format,
            Return::UnsupportedCheck => XzError::UnsupportedCheck,
            Return::MemlimitError => XzError::MemoryLimit,
            other => XzError::Codec(other),
        }
    }

    /// Convenience constructor for [`XzError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        XzError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`XzError::IllegalState`].
    pub fn illegal_state(message: impl Into<String>) -> Self {
        XzError::IllegalState {
            message: message.into(),
        }
    }
}

/// Result type alias for OxZ operations.
pub type Result<T> = std::result::Result<T, XzError>;
