//! # OxZ Stream
//!
//! Streaming XZ (LZMA2) encode/decode sessions.
//!
//! This crate wraps liblzma's stream coder in an incremental,
//! buffer-oriented session API:
//!
//! - [`options`]: preset resolution (levels 0–9) and LZMA2 tunables
//! - [`filter`]: filter chain assembly (optional BCJ stage + LZMA2)
//! - [`check`]: trailing integrity-check selection
//! - [`encoder`] / [`decoder`]: the session state machines
//! - [`backend`]: the liblzma FFI boundary (all `unsafe` lives here)
//!
//! ## Session protocol
//!
//! A session alternates between staging input and draining output without
//! losing or duplicating bytes:
//!
//! ```no_run
//! use oxz_stream::{Check, Encoder};
//!
//! let encoder = Encoder::with_check(9, Check::Crc64).unwrap();
//! let mut output = vec![0u8; 1 << 16];
//!
//! encoder.set_input(b"the bytes to compress").unwrap();
//! encoder.finish();
//! let mut encoded = Vec::new();
//! while !encoder.finished() {
//!     let n = encoder.encode(&mut output).unwrap();
//!     encoded.extend_from_slice(&output[..n]);
//! }
//! encoder.end();
//! ```
//!
//! Inputs larger than the staging capacity are the caller's to chunk:
//! stage a chunk, drain until [`Encoder::needs_input`] flips, stage the
//! next. Sessions are reusable across streams via `reset`, and release
//! their codec working set deterministically on `end` (or drop).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod check;
pub mod decoder;
pub mod encoder;
pub mod filter;
pub mod options;
mod session;

#[cfg(test)]
pub(crate) mod fake;

// Re-exports for convenience
pub use backend::LzmaCodec;
pub use check::Check;
pub use decoder::{Decoder, DecoderFlags};
pub use encoder::{DEFAULT_PRESET, Encoder, Flush};
pub use filter::{BcjFilter, FilterChain};
pub use options::{MatchFinder, Mode, Options};
pub use oxz_core::codec::{Action, Codec, Return, StepOutcome, StepStatus};
pub use oxz_core::error::{Result, XzError};
pub use session::DEFAULT_BUFFER_SIZE;
