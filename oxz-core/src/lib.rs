//! # OxZ Core
//!
//! Core components for the OxZ streaming XZ library.
//!
//! This crate provides the pieces shared by every session implementation:
//!
//! - [`codec`]: the narrow trait boundary to the external compression
//!   library, plus the closed action/result code enumerations
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! OxZ is a thin, layered wrapper around an external LZMA2 coder:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Benchmark harness / callers                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Stream sessions (oxz-stream)                        │
//! │     Encoder/Decoder state machines, staging buffers     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec boundary (this crate)                         │
//! │     Codec trait, Action/Return codes, errors            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: liblzma (external, via FFI)                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Session logic above L1 is pure safe Rust and can be unit-tested against
//! a fake [`Codec`] implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod error;

// Re-exports for convenience
pub use codec::{Action, Codec, Return, StepOutcome, StepStatus};
pub use error::{Result, XzError};
