//! The encoder session: a stateful XZ compression state machine.
//!
//! A session owns a fixed-capacity input staging buffer, cumulative
//! counters, and the codec working state. Callers alternate between staging
//! input ([`Encoder::set_input`], gated by [`Encoder::needs_input`]) and
//! draining output ([`Encoder::encode`]); [`Encoder::finish`] declares the
//! end of input, [`Encoder::reset`] readies the session for a new stream,
//! and [`Encoder::end`] releases the codec working set for good.
//!
//! Every operation is serialized behind one per-session lock. That guards
//! the internal invariants against torn state, not against logical misuse:
//! two threads interleaving `set_input` and `encode` on one session get
//! well-defined garbage, not corruption.

use crate::backend::LzmaCodec;
use crate::check::Check;
use crate::filter::FilterChain;
use crate::options::Options;
use crate::session::{DEFAULT_BUFFER_SIZE, SessionState, Staging};
use oxz_core::codec::{Action, Codec, StepStatus};
use oxz_core::error::{Result, XzError};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Preset level used by [`Encoder::new`].
pub const DEFAULT_PRESET: u32 = 6;

/// Flush intent accepted at the encode surface.
///
/// Only the finish path is implemented; [`Flush::Sync`] and [`Flush::Full`]
/// are recognized but rejected until true incremental flush support exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flush {
    /// No flush requested.
    #[default]
    None,
    /// Emit pending output without resetting coder state.
    Sync,
    /// Emit pending output and reset coder state at a block boundary.
    Full,
}

struct Inner<C> {
    codec: C,
    staging: Staging,
    finish: bool,
    state: SessionState,
    bytes_read: u64,
    bytes_written: u64,
}

/// A streaming XZ encoder session.
///
/// ```no_run
/// use oxz_stream::{Decoder, Encoder};
///
/// let input = b"hello world";
/// let mut output = vec![0u8; 512];
///
/// // Compress
/// let encoder = Encoder::new().unwrap();
/// encoder.set_input(input).unwrap();
/// encoder.finish();
/// let encoded = encoder.encode(&mut output).unwrap();
/// encoder.end();
///
/// // Decompress
/// let decoder = Decoder::new().unwrap();
/// decoder.set_input(&output[..encoded]).unwrap();
/// let mut result = vec![0u8; 512];
/// let decoded = decoder.decode(&mut result).unwrap();
/// assert_eq!(&result[..decoded], input);
/// decoder.end();
/// ```
pub struct Encoder<C: Codec = LzmaCodec> {
    inner: Mutex<Inner<C>>,
    capacity: usize,
}

impl Encoder<LzmaCodec> {
    /// Encoder with the default preset ([`DEFAULT_PRESET`]), no integrity
    /// check, and the default staging capacity.
    pub fn new() -> Result<Self> {
        Self::from_preset(DEFAULT_PRESET)
    }

    /// Encoder from a preset level 0–9, no integrity check.
    pub fn from_preset(preset: u32) -> Result<Self> {
        Self::with_check(preset, Check::None)
    }

    /// Encoder from a preset level and an explicit integrity check.
    pub fn with_check(preset: u32, check: Check) -> Result<Self> {
        Self::with_options(Options::from_preset(preset)?, check, DEFAULT_BUFFER_SIZE)
    }

    /// Encoder from explicit options, building the default filter chain.
    ///
    /// Fails with [`XzError::InvalidArgument`] when the options violate
    /// their invariants, or [`XzError::CodecInit`] when the codec rejects
    /// the configuration.
    pub fn with_options(options: Options, check: Check, capacity: usize) -> Result<Self> {
        Self::with_chain(FilterChain::new(options), check, capacity)
    }

    /// Encoder from a fully assembled filter chain.
    pub fn with_chain(chain: FilterChain, check: Check, capacity: usize) -> Result<Self> {
        chain.options().validate()?;
        let codec = LzmaCodec::encoder(chain, check)?;
        Ok(Self::with_codec(codec, capacity))
    }
}

impl<C: Codec> Encoder<C> {
    /// Wrap an already initialized codec. The main entry point for tests
    /// driving the session against a fake codec.
    pub fn with_codec(codec: C, capacity: usize) -> Self {
        Encoder {
            inner: Mutex::new(Inner {
                codec,
                staging: Staging::new(capacity),
                finish: false,
                state: SessionState::Ready,
                bytes_read: 0,
                bytes_written: 0,
            }),
            capacity,
        }
    }

    /// Staging buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner<C>> {
        // A poisoning panic cannot leave the byte-level bookkeeping torn;
        // keep the session usable for end()/reset().
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage the next input chunk, replacing the fully drained previous
    /// one.
    ///
    /// Fails with [`XzError::InvalidArgument`] when `src` exceeds the
    /// staging capacity (the session has no spill path; callers chunk),
    /// and [`XzError::IllegalState`] when the session is finished or
    /// ended, or when unconsumed bytes from the previous chunk would be
    /// discarded.
    pub fn set_input(&self, src: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Ended => Err(XzError::illegal_state(
                "encoder has been ended; construct a new one",
            )),
            SessionState::Finished => Err(XzError::illegal_state(
                "encoder has finished its stream; reset before staging new input",
            )),
            SessionState::Ready => inner.staging.stage(src),
        }
    }

    /// True when the staging buffer is empty or fully consumed and
    /// [`Encoder::set_input`] should be called before the next encode.
    pub fn needs_input(&self) -> bool {
        self.lock().staging.is_drained()
    }

    /// Declare that no further input will be staged. Subsequent encode
    /// calls drive the codec with the finish action until the stream ends.
    pub fn finish(&self) {
        self.lock().finish = true;
    }

    /// Compress staged input into `dst`, returning the number of bytes
    /// written.
    ///
    /// Steps the codec repeatedly until the stream ends or `dst` is
    /// exhausted. When `dst` fills first the call returns the bytes
    /// written so far with [`Encoder::finished`] still false; drain `dst`
    /// and call again. Requires a prior [`Encoder::finish`].
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        self.encode_flush(dst, Flush::None)
    }

    /// [`Encoder::encode`] with an explicit flush intent.
    ///
    /// A pending finish takes precedence over `flush`. Without one,
    /// every flush intent fails with [`XzError::Unsupported`]: sync and
    /// full flush are not implemented, and a plain run would buffer
    /// without any way to drain the tail.
    pub fn encode_flush(&self, dst: &mut [u8], flush: Flush) -> Result<usize> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Ended => {
                return Err(XzError::illegal_state(
                    "encoder has been ended; construct a new one",
                ));
            }
            SessionState::Finished => {
                return Err(XzError::illegal_state(
                    "encoder has finished its stream; reset before encoding again",
                ));
            }
            SessionState::Ready => {}
        }
        if !inner.finish {
            let message = match flush {
                Flush::None => "invoke finish() prior to calling encode()",
                Flush::Sync => "sync flush is not implemented; invoke finish() instead",
                Flush::Full => "full flush is not implemented; invoke finish() instead",
            };
            return Err(XzError::Unsupported {
                message: message.into(),
            });
        }
        if dst.is_empty() {
            return Err(XzError::BufferTooSmall {
                needed: 1,
                available: 0,
            });
        }

        let inner = &mut *inner;
        let mut written = 0;
        loop {
            let outcome =
                inner
                    .codec
                    .step(inner.staging.remaining(), &mut dst[written..], Action::Finish)?;
            inner.staging.consume(outcome.consumed);
            written += outcome.produced;
            inner.bytes_read += outcome.consumed as u64;
            inner.bytes_written += outcome.produced as u64;

            match outcome.status {
                StepStatus::StreamEnd => {
                    inner.state = SessionState::Finished;
                    return Ok(written);
                }
                StepStatus::Running if written == dst.len() => {
                    // Destination exhausted mid-stream; the caller drains
                    // dst and calls encode again.
                    return Ok(written);
                }
                StepStatus::Running => {
                    if outcome.consumed == 0 && outcome.produced == 0 {
                        return Err(XzError::Codec(oxz_core::codec::Return::BufError));
                    }
                }
            }
        }
    }

    /// True once the codec has signaled the end of the stream.
    pub fn finished(&self) -> bool {
        self.lock().state == SessionState::Finished
    }

    /// Reinitialize the codec with the same options, chain, and check;
    /// clear the staging buffer, counters, and finish intent. Valid from
    /// the ready and finished states.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == SessionState::Ended {
            return Err(XzError::illegal_state(
                "encoder has been ended; construct a new one",
            ));
        }
        inner.codec.reset()?;
        inner.staging.clear();
        inner.finish = false;
        inner.state = SessionState::Ready;
        inner.bytes_read = 0;
        inner.bytes_written = 0;
        Ok(())
    }

    /// Release the codec working set. Terminal: every subsequent
    /// operation except destruction fails with [`XzError::IllegalState`].
    /// Calling `end` again is a no-op, and dropping the session performs
    /// the same release if `end` was never called.
    pub fn end(&self) {
        let mut inner = self.lock();
        if inner.state != SessionState::Ended {
            inner.codec.end();
            inner.state = SessionState::Ended;
        }
    }

    /// Cumulative bytes consumed from staged input since construction or
    /// the last reset.
    pub fn bytes_read(&self) -> u64 {
        self.lock().bytes_read
    }

    /// Cumulative bytes produced since construction or the last reset.
    pub fn bytes_written(&self) -> u64 {
        self.lock().bytes_written
    }
}
