//! The liblzma backend: the one true foreign-call boundary.
//!
//! Everything `unsafe` in this crate lives here. [`LzmaCodec`] owns a raw
//! `lzma_stream` plus the parameters it was initialized with, so it can be
//! reinitialized in place on [`Codec::reset`]. The session layer above never
//! sees a raw pointer; it drives the stream exclusively through the
//! [`Codec`] trait.
//!
//! Resource release is deterministic: [`Codec::end`] calls `lzma_end`
//! immediately, and `Drop` repeats the call on any exit path that skipped
//! the explicit end. `lzma_end` tolerates being called twice.

use crate::check::Check;
use crate::filter::FilterChain;
use oxz_core::codec::{Action, Codec, Return, StepOutcome, StepStatus};
use oxz_core::error::{Result, XzError};
use std::mem;

/// A zeroed raw options record, ready for the preset table to fill in.
pub(crate) fn zeroed_options() -> lzma_sys::lzma_options_lzma {
    // SAFETY: lzma_options_lzma is a plain C struct; all-zero is the
    // documented initial state liblzma expects before lzma_lzma_preset.
    unsafe { mem::zeroed() }
}

/// Fill `raw` from liblzma's preset table. Returns false when the level is
/// not supported by the linked library.
pub(crate) fn apply_preset(raw: &mut lzma_sys::lzma_options_lzma, level: u32) -> bool {
    // SAFETY: `raw` is a valid, exclusively borrowed options record.
    let failed = unsafe { lzma_sys::lzma_lzma_preset(raw, level) };
    failed == 0
}

/// How this codec was initialized; kept so reset can repeat it.
enum Init {
    Encoder { chain: FilterChain, check: Check },
    Decoder { mem_limit: u64, flags: u32 },
}

/// The real codec: an XZ stream coder backed by liblzma.
pub struct LzmaCodec {
    raw: lzma_sys::lzma_stream,
    init: Init,
    ended: bool,
}

// SAFETY: liblzma streams have no thread affinity; they only require that
// calls are not interleaved, which the owning session's lock guarantees.
unsafe impl Send for LzmaCodec {}

impl LzmaCodec {
    /// Initialize an XZ stream encoder for the given filter chain and
    /// integrity check. The chain (and the options it owns) moves into the
    /// codec so reset can replay the same configuration.
    pub fn encoder(chain: FilterChain, check: Check) -> Result<LzmaCodec> {
        let mut codec = LzmaCodec {
            // SAFETY: all-zero is the documented LZMA_STREAM_INIT state.
            raw: unsafe { mem::zeroed() },
            init: Init::Encoder { chain, check },
            ended: false,
        };
        codec.init()?;
        Ok(codec)
    }

    /// Initialize an XZ stream decoder with a working-set memory limit and
    /// a union of decoder flag bits.
    pub fn decoder(mem_limit: u64, flags: u32) -> Result<LzmaCodec> {
        let mut codec = LzmaCodec {
            // SAFETY: as above.
            raw: unsafe { mem::zeroed() },
            init: Init::Decoder { mem_limit, flags },
            ended: false,
        };
        codec.init()?;
        Ok(codec)
    }

    fn init(&mut self) -> Result<()> {
        let ret = match &self.init {
            Init::Encoder { chain, check } => {
                let filters = chain.as_raw();
                // SAFETY: `filters` is a sentinel-terminated array that
                // stays alive across the call; liblzma copies what it
                // needs before returning.
                unsafe {
                    lzma_sys::lzma_stream_encoder(
                        &mut self.raw,
                        filters.as_ptr(),
                        check.code() as lzma_sys::lzma_check,
                    )
                }
            }
            Init::Decoder { mem_limit, flags } => {
                // SAFETY: the stream is exclusively borrowed.
                unsafe { lzma_sys::lzma_stream_decoder(&mut self.raw, *mem_limit, *flags) }
            }
        };
        match Return::from_code(ret as u32) {
            Return::Ok => Ok(()),
            other => Err(XzError::CodecInit(other)),
        }
    }
}

impl Codec for LzmaCodec {
    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<StepOutcome> {
        if self.ended {
            return Err(XzError::illegal_state("codec has been ended"));
        }
        self.raw.next_in = input.as_ptr();
        self.raw.avail_in = input.len();
        self.raw.next_out = output.as_mut_ptr();
        self.raw.avail_out = output.len();
        // SAFETY: the cursors above point into live, exclusively borrowed
        // slices for the duration of the call.
        let ret = unsafe {
            lzma_sys::lzma_code(&mut self.raw, action.code() as lzma_sys::lzma_action)
        };
        let consumed = input.len() - self.raw.avail_in;
        let produced = output.len() - self.raw.avail_out;
        let status = match Return::from_code(ret as u32) {
            Return::Ok => StepStatus::Running,
            Return::StreamEnd => StepStatus::StreamEnd,
            other => return Err(XzError::from_return(other)),
        };
        Ok(StepOutcome {
            consumed,
            produced,
            status,
        })
    }

    fn reset(&mut self) -> Result<()> {
        if self.ended {
            return Err(XzError::illegal_state("codec has been ended"));
        }
        // Re-initializing a live stream reuses its allocations.
        self.init()
    }

    fn end(&mut self) {
        if !self.ended {
            // SAFETY: the stream is valid; lzma_end nulls its internal
            // state so a second call is a no-op.
            unsafe { lzma_sys::lzma_end(&mut self.raw) };
            self.ended = true;
        }
    }
}

impl Drop for LzmaCodec {
    fn drop(&mut self) {
        self.end();
    }
}
