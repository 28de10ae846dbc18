//! The decoder session: the mirror image of the encoder.
//!
//! A decoder is constructed with a working-set memory limit and a union of
//! [`DecoderFlags`]; staged compressed input is drained through
//! [`Decoder::decode`] into caller buffers. Stream end is discovered
//! per-call via the codec's terminal signal; after it, the session must be
//! reset before accepting another stream. The same single per-session lock
//! discipline as the encoder applies.

use crate::backend::LzmaCodec;
use crate::session::{DEFAULT_BUFFER_SIZE, SessionState, Staging};
use oxz_core::codec::{Action, Codec, StepStatus};
use oxz_core::error::{Result, XzError};
use std::ops::BitOr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Decoder behavior flags, combined with `|`.
///
/// The numeric bits are stable codec codes. [`DecoderFlags::NONE`]
/// contributes zero bits: its union with any set equals that set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderFlags(u32);

impl DecoderFlags {
    /// No flags; plain single-stream decoding.
    pub const NONE: DecoderFlags = DecoderFlags(0);
    /// Report when the input stream carries no integrity check.
    pub const TELL_NO_CHECK: DecoderFlags = DecoderFlags(0x01);
    /// Report when the integrity check cannot be calculated.
    pub const TELL_UNSUPPORTED_CHECK: DecoderFlags = DecoderFlags(0x02);
    /// Report the check type as soon as it is known.
    pub const TELL_ANY_CHECK: DecoderFlags = DecoderFlags(0x04);
    /// Decode a concatenation of streams, with optional padding between.
    pub const CONCATENATED: DecoderFlags = DecoderFlags(0x08);

    /// The union's raw bit pattern.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is present in `self`.
    pub fn contains(self, other: DecoderFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DecoderFlags {
    type Output = DecoderFlags;

    fn bitor(self, rhs: DecoderFlags) -> DecoderFlags {
        DecoderFlags(self.0 | rhs.0)
    }
}

struct Inner<C> {
    codec: C,
    staging: Staging,
    staged_any: bool,
    state: SessionState,
    bytes_read: u64,
    bytes_written: u64,
}

/// A streaming XZ decoder session.
///
/// See [`Encoder`](crate::Encoder) for the paired usage example.
pub struct Decoder<C: Codec = LzmaCodec> {
    inner: Mutex<Inner<C>>,
    capacity: usize,
}

impl Decoder<LzmaCodec> {
    /// Decoder with no memory limit, no flags, and the default staging
    /// capacity.
    pub fn new() -> Result<Self> {
        Self::with_limit(u64::MAX, DecoderFlags::NONE, DEFAULT_BUFFER_SIZE)
    }

    /// Decoder with an explicit working-set memory limit (in bytes), flag
    /// union, and staging capacity.
    ///
    /// Fails with [`XzError::CodecInit`] when the codec rejects the
    /// configuration; a stream whose decode would exceed `mem_limit`
    /// later surfaces [`XzError::MemoryLimit`] from
    /// [`Decoder::decode`].
    pub fn with_limit(mem_limit: u64, flags: DecoderFlags, capacity: usize) -> Result<Self> {
        let codec = LzmaCodec::decoder(mem_limit, flags.bits())?;
        Ok(Self::with_codec(codec, capacity))
    }
}

impl<C: Codec> Decoder<C> {
    /// Wrap an already initialized codec; the test entry point.
    pub fn with_codec(codec: C, capacity: usize) -> Self {
        Decoder {
            inner: Mutex::new(Inner {
                codec,
                staging: Staging::new(capacity),
                staged_any: false,
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
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage the next chunk of compressed input. Same contract as the
    /// encoder: capacity-bounded, rejected after stream end or session
    /// end, and never silently discarding unconsumed bytes.
    pub fn set_input(&self, src: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Ended => Err(XzError::illegal_state(
                "decoder has been ended; construct a new one",
            )),
            SessionState::Finished => Err(XzError::illegal_state(
                "decoder has finished its stream; reset before staging new input",
            )),
            SessionState::Ready => {
                inner.staging.stage(src)?;
                inner.staged_any = true;
                Ok(())
            }
        }
    }

    /// True when the staging buffer is empty or fully consumed.
    pub fn needs_input(&self) -> bool {
        self.lock().staging.is_drained()
    }

    /// Decompress staged input into `dst`, returning the number of bytes
    /// written.
    ///
    /// Steps the codec until the stream ends or `dst` is exhausted; when
    /// `dst` fills first the call returns what was written and the next
    /// call continues draining. Input must have been staged at least once
    /// since construction or the last reset.
    pub fn decode(&self, dst: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Ended => {
                return Err(XzError::illegal_state(
                    "decoder has been ended; construct a new one",
                ));
            }
            SessionState::Finished => {
                return Err(XzError::illegal_state(
                    "decoder has finished its stream; reset before decoding again",
                ));
            }
            SessionState::Ready => {}
        }
        if !inner.staged_any {
            return Err(XzError::illegal_state(
                "no input has been staged; call set_input first",
            ));
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
                    return Ok(written);
                }
                StepStatus::Running => {
                    if outcome.consumed == 0 && outcome.produced == 0 {
                        // Needs input the caller has not staged yet.
                        return Ok(written);
                    }
                }
            }
        }
    }

    /// True once the codec has signaled the end of the stream.
    pub fn finished(&self) -> bool {
        self.lock().state == SessionState::Finished
    }

    /// Reinitialize the codec with the same memory limit and flags; clear
    /// the staging buffer and counters.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == SessionState::Ended {
            return Err(XzError::illegal_state(
                "decoder has been ended; construct a new one",
            ));
        }
        inner.codec.reset()?;
        inner.staging.clear();
        inner.staged_any = false;
        inner.state = SessionState::Ready;
        inner.bytes_read = 0;
        inner.bytes_written = 0;
        Ok(())
    }

    /// Release the codec working set; terminal, idempotent, and implied
    /// by drop.
    pub fn end(&self) {
        let mut inner = self.lock();
        if inner.state != SessionState::Ended {
            inner.codec.end();
            inner.state = SessionState::Ended;
        }
    }

    /// Cumulative compressed bytes consumed since construction or the
    /// last reset.
    pub fn bytes_read(&self) -> u64 {
        self.lock().bytes_read
    }

    /// Cumulative decompressed bytes produced since construction or the
    /// last reset.
    pub fn bytes_written(&self) -> u64 {
        self.lock().bytes_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeDecoderCodec, XZ_MAGIC};

    fn fake_decoder(capacity: usize) -> Decoder<FakeDecoderCodec> {
        Decoder::with_codec(FakeDecoderCodec::new(), capacity)
    }

    fn fake_container(payload: &[u8]) -> Vec<u8> {
        let mut data = XZ_MAGIC.to_vec();
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn flag_union_with_none_is_noop() {
        let explicit = DecoderFlags::TELL_NO_CHECK | DecoderFlags::CONCATENATED;
        let with_none =
            DecoderFlags::NONE | DecoderFlags::TELL_NO_CHECK | DecoderFlags::CONCATENATED;
        assert_eq!(explicit.bits(), 0x01 | 0x08);
        assert_eq!(explicit, with_none);
    }

    #[test]
    fn flag_bits_are_stable() {
        assert_eq!(DecoderFlags::NONE.bits(), 0x00);
        assert_eq!(DecoderFlags::TELL_NO_CHECK.bits(), 0x01);
        assert_eq!(DecoderFlags::TELL_UNSUPPORTED_CHECK.bits(), 0x02);
        assert_eq!(DecoderFlags::TELL_ANY_CHECK.bits(), 0x04);
        assert_eq!(DecoderFlags::CONCATENATED.bits(), 0x08);
    }

    #[test]
    fn decode_requires_staged_input() {
        let decoder = fake_decoder(64);
        let mut out = [0u8; 16];
        assert!(matches!(
            decoder.decode(&mut out),
            Err(XzError::IllegalState { .. })
        ));
    }

    #[test]
    fn decode_strips_container() {
        let decoder = fake_decoder(64);
        decoder.set_input(&fake_container(b"payload")).unwrap();
        let mut out = [0u8; 64];
        let written = decoder.decode(&mut out).unwrap();
        assert_eq!(&out[..written], b"payload");
        assert!(decoder.finished());
        assert_eq!(decoder.bytes_read(), 13);
        assert_eq!(decoder.bytes_written(), 7);
    }

    #[test]
    fn small_destination_resumes_across_calls() {
        let decoder = fake_decoder(64);
        decoder.set_input(&fake_container(b"0123456789")).unwrap();

        let mut collected = Vec::new();
        let mut chunk = [0u8; 3];
        while !decoder.finished() {
            let written = decoder.decode(&mut chunk).unwrap();
            collected.extend_from_slice(&chunk[..written]);
        }
        assert_eq!(&collected, b"0123456789");
    }

    #[test]
    fn corrupt_magic_is_a_format_error() {
        let decoder = fake_decoder(64);
        decoder.set_input(b"garbage input").unwrap();
        let mut out = [0u8; 16];
        assert!(matches!(decoder.decode(&mut out), Err(XzError::Format)));
    }

    #[test]
    fn reset_allows_a_second_stream() {
        let decoder = fake_decoder(64);
        decoder.set_input(&fake_container(b"first")).unwrap();
        let mut out = [0u8; 64];
        decoder.decode(&mut out).unwrap();
        assert!(decoder.finished());

        decoder.reset().unwrap();
        assert_eq!(decoder.bytes_read(), 0);
        assert!(decoder.needs_input());
        decoder.set_input(&fake_container(b"second")).unwrap();
        let written = decoder.decode(&mut out).unwrap();
        assert_eq!(&out[..written], b"second");
    }

    #[test]
    fn ended_decoder_rejects_everything() {
        let decoder = fake_decoder(64);
        decoder.end();
        let mut out = [0u8; 16];
        assert!(matches!(
            decoder.set_input(b"x"),
            Err(XzError::IllegalState { .. })
        ));
        assert!(matches!(
            decoder.decode(&mut out),
            Err(XzError::IllegalState { .. })
        ));
        assert!(matches!(decoder.reset(), Err(XzError::IllegalState { .. })));
        decoder.end();
    }
}
