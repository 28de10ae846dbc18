//! Fake codecs for exercising session logic without the real library.
//!
//! The fakes honor the step contract — byte-accurate cursor advancement,
//! `StreamEnd` only on a finish action with everything consumed — while
//! doing no actual compression: the "container" is the XZ magic followed by
//! the raw payload. That is enough to drive every session state transition.

use oxz_core::codec::{Action, Codec, StepOutcome, StepStatus};
use oxz_core::error::{Result, XzError};

/// The XZ container magic header.
pub const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Encoder fake: emits the magic, then copies input verbatim.
pub struct FakeEncoderCodec {
    header_sent: usize,
    ended: bool,
}

impl FakeEncoderCodec {
    pub fn new() -> Self {
        FakeEncoderCodec {
            header_sent: 0,
            ended: false,
        }
    }
}

impl Codec for FakeEncoderCodec {
    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<StepOutcome> {
        if self.ended {
            return Err(XzError::illegal_state("fake codec ended"));
        }
        let mut produced = 0;
        while self.header_sent < XZ_MAGIC.len() && produced < output.len() {
            output[produced] = XZ_MAGIC[self.header_sent];
            produced += 1;
            self.header_sent += 1;
        }
        let n = input.len().min(output.len() - produced);
        output[produced..produced + n].copy_from_slice(&input[..n]);
        produced += n;

        let header_done = self.header_sent == XZ_MAGIC.len();
        let status = if action == Action::Finish && header_done && n == input.len() {
            StepStatus::StreamEnd
        } else {
            StepStatus::Running
        };
        Ok(StepOutcome {
            consumed: n,
            produced,
            status,
        })
    }

    fn reset(&mut self) -> Result<()> {
        if self.ended {
            return Err(XzError::illegal_state("fake codec ended"));
        }
        self.header_sent = 0;
        Ok(())
    }

    fn end(&mut self) {
        self.ended = true;
    }
}

/// Decoder fake: verifies and strips the magic, then copies input verbatim.
pub struct FakeDecoderCodec {
    header_skipped: usize,
    ended: bool,
}

impl FakeDecoderCodec {
    pub fn new() -> Self {
        FakeDecoderCodec {
            header_skipped: 0,
            ended: false,
        }
    }
}

impl Codec for FakeDecoderCodec {
    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<StepOutcome> {
        if self.ended {
            return Err(XzError::illegal_state("fake codec ended"));
        }
        let mut consumed = 0;
        while self.header_skipped < XZ_MAGIC.len() && consumed < input.len() {
            if input[consumed] != XZ_MAGIC[self.header_skipped] {
                return Err(XzError::Format);
            }
            consumed += 1;
            self.header_skipped += 1;
        }
        let n = (input.len() - consumed).min(output.len());
        output[..n].copy_from_slice(&input[consumed..consumed + n]);
        consumed += n;

        let header_done = self.header_skipped == XZ_MAGIC.len();
        let status = if action == Action::Finish && header_done && consumed == input.len() {
            StepStatus::StreamEnd
        } else {
            StepStatus::Running
        };
        Ok(StepOutcome {
            consumed,
            produced: n,
            status,
        })
    }

    fn reset(&mut self) -> Result<()> {
        if self.ended {
            return Err(XzError::illegal_state("fake codec ended"));
        }
        self.header_skipped = 0;
        Ok(())
    }

    fn end(&mut self) {
        self.ended = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_pair_round_trips() {
        let payload = b"round trip through the fakes";
        let mut encoded = vec![0u8; payload.len() + XZ_MAGIC.len()];
        let mut encoder = FakeEncoderCodec::new();
        let outcome = encoder.step(payload, &mut encoded, Action::Finish).unwrap();
        assert_eq!(outcome.status, StepStatus::StreamEnd);
        assert_eq!(outcome.produced, encoded.len());

        let mut decoded = vec![0u8; payload.len()];
        let mut decoder = FakeDecoderCodec::new();
        let outcome = decoder.step(&encoded, &mut decoded, Action::Finish).unwrap();
        assert_eq!(outcome.status, StepStatus::StreamEnd);
        assert_eq!(&decoded[..outcome.produced], payload);
    }

    #[test]
    fn fake_decoder_rejects_bad_magic() {
        let mut decoder = FakeDecoderCodec::new();
        let mut out = [0u8; 16];
        assert!(matches!(
            decoder.step(b"not an xz stream", &mut out, Action::Finish),
            Err(XzError::Format)
        ));
    }
}
