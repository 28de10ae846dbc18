//! Shared session machinery: the input staging buffer and the readiness
//! state both session kinds track.

use oxz_core::error::{Result, XzError};

/// Default capacity of a session's input staging buffer: 5 MiB.
pub const DEFAULT_BUFFER_SIZE: usize = 5 * 1024 * 1024;

/// Three-valued readiness of a session. Transitions are monotonic in the
/// forward direction: `Finished` returns to `Ready` only through an
/// explicit reset, and `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// Accepting input and producing output.
    Ready,
    /// The terminal codec signal was observed; reset before reuse.
    Finished,
    /// Resources released; only destruction remains valid.
    Ended,
}

/// Fixed-capacity input staging buffer with a consumption cursor.
///
/// Callers copy a chunk in with [`Staging::stage`], the session consumes it
/// across one or more codec steps, and [`Staging::is_drained`] tells the
/// caller when the next chunk may be staged. Staging over unconsumed bytes
/// is an error rather than a silent discard.
#[derive(Debug)]
pub(crate) struct Staging {
    buf: Vec<u8>,
    pos: usize,
    capacity: usize,
}

impl Staging {
    pub(crate) fn new(capacity: usize) -> Staging {
        Staging {
            buf: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
        }
    }

    /// Copy `src` into the buffer, replacing the fully drained previous
    /// chunk. Rejects chunks beyond capacity and overwrites of unconsumed
    /// bytes.
    pub(crate) fn stage(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > self.capacity {
            return Err(XzError::invalid_argument(format!(
                "input of {} bytes exceeds the staging capacity of {} bytes; chunk the input",
                src.len(),
                self.capacity
            )));
        }
        if !self.is_drained() {
            return Err(XzError::illegal_state(format!(
                "{} unconsumed input bytes would be discarded; drain via needs_input first",
                self.buf.len() - self.pos
            )));
        }
        self.buf.clear();
        self.buf.extend_from_slice(src);
        self.pos = 0;
        Ok(())
    }

    /// The unconsumed remainder.
    pub(crate) fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Advance the consumption cursor by `n` bytes.
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.buf.len());
        self.pos += n;
    }

    /// True when the buffer is empty or fully consumed.
    pub(crate) fn is_drained(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Discard everything, drained or not. Used by reset.
    pub(crate) fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_drained() {
        let staging = Staging::new(16);
        assert!(staging.is_drained());
        assert!(staging.remaining().is_empty());
    }

    #[test]
    fn stage_consume_cycle() {
        let mut staging = Staging::new(16);
        staging.stage(b"abcdef").unwrap();
        assert!(!staging.is_drained());
        assert_eq!(staging.remaining(), b"abcdef");

        staging.consume(4);
        assert_eq!(staging.remaining(), b"ef");
        staging.consume(2);
        assert!(staging.is_drained());

        // Fully drained: restaging is allowed again.
        staging.stage(b"gh").unwrap();
        assert_eq!(staging.remaining(), b"gh");
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let mut staging = Staging::new(4);
        assert!(matches!(
            staging.stage(b"too large"),
            Err(XzError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn overwriting_unconsumed_input_is_rejected() {
        let mut staging = Staging::new(16);
        staging.stage(b"abc").unwrap();
        staging.consume(1);
        assert!(matches!(
            staging.stage(b"xyz"),
            Err(XzError::IllegalState { .. })
        ));
        // clear() discards unconditionally
        staging.clear();
        staging.stage(b"xyz").unwrap();
    }

    #[test]
    fn capacity_boundary_is_inclusive() {
        let mut staging = Staging::new(4);
        staging.stage(b"1234").unwrap();
        assert_eq!(staging.remaining(), b"1234");
    }
}
