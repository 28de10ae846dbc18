//! LZMA2 tuning options and the preset resolver.
//!
//! An [`Options`] record is created once — from a preset level 0–9 or by
//! explicit mutation before first use — and is then owned, unchanged, by the
//! session whose filter chain was built from it. The numeric derivation of
//! preset values (dictionary size, lc/lp/pb, nice length, match-finder and
//! mode pairing) is delegated to liblzma's preset table; this module only
//! validates the level and shapes the result.
//!
//! The record wraps the raw `lzma_options_lzma` so that the reserved
//! forward-compatibility slots round-trip to the library bit-exact; all
//! access goes through typed getters and setters.

use crate::backend::{apply_preset, zeroed_options};
use oxz_core::error::{Result, XzError};
use oxz_core::codec::Return;
use std::fmt;

/// Mode used for analyzing data produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Usually at its best combined with a hash-chain match finder.
    Fast,
    /// Notably slower; pairs with binary-tree match finders to expose the
    /// full potential of the LZMA2 encoder.
    Normal,
}

impl Mode {
    /// Stable numeric code understood by the codec.
    pub fn code(self) -> u32 {
        match self {
            Mode::Fast => 1,
            Mode::Normal => 2,
        }
    }

    /// Map a numeric code back to a mode.
    pub fn from_code(code: u32) -> Option<Mode> {
        match code {
            1 => Some(Mode::Fast),
            2 => Some(Mode::Normal),
            _ => None,
        }
    }
}

/// Match-finder algorithm used by the external coder to locate repeated
/// byte sequences. Hash chains are usually faster; binary trees compress
/// better. Not reimplemented here — the variant is passed through to the
/// codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFinder {
    /// Hash chain with 2- and 3-byte hashing.
    Hc3,
    /// Hash chain with 2-, 3-, and 4-byte hashing.
    Hc4,
    /// Binary tree with 2-byte hashing.
    Bt2,
    /// Binary tree with 2- and 3-byte hashing.
    Bt3,
    /// Binary tree with 2-, 3-, and 4-byte hashing.
    Bt4,
}

impl MatchFinder {
    /// Stable numeric code understood by the codec.
    pub fn code(self) -> u32 {
        match self {
            MatchFinder::Hc3 => 0x03,
            MatchFinder::Hc4 => 0x04,
            MatchFinder::Bt2 => 0x12,
            MatchFinder::Bt3 => 0x13,
            MatchFinder::Bt4 => 0x14,
        }
    }

    /// Map a numeric code back to a match finder.
    pub fn from_code(code: u32) -> Option<MatchFinder> {
        match code {
            0x03 => Some(MatchFinder::Hc3),
            0x04 => Some(MatchFinder::Hc4),
            0x12 => Some(MatchFinder::Bt2),
            0x13 => Some(MatchFinder::Bt3),
            0x14 => Some(MatchFinder::Bt4),
            _ => None,
        }
    }

    /// Smallest `nice_len` the coder accepts for this match finder.
    pub fn min_nice_len(self) -> u32 {
        match self {
            MatchFinder::Hc3 => 3,
            MatchFinder::Hc4 => 4,
            MatchFinder::Bt2 => 2,
            MatchFinder::Bt3 => 3,
            MatchFinder::Bt4 => 4,
        }
    }
}

/// LZMA2 filter options.
///
/// Wraps the raw option record so reserved slots survive untouched; the
/// optional preset dictionary is owned by this struct and the raw pointer
/// into it is kept consistent by every mutation.
pub struct Options {
    raw: lzma_sys::lzma_options_lzma,
    preset_dict: Option<Box<[u8]>>,
}

impl Options {
    /// Resolve a compression level 0–9 into concrete options using the
    /// codec's preset table.
    ///
    /// Fails with [`XzError::InvalidArgument`] when `level` is outside 0–9.
    pub fn from_preset(level: u32) -> Result<Options> {
        if level > 9 {
            return Err(XzError::invalid_argument(format!(
                "preset level must be between 0 and 9, got {level}"
            )));
        }
        let mut raw = zeroed_options();
        if !apply_preset(&mut raw, level) {
            return Err(XzError::CodecInit(Return::OptionsError));
        }
        Ok(Options {
            raw,
            preset_dict: None,
        })
    }

    /// Dictionary (history buffer) size in bytes.
    pub fn dict_size(&self) -> u32 {
        self.raw.dict_size
    }

    /// Set the dictionary size in bytes.
    pub fn set_dict_size(&mut self, dict_size: u32) {
        self.raw.dict_size = dict_size;
    }

    /// Number of literal context bits (lc).
    pub fn literal_context_bits(&self) -> u32 {
        self.raw.lc
    }

    /// Set the number of literal context bits (lc).
    pub fn set_literal_context_bits(&mut self, lc: u32) {
        self.raw.lc = lc;
    }

    /// Number of literal position bits (lp).
    pub fn literal_position_bits(&self) -> u32 {
        self.raw.lp
    }

    /// Set the number of literal position bits (lp).
    pub fn set_literal_position_bits(&mut self, lp: u32) {
        self.raw.lp = lp;
    }

    /// Number of position bits (pb).
    pub fn position_bits(&self) -> u32 {
        self.raw.pb
    }

    /// Set the number of position bits (pb).
    pub fn set_position_bits(&mut self, pb: u32) {
        self.raw.pb = pb;
    }

    /// Analysis mode. Unknown raw codes (possible only if the preset table
    /// ever grows a new mode) read as [`Mode::Normal`].
    pub fn mode(&self) -> Mode {
        Mode::from_code(self.raw.mode).unwrap_or(Mode::Normal)
    }

    /// Set the analysis mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.raw.mode = mode.code();
    }

    /// Nice length of a match: the coder stops searching once a match of
    /// this length is found.
    pub fn nice_len(&self) -> u32 {
        self.raw.nice_len
    }

    /// Set the nice length of a match.
    pub fn set_nice_len(&mut self, nice_len: u32) {
        self.raw.nice_len = nice_len;
    }

    /// Match-finder variant. Unknown raw codes read as [`MatchFinder::Bt4`].
    pub fn match_finder(&self) -> MatchFinder {
        MatchFinder::from_code(self.raw.mf).unwrap_or(MatchFinder::Bt4)
    }

    /// Set the match-finder variant.
    pub fn set_match_finder(&mut self, mf: MatchFinder) {
        self.raw.mf = mf.code();
    }

    /// Match-finder search depth; 0 lets the coder pick.
    pub fn depth(&self) -> u32 {
        self.raw.depth
    }

    /// Set the match-finder search depth.
    pub fn set_depth(&mut self, depth: u32) {
        self.raw.depth = depth;
    }

    /// The preset dictionary, if one was attached.
    pub fn preset_dict(&self) -> Option<&[u8]> {
        self.preset_dict.as_deref()
    }

    /// Attach a preset dictionary. The bytes are copied and owned by this
    /// record; the raw pointer handed to the codec always targets the
    /// owned copy.
    pub fn set_preset_dict(&mut self, dict: &[u8]) {
        let owned: Box<[u8]> = dict.into();
        self.raw.preset_dict = owned.as_ptr();
        self.raw.preset_dict_size = owned.len() as u32;
        self.preset_dict = Some(owned);
    }

    /// Check the option invariants the coder requires.
    ///
    /// - `lc + lp <= 4`
    /// - `dict_size > 0`
    /// - `nice_len` at least the match finder's minimum
    pub fn validate(&self) -> Result<()> {
        if self.raw.lc + self.raw.lp > 4 {
            return Err(XzError::invalid_argument(format!(
                "lc + lp must not exceed 4 (lc={}, lp={})",
                self.raw.lc, self.raw.lp
            )));
        }
        if self.raw.dict_size == 0 {
            return Err(XzError::invalid_argument("dictionary size must be non-zero"));
        }
        let min = self.match_finder().min_nice_len();
        if self.raw.nice_len < min {
            return Err(XzError::invalid_argument(format!(
                "nice_len {} below minimum {} for {:?}",
                self.raw.nice_len,
                min,
                self.match_finder()
            )));
        }
        Ok(())
    }

    /// Raw pointer for the filter chain. Valid as long as `self` is alive
    /// and unmoved-from; the codec only reads through it during stream
    /// initialization.
    pub(crate) fn as_raw(&self) -> *const lzma_sys::lzma_options_lzma {
        &self.raw
    }
}

// SAFETY: the only pointer inside `raw` that we ever set targets the owned
// `preset_dict` allocation, which moves with the struct. Nothing aliases it.
unsafe impl Send for Options {}
unsafe impl Sync for Options {}

impl Clone for Options {
    fn clone(&self) -> Self {
        let mut clone = Options {
            raw: self.raw,
            preset_dict: self.preset_dict.clone(),
        };
        // Re-point the raw pointer at the cloned allocation.
        match &clone.preset_dict {
            Some(dict) => {
                clone.raw.preset_dict = dict.as_ptr();
                clone.raw.preset_dict_size = dict.len() as u32;
            }
            None => {
                clone.raw.preset_dict = std::ptr::null();
                clone.raw.preset_dict_size = 0;
            }
        }
        clone
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("dict_size", &self.dict_size())
            .field("lc", &self.literal_context_bits())
            .field("lp", &self.literal_position_bits())
            .field("pb", &self.position_bits())
            .field("mode", &self.mode())
            .field("nice_len", &self.nice_len())
            .field("match_finder", &self.match_finder())
            .field("depth", &self.depth())
            .field(
                "preset_dict",
                &self.preset_dict.as_ref().map(|d| d.len()),
            )
            .finish()
    }
}
