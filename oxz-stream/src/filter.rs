//! Filter chain assembly.
//!
//! A chain is an ordered list of transform stages handed to the codec at
//! stream initialization: zero or one branch-convert (BCJ) pre-filter,
//! then exactly one LZMA2 stage carrying the [`Options`], then a sentinel
//! terminator. The chain owns its options; the codec borrows the raw form
//! only for the duration of the initialization call.
//!
//! Malformed options are not diagnosed here — the codec rejects them at
//! initialization. Construction cannot fail.

use crate::options::Options;
use std::ptr;

/// Sentinel filter id terminating a raw chain.
const VLI_UNKNOWN: u64 = u64::MAX;

/// LZMA2 filter id.
const FILTER_LZMA2: u64 = 0x21;

/// Branch-convert (BCJ) pre-filters: architecture-specific transforms that
/// rewrite relative branch targets so the LZMA2 stage finds more matches in
/// executable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcjFilter {
    /// x86 and x86-64 call/jump conversion.
    X86,
    /// PowerPC (big endian) branch conversion.
    PowerPc,
    /// IA-64 (Itanium) branch conversion.
    Ia64,
    /// ARM (little endian) branch conversion.
    Arm,
    /// ARM Thumb branch conversion.
    ArmThumb,
    /// SPARC branch conversion.
    Sparc,
}

impl BcjFilter {
    /// Stable filter id used in the container.
    pub fn id(self) -> u64 {
        match self {
            BcjFilter::X86 => 0x04,
            BcjFilter::PowerPc => 0x05,
            BcjFilter::Ia64 => 0x06,
            BcjFilter::Arm => 0x07,
            BcjFilter::ArmThumb => 0x08,
            BcjFilter::Sparc => 0x09,
        }
    }
}

/// An ordered filter chain: optional BCJ pre-filter, the LZMA2 stage, and
/// (in raw form) the sentinel terminator.
#[derive(Debug, Clone)]
pub struct FilterChain {
    prefilter: Option<BcjFilter>,
    options: Options,
}

impl FilterChain {
    /// Build the default chain for `options`: x86 BCJ pre-filter followed
    /// by the LZMA2 stage.
    pub fn new(options: Options) -> FilterChain {
        FilterChain {
            prefilter: Some(BcjFilter::X86),
            options,
        }
    }

    /// Build a chain with only the LZMA2 stage.
    pub fn lzma2_only(options: Options) -> FilterChain {
        FilterChain {
            prefilter: None,
            options,
        }
    }

    /// Replace the pre-filter stage. `None` removes it.
    pub fn with_prefilter(mut self, prefilter: Option<BcjFilter>) -> FilterChain {
        self.prefilter = prefilter;
        self
    }

    /// The pre-filter stage, if any.
    pub fn prefilter(&self) -> Option<BcjFilter> {
        self.prefilter
    }

    /// The LZMA2 stage options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Lower the chain to the raw array the codec expects, terminated by
    /// the sentinel id. The returned array borrows the options record; it
    /// must not outlive `self` and is only valid while `self` stays put.
    pub(crate) fn as_raw(&self) -> Vec<lzma_sys::lzma_filter> {
        let mut raw = Vec::with_capacity(3);
        if let Some(prefilter) = self.prefilter {
            raw.push(lzma_sys::lzma_filter {
                id: prefilter.id(),
                options: ptr::null_mut(),
            });
        }
        raw.push(lzma_sys::lzma_filter {
            id: FILTER_LZMA2,
            options: self.options.as_raw() as *mut std::ffi::c_void,
        });
        raw.push(lzma_sys::lzma_filter {
            id: VLI_UNKNOWN,
            options: ptr::null_mut(),
        });
        raw
    }
}
