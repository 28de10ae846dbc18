//! Trailing integrity-check selection.
//!
//! The check algorithm is embedded in the container and verified by the
//! decoder; the encoder commits to one at construction time and never
//! changes it afterwards.

/// Integrity check appended to the encoded container.
///
/// The numeric codes are fixed by the container format; gaps in the
/// numbering belong to check types liblzma reserves but does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Check {
    /// No integrity check. Verification is the caller's problem.
    #[default]
    None,
    /// CRC-32: fast, weak.
    Crc32,
    /// CRC-64: the usual default for `.xz` files in the wild.
    Crc64,
    /// SHA-256: strongest, slowest.
    Sha256,
}

impl Check {
    /// Stable numeric code used in the container.
    pub fn code(self) -> u32 {
        match self {
            Check::None => 0,
            Check::Crc32 => 1,
            Check::Crc64 => 4,
            Check::Sha256 => 10,
        }
    }

    /// Map a container code back to a check, if it is one we support.
    pub fn from_code(code: u32) -> Option<Check> {
        match code {
            0 => Some(Check::None),
            1 => Some(Check::Crc32),
            4 => Some(Check::Crc64),
            10 => Some(Check::Sha256),
            _ => None,
        }
    }
}
