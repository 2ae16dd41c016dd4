//! Composite key codes.
//!
//! A decoded key collapses to one integer: the final byte of its
//! sequence, shifted left by 8 bits for every anchor the sequence crossed
//! on its way through the [`KeyTrie`](crate::trie::KeyTrie).
//!
//! | Input bytes            | Anchors crossed | Code       |
//! |------------------------|-----------------|------------|
//! | `a`                    | 0               | `0x61`     |
//! | `ESC [ A` (up)         | 1               | `0x4100`   |
//! | `ESC [ 1 ; 2 A` (S-up) | 2               | `0x410000` |
//!
//! A plain key (no anchor crossed) is its own byte value, so ASCII
//! comparisons keep working on codes.

use std::fmt;

/// Deepest shift a `u32` can hold for a full byte.
///
/// The standard trie never goes beyond depth 2; custom tries with more
/// anchors on one path saturate here.
pub const MAX_DEPTH: u8 = 3;

/// A decoded key: `last_byte << (8 * depth)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(u32);

impl Code {
    /// Build the code for `byte` finalized after crossing `depth` anchors.
    #[must_use]
    pub fn new(byte: u8, depth: u8) -> Self {
        let shift = 8 * u32::from(depth.min(MAX_DEPTH));
        Self(u32::from(byte) << shift)
    }

    /// Wrap an already-composed integer.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The composite integer.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// How many anchors the sequence crossed.
    ///
    /// A zero code (NUL at depth 0) reports depth 0.
    #[must_use]
    pub const fn depth(self) -> u8 {
        if self.0 == 0 {
            0
        } else {
            // A non-zero byte has at most 7 trailing zeros, so whole
            // bytes of trailing zeros are exactly the shift.
            #[allow(clippy::cast_possible_truncation)] // At most 3.
            let depth = (self.0.trailing_zeros() / 8) as u8;
            depth
        }
    }

    /// The byte that finalized the sequence.
    #[must_use]
    pub const fn byte(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)] // Shifted down to one byte.
        let byte = (self.0 >> (8 * self.depth() as u32)) as u8;
        byte
    }
}

impl From<u8> for Code {
    fn from(byte: u8) -> Self {
        Self::new(byte, 0)
    }
}

impl From<Code> for u32 {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl fmt::Display for Code {
    /// Hex, the way the codes are written in key tables: `0x4100`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn depth_zero_is_the_byte() {
        for b in 0..=u8::MAX {
            assert_eq!(Code::new(b, 0).value(), u32::from(b));
        }
    }

    #[test]
    fn each_depth_shifts_one_byte() {
        assert_eq!(Code::new(0x41, 1).value(), 0x4100);
        assert_eq!(Code::new(0x41, 2).value(), 0x41_0000);
        assert_eq!(Code::new(0x41, 3).value(), 0x4100_0000);
    }

    #[test]
    fn depth_saturates() {
        assert_eq!(Code::new(0x41, 9), Code::new(0x41, MAX_DEPTH));
    }

    #[test]
    fn depth_and_byte_roundtrip() {
        let code = Code::new(0x44, 2);
        assert_eq!(code.depth(), 2);
        assert_eq!(code.byte(), 0x44);

        let plain = Code::from(b'z');
        assert_eq!(plain.depth(), 0);
        assert_eq!(plain.byte(), b'z');
    }

    #[test]
    fn high_bit_byte_keeps_depth() {
        let code = Code::new(0x80, 1);
        assert_eq!(code.depth(), 1);
        assert_eq!(code.byte(), 0x80);
    }

    #[test]
    fn nul_reports_depth_zero() {
        assert_eq!(Code::new(0, 2).depth(), 0);
        assert_eq!(Code::new(0, 2).byte(), 0);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Code::new(0x41, 1).to_string(), "0x4100");
        assert_eq!(Code::from(0x12).to_string(), "0x12");
        assert_eq!(format!("{:06x}", Code::new(0x43, 2)), "430000");
    }
}
