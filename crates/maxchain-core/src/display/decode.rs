//! Per-digit decode-mode mask

use bitflags::bitflags;

use crate::error::{Error, Result};

bitflags! {
    /// Decode-mode register value
    ///
    /// A set bit selects Code B decoding for that digit, a clear bit means
    /// the digit register holds raw segment bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DecodeMode: u8 {
        /// Decode digit 1
        const DIGIT_1 = 1 << 0;
        /// Decode digit 2
        const DIGIT_2 = 1 << 1;
        /// Decode digit 3
        const DIGIT_3 = 1 << 2;
        /// Decode digit 4
        const DIGIT_4 = 1 << 3;
        /// Decode digit 5
        const DIGIT_5 = 1 << 4;
        /// Decode digit 6
        const DIGIT_6 = 1 << 5;
        /// Decode digit 7
        const DIGIT_7 = 1 << 6;
        /// Decode digit 8
        const DIGIT_8 = 1 << 7;

        /// Code B decoding on every digit
        const ALL = 0xFF;
    }
}

impl Default for DecodeMode {
    fn default() -> Self {
        DecodeMode::empty()
    }
}

impl DecodeMode {
    /// Raw segment control on every digit
    pub const NONE: Self = Self::empty();

    /// Mask selecting a single 1-based digit
    pub const fn digit(digit: u8) -> Result<Self> {
        if digit < 1 || digit > 8 {
            return Err(Error::InvalidDigit(digit));
        }
        Ok(Self::from_bits_retain(1 << (digit - 1)))
    }

    /// Whether the given 1-based digit is Code B decoded
    pub const fn decodes(self, digit: u8) -> bool {
        match Self::digit(digit) {
            Ok(mask) => self.contains(mask),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_masks() {
        assert_eq!(DecodeMode::DIGIT_8.bits(), 0x80);
        assert_eq!(DecodeMode::digit(1), Ok(DecodeMode::DIGIT_1));
        assert_eq!(DecodeMode::digit(8), Ok(DecodeMode::DIGIT_8));
        assert_eq!(DecodeMode::digit(9), Err(Error::InvalidDigit(9)));
        assert_eq!(DecodeMode::ALL.bits(), 0xFF);
    }

    #[test]
    fn test_decodes() {
        let mode = DecodeMode::DIGIT_1 | DecodeMode::DIGIT_4;
        assert!(mode.decodes(1));
        assert!(mode.decodes(4));
        assert!(!mode.decodes(2));
        assert!(!mode.decodes(0));
        assert!(!DecodeMode::NONE.decodes(1));
    }
}
