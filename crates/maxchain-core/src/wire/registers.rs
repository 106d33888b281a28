//! MAX7219/MAX7221 register map
//!
//! Register addresses occupy the low nibble of the first byte of every
//! command word. Addresses 0x0D and 0x0E are unused by the controllers.

use core::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Digit indices
// ============================================================================

/// First digit index (digit register 0 on the datasheet)
pub const MIN_DIGIT: u8 = 1;
/// Last digit index (digit register 7 on the datasheet)
pub const MAX_DIGIT: u8 = 8;
/// Number of digit registers per device
pub const DIGITS_PER_DEVICE: usize = 8;

// ============================================================================
// Data values
// ============================================================================

/// Shutdown register: power down the display
pub const SHUTDOWN_POWER_DOWN: u8 = 0x00;
/// Shutdown register: normal operation
pub const SHUTDOWN_NORMAL: u8 = 0x01;
/// Display-test register: normal operation
pub const DISPLAY_TEST_OFF: u8 = 0x00;
/// Display-test register: all segments lit at full intensity
pub const DISPLAY_TEST_ON: u8 = 0x01;
/// Mask of the meaningful bits in the intensity register
pub const INTENSITY_MASK: u8 = 0x0F;
/// Mask of the meaningful bits in the scan-limit register
pub const SCAN_LIMIT_MASK: u8 = 0x07;
/// Mask applied to the address byte by the controllers
pub const ADDRESS_MASK: u8 = 0x0F;

/// Register addresses understood by the controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// No-op, used to pad a transaction for devices that are not addressed
    NoOp = 0x00,
    /// Digit 1
    Digit0 = 0x01,
    /// Digit 2
    Digit1 = 0x02,
    /// Digit 3
    Digit2 = 0x03,
    /// Digit 4
    Digit3 = 0x04,
    /// Digit 5
    Digit4 = 0x05,
    /// Digit 6
    Digit5 = 0x06,
    /// Digit 7
    Digit6 = 0x07,
    /// Digit 8
    Digit7 = 0x08,
    /// Per-digit Code B decode enable bitmask
    DecodeMode = 0x09,
    /// Display brightness, 16 steps
    Intensity = 0x0A,
    /// Number of scanned digits minus one
    ScanLimit = 0x0B,
    /// Shutdown / normal operation
    Shutdown = 0x0C,
    /// Display test
    DisplayTest = 0x0F,
}

impl Register {
    /// Digit register for a 1-based digit index
    pub const fn digit(digit: u8) -> Result<Self> {
        Ok(match digit {
            1 => Self::Digit0,
            2 => Self::Digit1,
            3 => Self::Digit2,
            4 => Self::Digit3,
            5 => Self::Digit4,
            6 => Self::Digit5,
            7 => Self::Digit6,
            8 => Self::Digit7,
            _ => return Err(Error::InvalidDigit(digit)),
        })
    }

    /// Decode an address byte the way the controllers do (low nibble only)
    ///
    /// Returns `None` for the two unused addresses.
    pub const fn from_addr(addr: u8) -> Option<Self> {
        Some(match addr & ADDRESS_MASK {
            0x00 => Self::NoOp,
            0x01 => Self::Digit0,
            0x02 => Self::Digit1,
            0x03 => Self::Digit2,
            0x04 => Self::Digit3,
            0x05 => Self::Digit4,
            0x06 => Self::Digit5,
            0x07 => Self::Digit6,
            0x08 => Self::Digit7,
            0x09 => Self::DecodeMode,
            0x0A => Self::Intensity,
            0x0B => Self::ScanLimit,
            0x0C => Self::Shutdown,
            0x0F => Self::DisplayTest,
            _ => return None,
        })
    }

    /// Register address byte
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// 1-based digit index, if this is a digit register
    pub const fn digit_index(self) -> Option<u8> {
        match self.addr() {
            addr @ 0x01..=0x08 => Some(addr),
            _ => None,
        }
    }

    /// Human-readable register name
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoOp => "No-op",
            Self::Digit0 => "Digit 1",
            Self::Digit1 => "Digit 2",
            Self::Digit2 => "Digit 3",
            Self::Digit3 => "Digit 4",
            Self::Digit4 => "Digit 5",
            Self::Digit5 => "Digit 6",
            Self::Digit6 => "Digit 7",
            Self::Digit7 => "Digit 8",
            Self::DecodeMode => "Decode",
            Self::Intensity => "Intensity",
            Self::ScanLimit => "Scan limit",
            Self::Shutdown => "Shutdown",
            Self::DisplayTest => "Display test",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_registers() {
        assert_eq!(Register::digit(1), Ok(Register::Digit0));
        assert_eq!(Register::digit(8), Ok(Register::Digit7));
        assert_eq!(Register::digit(0), Err(Error::InvalidDigit(0)));
        assert_eq!(Register::digit(9), Err(Error::InvalidDigit(9)));
        assert_eq!(Register::Digit4.digit_index(), Some(5));
        assert_eq!(Register::Intensity.digit_index(), None);
    }

    #[test]
    fn test_from_addr_masks_high_nibble() {
        assert_eq!(Register::from_addr(0xF1), Some(Register::Digit0));
        assert_eq!(Register::from_addr(0x0C), Some(Register::Shutdown));
        assert_eq!(Register::from_addr(0x0D), None);
        assert_eq!(Register::from_addr(0x0E), None);
    }
}
