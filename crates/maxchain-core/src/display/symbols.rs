//! Digit register contents
//!
//! With decoding enabled a digit register takes a Code B symbol, with
//! decoding disabled it takes raw segment bits. In both cases bit 7 drives
//! the decimal point.

use bitflags::bitflags;

/// Decimal-point bit, valid in both Code B and raw segment values
pub const DECIMAL_POINT: u8 = 0x80;

/// Code B font symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodeB {
    /// 0
    Zero = 0,
    /// 1
    One = 1,
    /// 2
    Two = 2,
    /// 3
    Three = 3,
    /// 4
    Four = 4,
    /// 5
    Five = 5,
    /// 6
    Six = 6,
    /// 7
    Seven = 7,
    /// 8
    Eight = 8,
    /// 9
    Nine = 9,
    /// -
    Minus = 10,
    /// E
    E = 11,
    /// H
    H = 12,
    /// L
    L = 13,
    /// P
    P = 14,
    /// Blank digit
    Blank = 15,
}

impl CodeB {
    const CHARS: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', 'E', 'H', 'L', 'P', ' ',
    ];
    const ALL: [Self; 16] = [
        Self::Zero,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Minus,
        Self::E,
        Self::H,
        Self::L,
        Self::P,
        Self::Blank,
    ];

    /// Symbol for a character, if the font has one (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        Self::CHARS
            .iter()
            .position(|&candidate| candidate == c)
            .map(|index| Self::ALL[index])
    }

    /// Symbol encoded in the low nibble of a digit register value
    pub const fn from_register(value: u8) -> Self {
        Self::ALL[(value & 0x0F) as usize]
    }

    /// Character this symbol renders as
    pub const fn as_char(self) -> char {
        Self::CHARS[self as usize]
    }

    /// Digit register value
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Digit register value with the decimal point lit
    pub const fn with_dp(self) -> u8 {
        self as u8 | DECIMAL_POINT
    }
}

bitflags! {
    /// Raw segment bits for a digit register with decoding disabled
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Segments: u8 {
        /// Middle bar
        const G = 0x01;
        /// Upper left
        const F = 0x02;
        /// Lower left
        const E = 0x04;
        /// Bottom bar
        const D = 0x08;
        /// Lower right
        const C = 0x10;
        /// Upper right
        const B = 0x20;
        /// Top bar
        const A = 0x40;
        /// Decimal point
        const DP = 0x80;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_b_chars() {
        assert_eq!(CodeB::from_char('7'), Some(CodeB::Seven));
        assert_eq!(CodeB::from_char('h'), Some(CodeB::H));
        assert_eq!(CodeB::from_char(' '), Some(CodeB::Blank));
        assert_eq!(CodeB::from_char('x'), None);
        assert_eq!(CodeB::Minus.as_char(), '-');
        assert_eq!(CodeB::from_register(0x8E), CodeB::P);
    }

    #[test]
    fn test_decimal_point() {
        assert_eq!(CodeB::Three.with_dp(), 0x83);
        assert_eq!(Segments::DP.bits(), DECIMAL_POINT);
    }
}
