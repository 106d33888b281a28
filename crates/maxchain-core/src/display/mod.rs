//! Display-level value types
//!
//! Operating modes, brightness, decode masks and the digit symbol sets
//! accepted by the digit registers.

mod decode;
mod symbols;

pub use decode::DecodeMode;
pub use symbols::{CodeB, Segments, DECIMAL_POINT};

use core::fmt;

use crate::error::{Error, Result};
use crate::wire::{
    Command, Register, DISPLAY_TEST_OFF, DISPLAY_TEST_ON, INTENSITY_MASK, SHUTDOWN_NORMAL,
    SHUTDOWN_POWER_DOWN,
};

/// Controller variant
///
/// Both variants share the register map and wire format. They differ in the
/// duty cycle each intensity step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// MAX7219
    #[default]
    Max7219,
    /// MAX7221 (slew-rate limited, SPI compatible)
    Max7221,
}

impl DeviceType {
    /// Parse a device type name ("max7219", "7221", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let digits = name
            .strip_prefix("max")
            .or_else(|| name.strip_prefix("MAX"))
            .unwrap_or(name);
        match digits {
            "7219" => Some(Self::Max7219),
            "7221" => Some(Self::Max7221),
            _ => None,
        }
    }

    /// Part name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Max7219 => "MAX7219",
            Self::Max7221 => "MAX7221",
        }
    }

    /// Segment-current duty cycle produced by an intensity step
    pub const fn duty_cycle(self, intensity: Intensity) -> DutyCycle {
        let step = intensity.level();
        match self {
            Self::Max7219 => DutyCycle {
                numerator: 2 * step + 1,
                denominator: 32,
            },
            // The last step of the MAX7221 saturates at 15/16
            Self::Max7221 => DutyCycle {
                numerator: if step == Intensity::MAX_LEVEL {
                    15
                } else {
                    step + 1
                },
                denominator: 16,
            },
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Segment-current duty cycle as a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DutyCycle {
    /// Numerator
    pub numerator: u8,
    /// Denominator (32 on the MAX7219, 16 on the MAX7221)
    pub denominator: u8,
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Operating mode of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Display blanked, registers retained, low power
    Shutdown = 0,
    /// Normal operation
    Normal = 1,
    /// Display test, every segment lit
    Test = 2,
}

impl Mode {
    /// Parse a mode name ("shutdown", "normal", "test")
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            ("shutdown", Self::Shutdown),
            ("off", Self::Shutdown),
            ("normal", Self::Normal),
            ("on", Self::Normal),
            ("test", Self::Test),
        ]
        .into_iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, mode)| mode)
    }

    /// Mode name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::Normal => "normal",
            Self::Test => "test",
        }
    }

    /// Commands that put a device in this mode, one transaction each, in send order
    ///
    /// Normal and shutdown first clear the display-test register, then write
    /// the shutdown register. Test mode is a single display-test write.
    pub const fn commands(self) -> &'static [Command] {
        match self {
            Self::Shutdown => &SHUTDOWN_SEQUENCE,
            Self::Normal => &NORMAL_SEQUENCE,
            Self::Test => &TEST_SEQUENCE,
        }
    }
}

const SHUTDOWN_SEQUENCE: [Command; 2] = [
    Command::new(Register::DisplayTest, DISPLAY_TEST_OFF),
    Command::new(Register::Shutdown, SHUTDOWN_POWER_DOWN),
];
const NORMAL_SEQUENCE: [Command; 2] = [
    Command::new(Register::DisplayTest, DISPLAY_TEST_OFF),
    Command::new(Register::Shutdown, SHUTDOWN_NORMAL),
];
const TEST_SEQUENCE: [Command; 1] = [Command::new(Register::DisplayTest, DISPLAY_TEST_ON)];

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Shutdown),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Test),
            _ => Err(Error::InvalidMode(value)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Brightness step, 0 (dimmest) to 15 (brightest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Intensity(u8);

impl Intensity {
    /// Highest step
    pub const MAX_LEVEL: u8 = 15;
    /// Dimmest setting
    pub const MIN: Self = Self(0);
    /// Brightest setting
    pub const MAX: Self = Self(Self::MAX_LEVEL);

    /// Create an intensity step, rejecting values above 15
    pub const fn new(level: u8) -> Result<Self> {
        if level > Self::MAX_LEVEL {
            return Err(Error::InvalidIntensity(level));
        }
        Ok(Self(level))
    }

    /// Intensity from a raw register value, ignoring the unused high bits
    pub const fn from_register(value: u8) -> Self {
        Self(value & INTENSITY_MASK)
    }

    /// Step value as written to the intensity register
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_commands() {
        assert_eq!(
            Mode::Shutdown.commands(),
            &[Command::from_bytes(0x0F, 0x00), Command::from_bytes(0x0C, 0x00)]
        );
        assert_eq!(
            Mode::Normal.commands(),
            &[Command::from_bytes(0x0F, 0x00), Command::from_bytes(0x0C, 0x01)]
        );
        assert_eq!(Mode::Test.commands(), &[Command::from_bytes(0x0F, 0x01)]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::try_from(2), Ok(Mode::Test));
        assert_eq!(Mode::try_from(3), Err(Error::InvalidMode(3)));
        assert_eq!(Mode::from_name("Normal"), Some(Mode::Normal));
        assert_eq!(Mode::from_name("off"), Some(Mode::Shutdown));
        assert_eq!(Mode::from_name("blink"), None);
    }

    #[test]
    fn test_intensity_range() {
        assert_eq!(Intensity::new(15).map(Intensity::level), Ok(15));
        assert_eq!(Intensity::new(16), Err(Error::InvalidIntensity(16)));
        assert_eq!(Intensity::from_register(0xF3).level(), 3);
    }

    #[test]
    fn test_duty_cycles() {
        let d = DeviceType::Max7219.duty_cycle(Intensity::MIN);
        assert_eq!((d.numerator, d.denominator), (1, 32));
        let d = DeviceType::Max7219.duty_cycle(Intensity::MAX);
        assert_eq!((d.numerator, d.denominator), (31, 32));
        let d = DeviceType::Max7221.duty_cycle(Intensity::MIN);
        assert_eq!((d.numerator, d.denominator), (1, 16));
        let d = DeviceType::Max7221.duty_cycle(Intensity::MAX);
        assert_eq!((d.numerator, d.denominator), (15, 16));
    }

    #[test]
    fn test_device_type_names() {
        assert_eq!(DeviceType::from_name("max7221"), Some(DeviceType::Max7221));
        assert_eq!(DeviceType::from_name("MAX7219"), Some(DeviceType::Max7219));
        assert_eq!(DeviceType::from_name("7219"), Some(DeviceType::Max7219));
        assert_eq!(DeviceType::from_name("max6951"), None);
    }
}
