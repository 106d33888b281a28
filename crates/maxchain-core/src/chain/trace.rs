//! Captured-transaction annotator
//!
//! Turns the bytes clocked out during one chip-select window back into
//! per-device register writes, the way a logic-analyzer decoder would. The
//! first word of the window belongs to the last device of the chain and the
//! position counts down from there, wrapping back to the last device when a
//! window holds more than one transaction.

use core::fmt;
use core::slice::ChunksExact;

use crate::display::{DecodeMode, DeviceType, DutyCycle, Intensity};
use crate::error::{Error, Result};
use crate::wire::{Command, Register, SCAN_LIMIT_MASK};

/// Decoded meaning of one command word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// No-op padding
    NoOp,
    /// Digit register write
    Digit {
        /// 1-based digit index
        digit: u8,
        /// Raw register value
        value: u8,
    },
    /// Decode-mode mask
    Decode(DecodeMode),
    /// Intensity step and the duty cycle it selects
    Intensity {
        /// Step written to the register
        level: u8,
        /// Resulting duty cycle for the controller variant
        duty: DutyCycle,
    },
    /// Number of scanned digits
    ScanLimit(u8),
    /// Shutdown register, `true` when the display is powered down
    Shutdown(bool),
    /// Display-test register, `true` when the test pattern is on
    DisplayTest(bool),
    /// Address the controllers do not implement
    Invalid(u8),
}

impl Annotation {
    /// Interpret a command for the given controller variant
    pub fn of(command: Command, device_type: DeviceType) -> Self {
        let value = command.data;
        match command.register() {
            Some(Register::NoOp) => Self::NoOp,
            Some(Register::DecodeMode) => Self::Decode(DecodeMode::from_bits_retain(value)),
            Some(Register::Intensity) => {
                let intensity = Intensity::from_register(value);
                Self::Intensity {
                    level: intensity.level(),
                    duty: device_type.duty_cycle(intensity),
                }
            }
            Some(Register::ScanLimit) => Self::ScanLimit((value & SCAN_LIMIT_MASK) + 1),
            Some(Register::Shutdown) => Self::Shutdown(value & 0x01 == 0),
            Some(Register::DisplayTest) => Self::DisplayTest(value & 0x01 != 0),
            Some(register) => match register.digit_index() {
                Some(digit) => Self::Digit { digit, value },
                None => Self::Invalid(command.address),
            },
            None => Self::Invalid(command.address),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => write!(f, "No-op"),
            Self::Digit { digit, value } => write!(f, "Digit {}: 0x{:02X}", digit, value),
            Self::Decode(mode) => write!(f, "Decode: 0b{:08b}", mode.bits()),
            Self::Intensity { level, duty }
                if *level == Intensity::MAX_LEVEL && duty.denominator == 16 =>
            {
                write!(f, "Intensity: {} max on", duty)
            }
            Self::Intensity { duty, .. } => write!(f, "Intensity: {}", duty),
            Self::ScanLimit(digits) => write!(f, "Scan limit: {}", digits),
            Self::Shutdown(powered_down) => {
                write!(f, "Shutdown: {}", if *powered_down { "on" } else { "off" })
            }
            Self::DisplayTest(on) => {
                write!(f, "Display test: {}", if *on { "on" } else { "off" })
            }
            Self::Invalid(addr) => write!(f, "INVALID REGISTER 0x{:02X}", addr),
        }
    }
}

/// One decoded word of a captured transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Chain position of the device that latches this word
    pub chain_id: u8,
    /// Raw command word
    pub command: Command,
    /// Decoded meaning
    pub annotation: Annotation,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device {}: {}", self.chain_id, self.annotation)
    }
}

/// Iterator over the words of one chip-select window
#[derive(Debug, Clone)]
pub struct Trace<'a> {
    words: ChunksExact<'a, u8>,
    chain_length: u8,
    device_type: DeviceType,
    next_id: u8,
}

impl Iterator for Trace<'_> {
    type Item = TraceEntry;

    fn next(&mut self) -> Option<TraceEntry> {
        let word = self.words.next()?;
        let command = Command::from_bytes(word[0], word[1]);
        let chain_id = self.next_id;
        self.next_id = if chain_id == 1 {
            self.chain_length
        } else {
            chain_id - 1
        };
        Some(TraceEntry {
            chain_id,
            command,
            annotation: Annotation::of(command, self.device_type),
        })
    }
}

/// Decode the bytes of one chip-select window
///
/// Fails if the window ends on half a command word or the chain length is
/// out of range.
pub fn decode(bytes: &[u8], chain_length: u8, device_type: DeviceType) -> Result<Trace<'_>> {
    if chain_length == 0 || chain_length > crate::config::MAX_CHAIN_LENGTH {
        return Err(Error::InvalidChainLength(chain_length));
    }
    if bytes.len() % 2 != 0 {
        return Err(Error::TruncatedCommand);
    }
    Ok(Trace {
        words: bytes.chunks_exact(2),
        chain_length,
        device_type,
        next_id: chain_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;
    use std::vec::Vec;

    #[test]
    fn test_device_positions_count_down() {
        let bytes = [0x00, 0x00, 0x01, 0x08, 0x00, 0x00];
        let entries: Vec<_> = decode(&bytes, 3, DeviceType::Max7219).unwrap().collect();
        let ids: Vec<_> = entries.iter().map(|e| e.chain_id).collect();
        assert_eq!(ids, [3, 2, 1]);
        assert_eq!(entries[0].annotation, Annotation::NoOp);
        assert_eq!(
            entries[1].annotation,
            Annotation::Digit {
                digit: 1,
                value: 0x08
            }
        );
    }

    #[test]
    fn test_positions_wrap() {
        let bytes = [0x0C, 0x01, 0x0C, 0x01, 0x0C, 0x01];
        let ids: Vec<_> = decode(&bytes, 2, DeviceType::Max7219)
            .unwrap()
            .map(|e| e.chain_id)
            .collect();
        assert_eq!(ids, [2, 1, 2]);
    }

    #[test]
    fn test_register_annotations() {
        let text = |addr, data, device_type| {
            Annotation::of(Command::from_bytes(addr, data), device_type).to_string()
        };
        assert_eq!(text(0x09, 0x0F, DeviceType::Max7219), "Decode: 0b00001111");
        assert_eq!(text(0x0A, 0x00, DeviceType::Max7219), "Intensity: 1/32");
        assert_eq!(text(0x0A, 0x0F, DeviceType::Max7219), "Intensity: 31/32");
        assert_eq!(text(0x0A, 0x03, DeviceType::Max7221), "Intensity: 4/16");
        assert_eq!(text(0x0A, 0x0E, DeviceType::Max7221), "Intensity: 15/16");
        assert_eq!(
            text(0x0A, 0x0F, DeviceType::Max7221),
            "Intensity: 15/16 max on"
        );
        assert_eq!(text(0x0B, 0x07, DeviceType::Max7219), "Scan limit: 8");
        assert_eq!(text(0x0C, 0x01, DeviceType::Max7219), "Shutdown: off");
        assert_eq!(text(0x0C, 0x00, DeviceType::Max7219), "Shutdown: on");
        assert_eq!(text(0x0F, 0x01, DeviceType::Max7219), "Display test: on");
        assert_eq!(
            text(0x0D, 0x00, DeviceType::Max7219),
            "INVALID REGISTER 0x0D"
        );
    }

    #[test]
    fn test_truncated_window() {
        assert_eq!(
            decode(&[0x0C], 1, DeviceType::Max7219).unwrap_err(),
            Error::TruncatedCommand
        );
    }
}
