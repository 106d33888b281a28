//! Register file of one emulated controller

use std::fmt::{self, Write as _};

use maxchain_core::display::{CodeB, DecodeMode, Intensity, DECIMAL_POINT};
use maxchain_core::wire::{Command, Register, SCAN_LIMIT_MASK};

/// Register state of one emulated device
///
/// Starts in the documented power-on state: shut down, no decoding, lowest
/// intensity, scanning a single digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    digits: [u8; 8],
    decode: DecodeMode,
    intensity: Intensity,
    scan_limit: u8,
    shutdown: bool,
    display_test: bool,
    latched: usize,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            digits: [0; 8],
            decode: DecodeMode::NONE,
            intensity: Intensity::MIN,
            scan_limit: 0,
            shutdown: true,
            display_test: false,
            latched: 0,
        }
    }
}

impl DeviceState {
    /// Apply a latched command word
    ///
    /// No-ops and the two unused addresses leave the device untouched.
    pub fn latch(&mut self, command: Command) {
        let value = command.data;
        match command.register() {
            Some(Register::NoOp) | None => return,
            Some(Register::DecodeMode) => self.decode = DecodeMode::from_bits_retain(value),
            Some(Register::Intensity) => self.intensity = Intensity::from_register(value),
            Some(Register::ScanLimit) => self.scan_limit = value & SCAN_LIMIT_MASK,
            Some(Register::Shutdown) => self.shutdown = value & 0x01 == 0,
            Some(Register::DisplayTest) => self.display_test = value & 0x01 != 0,
            Some(register) => {
                if let Some(digit) = register.digit_index() {
                    self.digits[usize::from(digit - 1)] = value;
                }
            }
        }
        self.latched += 1;
    }

    /// Raw content of a 1-based digit register
    pub fn digit(&self, digit: u8) -> Option<u8> {
        self.digits.get(usize::from(digit).checked_sub(1)?).copied()
    }

    /// All eight digit registers, digit 1 first
    pub fn digits(&self) -> &[u8; 8] {
        &self.digits
    }

    /// Decode-mode register
    pub fn decode(&self) -> DecodeMode {
        self.decode
    }

    /// Intensity register
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// Number of scanned digits (scan-limit register plus one)
    pub fn scanned_digits(&self) -> u8 {
        self.scan_limit + 1
    }

    /// Whether the device is shut down
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Whether the display test is on
    pub fn is_display_test(&self) -> bool {
        self.display_test
    }

    /// Number of non-no-op commands the device has latched
    pub fn latched(&self) -> usize {
        self.latched
    }

    /// What the display shows, leftmost digit (the highest scanned) first
    ///
    /// Code B digits render as their character, raw digits as `[XX]`, and a
    /// lit decimal point as a trailing `.`. A shut down display is blank
    /// unless the display test overrides it.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for digit in (1..=self.scanned_digits()).rev() {
            let value = self.digits[usize::from(digit - 1)];
            if self.display_test {
                out.push_str("8.");
            } else if self.shutdown {
                out.push(' ');
            } else if self.decode.decodes(digit) {
                out.push(CodeB::from_register(value).as_char());
                if value & DECIMAL_POINT != 0 {
                    out.push('.');
                }
            } else {
                let _ = write!(out, "[{:02X}]", value);
            }
        }
        out
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.display_test {
            "test"
        } else if self.shutdown {
            "shutdown"
        } else {
            "normal"
        };
        write!(
            f,
            "{:<8} intensity {:>2}/15  scan {}  decode 0b{:08b}  |{}|",
            mode,
            self.intensity.level(),
            self.scanned_digits(),
            self.decode.bits(),
            self.render()
        )
    }
}
