//! Single-device command word

use core::fmt;

use zerocopy::{Immutable, IntoBytes};

use super::registers::Register;

/// One 16-bit command word: register address first, then data
///
/// The layout matches the order the bytes are clocked onto the wire, so a
/// slice of commands can be handed to a transport as-is via
/// [`IntoBytes::as_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoBytes, Immutable)]
#[repr(C)]
pub struct Command {
    /// Register address byte
    pub address: u8,
    /// Data byte
    pub data: u8,
}

impl Command {
    /// No-op command, the padding word for devices that are not addressed
    pub const NOOP: Self = Self {
        address: Register::NoOp.addr(),
        data: 0x00,
    };

    /// Create a command writing `data` to `register`
    pub const fn new(register: Register, data: u8) -> Self {
        Self {
            address: register.addr(),
            data,
        }
    }

    /// Rebuild a command from its two wire bytes
    pub const fn from_bytes(address: u8, data: u8) -> Self {
        Self { address, data }
    }

    /// Register this command addresses, as the controllers decode it
    pub const fn register(&self) -> Option<Register> {
        Register::from_addr(self.address)
    }

    /// Whether this command leaves the receiving device untouched
    pub const fn is_noop(&self) -> bool {
        matches!(self.register(), Some(Register::NoOp))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ 0x{:02X}, 0x{:02X} }}", self.address, self.data)
    }
}
