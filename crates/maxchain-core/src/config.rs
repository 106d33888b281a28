//! Chain and bus configuration
//!
//! A [`ChainConfig`] describes the chain and how it is wired. It is validated
//! once, when the driver is created, and yields the [`BusConfig`] handed to
//! the transport on attach.

use crate::display::DeviceType;
use crate::error::{Error, Result};

/// Highest serial clock the controllers accept
pub const MAX_CLOCK_SPEED_HZ: u32 = 10_000_000;
/// Default serial clock
pub const DEFAULT_CLOCK_SPEED_HZ: u32 = 1_000_000;
/// Longest chain the 1-based position scheme can address
pub const MAX_CHAIN_LENGTH: u8 = 254;
/// Default depth of the transport's transaction queue
pub const DEFAULT_QUEUE_SIZE: u8 = 8;
/// SPI mode used by the controllers (CPOL = 0, CPHA = 0)
pub const SPI_MODE: u8 = 0;

/// Configuration of one chain of controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Host bus identifier, meaning is transport specific
    pub bus: u8,
    /// Serial clock in Hz
    pub clock_speed_hz: u32,
    /// Chip-select line latching the shifted words, required
    pub chip_select: Option<u32>,
    /// Depth of the transport's transaction queue
    pub queue_size: u8,
    /// Number of devices in the chain (1..=254)
    pub chain_length: u8,
    /// Controller variant populating the chain
    pub device_type: DeviceType,
}

impl ChainConfig {
    /// Configuration with default clock and queue and no chip-select line
    pub const fn new(chain_length: u8, device_type: DeviceType) -> Self {
        Self {
            bus: 0,
            clock_speed_hz: DEFAULT_CLOCK_SPEED_HZ,
            chip_select: None,
            queue_size: DEFAULT_QUEUE_SIZE,
            chain_length,
            device_type,
        }
    }

    /// Set the host bus
    pub const fn with_bus(mut self, bus: u8) -> Self {
        self.bus = bus;
        self
    }

    /// Set the serial clock
    pub const fn with_clock_speed(mut self, hz: u32) -> Self {
        self.clock_speed_hz = hz;
        self
    }

    /// Set the chip-select line
    pub const fn with_chip_select(mut self, line: u32) -> Self {
        self.chip_select = Some(line);
        self
    }

    /// Set the transaction queue depth
    pub const fn with_queue_size(mut self, size: u8) -> Self {
        self.queue_size = size;
        self
    }

    /// Check every field and derive the bus attachment parameters
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<BusConfig> {
        if self.clock_speed_hz == 0 || self.clock_speed_hz > MAX_CLOCK_SPEED_HZ {
            return Err(Error::InvalidClockSpeed(self.clock_speed_hz));
        }
        let chip_select = self.chip_select.ok_or(Error::MissingChipSelect)?;
        if self.chain_length == 0 || self.chain_length > MAX_CHAIN_LENGTH {
            return Err(Error::InvalidChainLength(self.chain_length));
        }
        if self.queue_size == 0 {
            return Err(Error::InvalidQueueSize);
        }

        Ok(BusConfig {
            bus: self.bus,
            clock_speed_hz: self.clock_speed_hz,
            chip_select,
            mode: SPI_MODE,
            queue_size: self.queue_size,
            transaction_len: usize::from(self.chain_length) * 2,
        })
    }
}

/// Parameters a transport needs to attach the chain to its bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Host bus identifier
    pub bus: u8,
    /// Serial clock in Hz
    pub clock_speed_hz: u32,
    /// Chip-select line
    pub chip_select: u32,
    /// SPI mode (always 0 for these controllers)
    pub mode: u8,
    /// Depth of the transaction queue
    pub queue_size: u8,
    /// Length in bytes of every transaction on this chain
    pub transaction_len: usize,
}
