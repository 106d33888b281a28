//! maxchain-linux-spi - Linux spidev transport
//!
//! This crate drives a chain of MAX7219/MAX7221 controllers through the
//! `/dev/spidevX.Y` device interface.
//!
//! # Overview
//!
//! The Linux SPI driver exposes SPI controllers through character devices
//! at `/dev/spidevX.Y` where X is the bus number and Y is the chip select.
//! The controllers latch on the chip-select rising edge, so every
//! transaction is sent as a single write-only transfer.
//!
//! # Example
//!
//! ```no_run
//! use maxchain_core::{ChainConfig, ChainDriver, DeviceType, Mode};
//! use maxchain_linux_spi::LinuxSpi;
//!
//! let spi = LinuxSpi::open_device("/dev/spidev0.0")?;
//! let config = ChainConfig::new(4, DeviceType::Max7219)
//!     .with_chip_select(0)
//!     .with_clock_speed(10_000_000);
//! let mut driver = ChainDriver::init(config, spi)?;
//! driver.set_chain_mode(Mode::Normal)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the maxchain CLI
//!
//! ```bash
//! maxchain -t linux_spi:dev=/dev/spidev0.0 --chain-length 4 mode normal
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

use maxchain_core::transport::ChainTransport;

/// Open a Linux SPI device and return a boxed ChainTransport
///
/// This is a convenience function for use in the CLI transport dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from transport string parsing
///
/// # Example Options
///
/// - `dev=/dev/spidev0.0` - Required: device path
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn ChainTransport + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
