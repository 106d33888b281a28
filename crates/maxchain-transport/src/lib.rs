//! Transport selection for the maxchain CLI
//!
//! This crate opens a chain transport from a short specification string and
//! wraps it in a driver. The CLI only deals with [`TransportHandle`] and
//! never with concrete transport types.
//!
//! # Example
//!
//! ```ignore
//! use maxchain_core::{ChainConfig, DeviceType, Mode};
//! use maxchain_transport::open_chain;
//!
//! let config = ChainConfig::new(4, DeviceType::Max7219).with_chip_select(0);
//! let mut driver = open_chain("linux_spi:dev=/dev/spidev0.0", &config)?;
//! driver.set_chain_mode(Mode::Normal)?;
//! ```

mod handle;
mod registry;

pub use handle::TransportHandle;
pub use registry::{
    available_transports, open_chain, open_transport, parse_transport_params,
    transport_names_short, TransportInfo, TransportParams,
};
