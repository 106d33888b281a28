//! maxchain-core - Core library for daisy-chained MAX7219/MAX7221 displays
//!
//! This crate drives a chain of MAX7219/MAX7221 LED display controllers
//! sharing one serial bus. Every command is shifted through the whole chain,
//! so each transaction carries exactly one 16-bit word per device: the real
//! command for the addressed device and a no-op for the others, or the same
//! command for everyone when broadcasting.
//!
//! The crate is `no_std` compatible. The bus itself is abstracted behind the
//! [`transport::ChainTransport`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Heap-backed command buffers for chains longer than 8 devices
//! - `is_sync` - Compile the driver and transport trait as blocking code
//!
//! # Example
//!
//! ```ignore
//! use maxchain_core::{ChainConfig, ChainDriver, DeviceType, Mode};
//!
//! fn bring_up<T: ChainTransport>(transport: T) -> maxchain_core::Result<()> {
//!     let config = ChainConfig::new(4, DeviceType::Max7219).with_chip_select(0);
//!     let mut driver = ChainDriver::init(config, transport)?;
//!     driver.set_chain_mode(Mode::Normal)?;
//!     driver.set_digit(2, 1, 0x0F)?;
//!     driver.free()
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod chain;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod transport;
pub mod wire;

pub use config::{BusConfig, ChainConfig};
pub use display::{CodeB, DecodeMode, DeviceType, Intensity, Mode, Segments};
pub use driver::ChainDriver;
#[cfg(all(feature = "std", feature = "is_sync"))]
pub use driver::SharedChainDriver;
pub use error::{Error, ErrorKind, Result};
pub use transport::ChainTransport;
