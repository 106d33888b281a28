//! MAX7219/MAX7221 wire format
//!
//! This module provides the register map and the 16-bit command word that
//! is shifted into each device of the chain.

mod command;
pub mod registers;

pub use command::Command;
pub use registers::*;
