//! Bus transport abstraction
//!
//! The driver never touches hardware directly. It hands finished
//! transactions to a [`ChainTransport`], which owns the serial bus and the
//! chip-select line.

mod guard;
mod traits;

pub use guard::BusGuard;
pub use traits::ChainTransport;
