//! Chain-position mapping and transaction building
//!
//! A transaction carries one [`Command`](crate::wire::Command) per device.
//! The first command clocked out travels furthest down the chain, so device
//! `k` of an `N`-device chain reads slot `N - k` of the transaction.

mod buffer;
mod target;
pub mod trace;

pub use buffer::{CommandBuffer, INLINE_COMMANDS};
pub use target::{slot_index, Target};
