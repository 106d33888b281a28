//! Scoped exclusive bus access

use core::ops::{Deref, DerefMut};

use maybe_async::maybe_async;

use super::ChainTransport;
use crate::error::Result;

/// Holds the bus for a multi-transaction sequence
///
/// The bus is released when the guard is dropped, including on every early
/// return through `?`, so an error mid-sequence never leaves it held.
pub struct BusGuard<'a, T: ChainTransport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: ChainTransport + ?Sized> BusGuard<'a, T> {
    /// Acquire the bus, blocking until it is available
    #[maybe_async]
    pub async fn acquire(transport: &'a mut T) -> Result<Self> {
        transport.acquire_bus().await?;
        Ok(Self { transport })
    }
}

impl<T: ChainTransport + ?Sized> Deref for BusGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: ChainTransport + ?Sized> DerefMut for BusGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: ChainTransport + ?Sized> Drop for BusGuard<'_, T> {
    fn drop(&mut self) {
        self.transport.release_bus();
    }
}
