//! Transport trait definition
//!
//! This trait uses `maybe_async` to support both sync and async modes.
//! - By default, the trait is async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, the trait becomes synchronous

use maybe_async::maybe_async;

use crate::config::BusConfig;
use crate::error::Result;

/// Serial bus carrying one chain of controllers
///
/// A transaction is clocked out with chip-select asserted and must end with
/// chip-select released, since that edge latches the shifted words into
/// every device at once.
///
/// ## Example
///
/// ```ignore
/// #[maybe_async]
/// impl ChainTransport for MySpi {
///     async fn attach(&mut self, config: &BusConfig) -> Result<()> {
///         self.set_speed(config.clock_speed_hz).await
///     }
///
///     async fn transmit(&mut self, data: &[u8]) -> Result<()> {
///         self.write_with_cs(data).await
///     }
///
///     async fn detach(&mut self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[maybe_async(AFIT)]
pub trait ChainTransport {
    /// Register the chain on the bus with the given parameters
    async fn attach(&mut self, config: &BusConfig) -> Result<()>;

    /// Take exclusive use of the bus until [`release_bus`](Self::release_bus)
    ///
    /// Blocks until the bus is available. Transports on a bus with no other
    /// users can keep the default.
    async fn acquire_bus(&mut self) -> Result<()> {
        Ok(())
    }

    /// End the exclusive use started by [`acquire_bus`](Self::acquire_bus)
    fn release_bus(&mut self) {}

    /// Clock out one transaction and latch it
    async fn transmit(&mut self, data: &[u8]) -> Result<()>;

    /// Remove the chain from the bus
    async fn detach(&mut self) -> Result<()>;
}

// Blanket impl for boxed transports to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl ChainTransport for alloc::boxed::Box<dyn ChainTransport + Send> {
    fn attach(&mut self, config: &BusConfig) -> Result<()> {
        (**self).attach(config)
    }

    fn acquire_bus(&mut self) -> Result<()> {
        (**self).acquire_bus()
    }

    fn release_bus(&mut self) {
        (**self).release_bus()
    }

    fn transmit(&mut self, data: &[u8]) -> Result<()> {
        (**self).transmit(data)
    }

    fn detach(&mut self) -> Result<()> {
        (**self).detach()
    }
}
