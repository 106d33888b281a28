//! TransportHandle - one type over every compiled-in transport

use maxchain_core::config::BusConfig;
use maxchain_core::error::Result;
use maxchain_core::transport::ChainTransport;

#[cfg(feature = "dummy")]
use maxchain_dummy::DummyChain;

/// Transport opened by the registry
///
/// The emulated chain is kept concrete so its device state can be shown
/// after a command runs. Hardware transports are type-erased.
pub enum TransportHandle {
    /// In-memory emulated chain
    #[cfg(feature = "dummy")]
    Dummy(DummyChain),
    /// Any other transport
    Boxed(Box<dyn ChainTransport + Send>),
}

impl TransportHandle {
    /// The emulated chain, if this handle is one
    #[cfg(feature = "dummy")]
    pub fn emulated(&self) -> Option<&DummyChain> {
        match self {
            Self::Dummy(chain) => Some(chain),
            _ => None,
        }
    }

    fn inner(&mut self) -> &mut dyn ChainTransport {
        match self {
            #[cfg(feature = "dummy")]
            Self::Dummy(chain) => chain,
            Self::Boxed(transport) => transport.as_mut(),
        }
    }
}

impl ChainTransport for TransportHandle {
    fn attach(&mut self, config: &BusConfig) -> Result<()> {
        self.inner().attach(config)
    }

    fn acquire_bus(&mut self) -> Result<()> {
        self.inner().acquire_bus()
    }

    fn release_bus(&mut self) {
        self.inner().release_bus()
    }

    fn transmit(&mut self, data: &[u8]) -> Result<()> {
        self.inner().transmit(data)
    }

    fn detach(&mut self) -> Result<()> {
        self.inner().detach()
    }
}
