//! Thread-safe driver handle

use std::sync::{Arc, Mutex, MutexGuard};

use super::ChainDriver;
use crate::display::{DecodeMode, Intensity, Mode};
use crate::error::{Error, Result};
use crate::transport::ChainTransport;

/// Cloneable handle sharing one [`ChainDriver`] between threads
///
/// Each operation holds the driver lock for its whole span, so the two
/// transactions of a mode change are never interleaved with another
/// caller's transactions. Acquiring the lock blocks without timeout.
pub struct SharedChainDriver<T: ChainTransport> {
    inner: Arc<Mutex<ChainDriver<T>>>,
}

impl<T: ChainTransport> Clone for SharedChainDriver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ChainTransport> SharedChainDriver<T> {
    /// Share an initialized driver
    pub fn new(driver: ChainDriver<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(driver)),
        }
    }

    /// Lock the driver for a custom sequence of operations
    pub fn lock(&self) -> Result<MutexGuard<'_, ChainDriver<T>>> {
        self.inner.lock().map_err(|_| {
            log::error!("Chain driver lock poisoned");
            Error::LockPoisoned
        })
    }

    /// Run `f` with exclusive access to the driver
    pub fn with<R>(&self, f: impl FnOnce(&mut ChainDriver<T>) -> Result<R>) -> Result<R> {
        let mut driver = self.lock()?;
        f(&mut driver)
    }

    /// See [`ChainDriver::set_chain_mode`]
    pub fn set_chain_mode(&self, mode: Mode) -> Result<()> {
        self.with(|driver| driver.set_chain_mode(mode))
    }

    /// See [`ChainDriver::set_mode`]
    pub fn set_mode(&self, chain_id: u8, mode: Mode) -> Result<()> {
        self.with(|driver| driver.set_mode(chain_id, mode))
    }

    /// See [`ChainDriver::set_chain_intensity`]
    pub fn set_chain_intensity(&self, intensity: Intensity) -> Result<()> {
        self.with(|driver| driver.set_chain_intensity(intensity))
    }

    /// See [`ChainDriver::set_intensity`]
    pub fn set_intensity(&self, chain_id: u8, intensity: Intensity) -> Result<()> {
        self.with(|driver| driver.set_intensity(chain_id, intensity))
    }

    /// See [`ChainDriver::configure_chain_decode`]
    pub fn configure_chain_decode(&self, decode: DecodeMode) -> Result<()> {
        self.with(|driver| driver.configure_chain_decode(decode))
    }

    /// See [`ChainDriver::configure_decode`]
    pub fn configure_decode(&self, chain_id: u8, decode: DecodeMode) -> Result<()> {
        self.with(|driver| driver.configure_decode(chain_id, decode))
    }

    /// See [`ChainDriver::configure_chain_scan_limit`]
    pub fn configure_chain_scan_limit(&self, digits: u8) -> Result<()> {
        self.with(|driver| driver.configure_chain_scan_limit(digits))
    }

    /// See [`ChainDriver::configure_scan_limit`]
    pub fn configure_scan_limit(&self, chain_id: u8, digits: u8) -> Result<()> {
        self.with(|driver| driver.configure_scan_limit(chain_id, digits))
    }

    /// See [`ChainDriver::set_digit`]
    pub fn set_digit(&self, chain_id: u8, digit: u8, code: u8) -> Result<()> {
        self.with(|driver| driver.set_digit(chain_id, digit, code))
    }

    /// See [`ChainDriver::set_chain`]
    pub fn set_chain(&self, code: u8) -> Result<()> {
        self.with(|driver| driver.set_chain(code))
    }

    /// See [`ChainDriver::write_digits`]
    pub fn write_digits(&self, chain_id: u8, digit: u8, codes: &[u8]) -> Result<()> {
        self.with(|driver| driver.write_digits(chain_id, digit, codes))
    }

    /// See [`ChainDriver::free`]
    ///
    /// Frees the driver for every clone of this handle.
    pub fn free(&self) -> Result<()> {
        self.with(|driver| driver.free())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BusConfig, ChainConfig};
    use crate::display::DeviceType;
    use std::thread;
    use std::vec::Vec;

    #[derive(Clone, Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<Vec<u8>>>>,
        held: Arc<Mutex<bool>>,
    }

    impl ChainTransport for Recorder {
        fn attach(&mut self, _config: &BusConfig) -> Result<()> {
            Ok(())
        }

        fn acquire_bus(&mut self) -> Result<()> {
            let mut held = self.held.lock().unwrap();
            assert!(!*held, "bus acquired twice");
            *held = true;
            Ok(())
        }

        fn release_bus(&mut self) {
            *self.held.lock().unwrap() = false;
        }

        fn transmit(&mut self, data: &[u8]) -> Result<()> {
            assert!(*self.held.lock().unwrap(), "transmit without bus");
            self.log.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        fn detach(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_mode_changes_are_not_interleaved() {
        let recorder = Recorder::default();
        let config = ChainConfig::new(1, DeviceType::Max7219).with_chip_select(0);
        let shared = SharedChainDriver::new(ChainDriver::init(config, recorder.clone()).unwrap());

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mode = if worker % 2 == 0 {
                        Mode::Normal
                    } else {
                        Mode::Shutdown
                    };
                    for _ in 0..25 {
                        shared.set_chain_mode(mode).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let log = recorder.log.lock().unwrap().clone();
        assert_eq!(log.len(), 200);
        for pair in log.chunks(2) {
            assert_eq!(pair[0], [0x0F, 0x00]);
            assert_eq!(pair[1][0], 0x0C);
        }
    }

    #[test]
    fn test_free_through_any_clone() {
        let config = ChainConfig::new(2, DeviceType::Max7221).with_chip_select(1);
        let shared = SharedChainDriver::new(ChainDriver::init(config, Recorder::default()).unwrap());
        let other = shared.clone();
        shared.free().unwrap();
        assert_eq!(other.set_chain(0x0F), Err(Error::Detached));
        assert!(!other.lock().unwrap().is_attached());
    }
}
