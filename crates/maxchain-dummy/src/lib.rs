//! maxchain-dummy - Emulated MAX7219/MAX7221 chain for testing
//!
//! This crate provides a transport that emulates a chain of controllers in
//! memory. Bytes are shifted through the chain exactly as on the real bus
//! and latched into each device's register file when a transaction ends.
//! It's useful for testing and development without real hardware.

mod device;

pub use device::DeviceState;

use std::collections::VecDeque;

use maxchain_core::config::BusConfig;
use maxchain_core::error::{Error, Result};
use maxchain_core::transport::ChainTransport;
use maxchain_core::wire::Command;
use maxchain_core::DeviceType;

/// Configuration for the emulated chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyConfig {
    /// Number of emulated devices
    pub chain_length: u8,
    /// Controller variant, only used for reporting
    pub device_type: DeviceType,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            chain_length: 4,
            device_type: DeviceType::Max7219,
        }
    }
}

/// One transmitted transaction, as seen on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Bytes clocked out while chip-select was asserted
    pub bytes: Vec<u8>,
    /// Exclusive-access scope the transaction was sent in, if the bus was held
    pub scope: Option<usize>,
}

/// Emulated chain transport
pub struct DummyChain {
    config: DummyConfig,
    devices: Vec<DeviceState>,
    /// Shift registers of the whole chain, far end first
    shift: VecDeque<u8>,
    attached: Option<BusConfig>,
    bus_held: bool,
    scopes: usize,
    history: Vec<Transaction>,
    fail_transmit_after: Option<usize>,
}

impl DummyChain {
    /// Create an emulated chain in the power-on state
    pub fn new(config: DummyConfig) -> Self {
        let len = usize::from(config.chain_length);
        Self {
            config,
            devices: vec![DeviceState::default(); len],
            shift: std::iter::repeat(0).take(len * 2).collect(),
            attached: None,
            bus_held: false,
            scopes: 0,
            history: Vec::new(),
            fail_transmit_after: None,
        }
    }

    /// Create an emulated chain of `chain_length` MAX7219 devices
    pub fn with_length(chain_length: u8) -> Self {
        Self::new(DummyConfig {
            chain_length,
            ..DummyConfig::default()
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// State of the device at 1-based chain position `chain_id`
    pub fn device(&self, chain_id: u8) -> Option<&DeviceState> {
        self.devices.get(usize::from(chain_id).checked_sub(1)?)
    }

    /// Every device, device 1 first
    pub fn devices(&self) -> &[DeviceState] {
        &self.devices
    }

    /// Every transaction sent so far
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Bus parameters of the current attachment
    pub fn bus_config(&self) -> Option<&BusConfig> {
        self.attached.as_ref()
    }

    /// Whether exclusive bus access is currently held
    pub fn is_bus_held(&self) -> bool {
        self.bus_held
    }

    /// Make every transmit fail once `count` transactions have gone through
    pub fn fail_transmit_after(&mut self, count: usize) {
        self.fail_transmit_after = Some(count);
    }

    /// Print each device's state (for debugging)
    pub fn dump(&self) {
        println!(
            "Emulated chain: {} x {}",
            self.config.chain_length, self.config.device_type
        );
        for (index, device) in self.devices.iter().enumerate() {
            println!("  device {:>3}: {}", index + 1, device);
        }
    }

    /// Shift one byte into the near end of the chain
    fn shift_in(&mut self, byte: u8) {
        self.shift.pop_front();
        self.shift.push_back(byte);
    }

    /// Chip-select rising edge: every device latches its shift register
    fn latch(&mut self) {
        let len = self.devices.len();
        for (index, device) in self.devices.iter_mut().enumerate() {
            // Device k holds bytes 2(N - k) and 2(N - k) + 1, far end first
            let offset = (len - 1 - index) * 2;
            let command = Command::from_bytes(self.shift[offset], self.shift[offset + 1]);
            device.latch(command);
        }
    }
}

impl ChainTransport for DummyChain {
    fn attach(&mut self, config: &BusConfig) -> Result<()> {
        if self.attached.is_some() {
            log::warn!("dummy: chain already attached");
            return Err(Error::AttachFailed);
        }
        let expected = usize::from(self.config.chain_length) * 2;
        if config.transaction_len != expected {
            log::warn!(
                "dummy: driver expects {} byte transactions, emulated chain has {} devices",
                config.transaction_len,
                self.config.chain_length
            );
            return Err(Error::AttachFailed);
        }
        log::debug!(
            "dummy: attached at {} Hz, CS {}",
            config.clock_speed_hz,
            config.chip_select
        );
        self.attached = Some(*config);
        Ok(())
    }

    fn acquire_bus(&mut self) -> Result<()> {
        if self.bus_held {
            log::warn!("dummy: bus acquired while already held");
            return Err(Error::BusAcquireFailed);
        }
        self.bus_held = true;
        self.scopes += 1;
        Ok(())
    }

    fn release_bus(&mut self) {
        self.bus_held = false;
    }

    fn transmit(&mut self, data: &[u8]) -> Result<()> {
        if self.attached.is_none() {
            log::warn!("dummy: transmit on detached chain");
            return Err(Error::TransmitFailed);
        }
        if self
            .fail_transmit_after
            .is_some_and(|count| self.history.len() >= count)
        {
            return Err(Error::TransmitFailed);
        }

        for &byte in data {
            self.shift_in(byte);
        }
        self.latch();

        self.history.push(Transaction {
            bytes: data.to_vec(),
            scope: self.bus_held.then_some(self.scopes),
        });
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        if self.attached.take().is_none() {
            return Err(Error::DetachFailed);
        }
        log::debug!("dummy: detached");
        Ok(())
    }
}
