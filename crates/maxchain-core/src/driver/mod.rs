//! Chain driver
//!
//! [`ChainDriver`] owns the transport and the reusable command buffer of one
//! chain. Every operation validates its arguments, builds one or more
//! transactions and transmits them while holding the bus.
//!
//! Operations take `&mut self`, so a driver is never used by two callers at
//! once. Wrap it in a [`SharedChainDriver`] to share it between threads.

mod digits;
#[cfg(all(feature = "std", feature = "is_sync"))]
mod shared;

pub use digits::{DigitPosition, DigitRun};
#[cfg(all(feature = "std", feature = "is_sync"))]
pub use shared::SharedChainDriver;

use maybe_async::maybe_async;

use crate::chain::{CommandBuffer, Target};
use crate::config::ChainConfig;
use crate::display::{DecodeMode, Intensity, Mode};
use crate::error::{Error, Result};
use crate::transport::{BusGuard, ChainTransport};
use crate::wire::{Command, Register, MAX_DIGIT, MIN_DIGIT};

/// Driver for one chain of MAX7219/MAX7221 controllers
///
/// Chain positions are 1-based and counted from the bus host: device 1 is
/// wired directly to the host, device `chain_length` is the far end.
pub struct ChainDriver<T: ChainTransport> {
    config: ChainConfig,
    buffer: CommandBuffer,
    transport: Option<T>,
}

#[maybe_async]
impl<T: ChainTransport> ChainDriver<T> {
    /// Validate `config`, allocate the command buffer and attach to the bus
    ///
    /// Nothing is sent to the devices. On failure the transport is dropped
    /// and nothing stays allocated.
    pub async fn init(config: ChainConfig, mut transport: T) -> Result<Self> {
        let bus = config.validate()?;
        let buffer = CommandBuffer::new(config.chain_length)?;
        transport.attach(&bus).await?;

        log::info!(
            "Attached chain of {} x {} on bus {} (CS {}, {} Hz)",
            config.chain_length,
            config.device_type,
            bus.bus,
            bus.chip_select,
            bus.clock_speed_hz
        );

        Ok(Self {
            config,
            buffer,
            transport: Some(transport),
        })
    }

    /// Power the chain down and detach from the bus
    ///
    /// Every step is attempted even if an earlier one fails. The first error
    /// is returned. A second call fails with [`Error::Detached`].
    pub async fn free(&mut self) -> Result<()> {
        if self.transport.is_none() {
            return Err(Error::Detached);
        }

        let mut first_error = None;

        if let Err(e) = self.send(Target::All, Mode::Shutdown.commands()).await {
            log::warn!("Failed to shut down chain before detaching: {}", e);
            first_error.get_or_insert(e);
        }

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.detach().await {
                log::warn!("Failed to detach chain from bus: {}", e);
                first_error.get_or_insert(e);
            }
        }

        log::info!("Released chain of {} devices", self.config.chain_length);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Set the operating mode of every device
    pub async fn set_chain_mode(&mut self, mode: Mode) -> Result<()> {
        self.send(Target::All, mode.commands()).await
    }

    /// Set the operating mode of one device
    pub async fn set_mode(&mut self, chain_id: u8, mode: Mode) -> Result<()> {
        self.send(Target::Device(chain_id), mode.commands()).await
    }

    /// Set the brightness of every device
    pub async fn set_chain_intensity(&mut self, intensity: Intensity) -> Result<()> {
        self.send(
            Target::All,
            &[Command::new(Register::Intensity, intensity.level())],
        )
        .await
    }

    /// Set the brightness of one device
    pub async fn set_intensity(&mut self, chain_id: u8, intensity: Intensity) -> Result<()> {
        self.send(
            Target::Device(chain_id),
            &[Command::new(Register::Intensity, intensity.level())],
        )
        .await
    }

    /// Select Code B decoding per digit on every device
    pub async fn configure_chain_decode(&mut self, decode: DecodeMode) -> Result<()> {
        self.send(
            Target::All,
            &[Command::new(Register::DecodeMode, decode.bits())],
        )
        .await
    }

    /// Select Code B decoding per digit on one device
    pub async fn configure_decode(&mut self, chain_id: u8, decode: DecodeMode) -> Result<()> {
        self.send(
            Target::Device(chain_id),
            &[Command::new(Register::DecodeMode, decode.bits())],
        )
        .await
    }

    /// Scan `digits` digits (1..=8) on every device
    pub async fn configure_chain_scan_limit(&mut self, digits: u8) -> Result<()> {
        let command = scan_limit_command(digits)?;
        self.send(Target::All, &[command]).await
    }

    /// Scan `digits` digits (1..=8) on one device
    pub async fn configure_scan_limit(&mut self, chain_id: u8, digits: u8) -> Result<()> {
        let command = scan_limit_command(digits)?;
        self.send(Target::Device(chain_id), &[command]).await
    }

    /// Write one digit register of one device
    ///
    /// `code` is a Code B symbol or raw segment bits depending on the decode
    /// mode configured for that digit. The driver does not check which.
    pub async fn set_digit(&mut self, chain_id: u8, digit: u8, code: u8) -> Result<()> {
        let command = Command::new(Register::digit(digit)?, code);
        self.send(Target::Device(chain_id), &[command]).await
    }

    /// Write `code` to all eight digits of every device
    ///
    /// Sends one broadcast per digit, digits 1 to 8, while holding the bus.
    pub async fn set_chain(&mut self, code: u8) -> Result<()> {
        let mut commands = [Command::NOOP; MAX_DIGIT as usize];
        for (command, digit) in commands.iter_mut().zip(MIN_DIGIT..=MAX_DIGIT) {
            *command = Command::new(Register::digit(digit)?, code);
        }
        self.send(Target::All, &commands).await
    }

    /// Write consecutive digits starting at `digit` of `chain_id`
    ///
    /// The run continues from digit 8 of one device to digit 1 of the next
    /// device up the chain and must end by the last digit of the chain. One
    /// transaction is sent per digit register the run touches, every other
    /// device receiving a no-op, all while holding the bus. An empty run
    /// sends nothing.
    pub async fn write_digits(&mut self, chain_id: u8, digit: u8, codes: &[u8]) -> Result<()> {
        let (transport, buffer) = self.parts()?;
        let run = DigitRun::new(buffer.chain_length(), chain_id, digit, codes.len())?;
        if run.is_empty() {
            return Ok(());
        }

        log::debug!(
            "Writing {} digits from device {} digit {}",
            run.len(),
            chain_id,
            digit
        );

        let mut bus = BusGuard::acquire(transport).await?;
        for register_digit in run.digits() {
            let register = Register::digit(register_digit)?;
            buffer.clear();
            for (position, &code) in run.positions().zip(codes) {
                if position.digit == register_digit {
                    buffer.place(position.chain_id, Command::new(register, code))?;
                }
            }
            bus.transmit(buffer.as_bytes()).await?;
        }
        Ok(())
    }

    /// Build and transmit one transaction per command, holding the bus throughout
    async fn send(&mut self, target: Target, commands: &[Command]) -> Result<()> {
        let (transport, buffer) = self.parts()?;
        target.validate(buffer.chain_length())?;

        let mut bus = BusGuard::acquire(transport).await?;
        for &command in commands {
            log::debug!(
                "Sending {} {} to {}",
                command
                    .register()
                    .map_or("unknown register", |register| register.name()),
                command,
                target
            );
            buffer.load(target, command)?;
            bus.transmit(buffer.as_bytes()).await?;
        }
        Ok(())
    }
}

impl<T: ChainTransport> ChainDriver<T> {
    /// Number of devices in the chain
    pub fn chain_length(&self) -> u8 {
        self.config.chain_length
    }

    /// Configuration the driver was created with
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Whether the driver is still attached (not yet freed)
    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Transport, while attached
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Mutable transport, while attached
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    fn parts(&mut self) -> Result<(&mut T, &mut CommandBuffer)> {
        match self.transport.as_mut() {
            Some(transport) => Ok((transport, &mut self.buffer)),
            None => Err(Error::Detached),
        }
    }
}

/// Scan-limit register value is the digit count minus one
fn scan_limit_command(digits: u8) -> Result<Command> {
    if !(MIN_DIGIT..=MAX_DIGIT).contains(&digits) {
        return Err(Error::InvalidScanLimit(digits));
    }
    Ok(Command::new(Register::ScanLimit, digits - 1))
}

// Dropping an attached driver powers the chain down first (sync mode only)
// In async mode, call `free().await` before dropping
#[cfg(feature = "is_sync")]
impl<T: ChainTransport> Drop for ChainDriver<T> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            if let Err(e) = self.free() {
                log::warn!("Error while freeing chain driver on drop: {}", e);
            }
        }
    }
}

// There is no async drop, so an attached driver can only report the missed
// `free().await`. The chain stays powered.
#[cfg(not(feature = "is_sync"))]
impl<T: ChainTransport> Drop for ChainDriver<T> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            log::warn!(
                "Chain driver of {} devices dropped without free(), chain left powered",
                self.config.chain_length
            );
        }
    }
}


#[cfg(all(test, not(feature = "is_sync")))]
mod async_tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::display::DeviceType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingTransport {
        calls: Arc<AtomicUsize>,
    }

    impl ChainTransport for CountingTransport {
        async fn attach(&mut self, _config: &BusConfig) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn transmit(&mut self, _data: &[u8]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn detach(&mut self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_drop_without_free_touches_nothing() {
        let transport = CountingTransport::default();
        let calls = Arc::clone(&transport.calls);
        let config = ChainConfig::new(2, DeviceType::Max7221).with_chip_select(0);
        let driver = ChainDriver {
            config,
            buffer: CommandBuffer::new(2).unwrap(),
            transport: Some(transport),
        };
        assert!(driver.is_attached());
        drop(driver);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
